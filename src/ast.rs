//! Token tree definitions for the language syntax.
//!
//! A token tree is the parser's output: a nested arrangement of the source's
//! syntactic groups, one step short of evaluated values. Interpreting leaves
//! as literals and tables as name/value mappings is left to consumers.

use std::fmt;

/// A node in the tree of syntactic groups produced by grouping.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenTree {
    /// A bare text token, such as a number or identifier.
    Leaf(String),

    /// A brace-delimited set of assignments, in source order.
    Table(Vec<TokenTree>),

    /// A bracket-delimited list of sub-expressions, in source order.
    Sequence(Vec<TokenTree>),

    /// A `name = value` binding.
    Assignment {
        name: String,
        value: Box<TokenTree>,
    },

    /// A single-argument `arg: body` function.
    LambdaLeaf {
        arg: String,
        term: Box<TokenTree>,
    },
}

impl fmt::Debug for TokenTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenTree::Leaf(value) => write!(f, "Leaf({:?})", value),
            TokenTree::Table(items) => write!(f, "Table ").and_then(|_|
                f.debug_list().entries(items).finish()),
            TokenTree::Sequence(items) => write!(f, "Sequence ").and_then(|_|
                f.debug_list().entries(items).finish()),
            TokenTree::Assignment { name, value } => f.debug_struct("Assignment")
                .field("name", name)
                .field("value", value)
                .finish(),
            TokenTree::LambdaLeaf { arg, term } => f.debug_struct("LambdaLeaf")
                .field("arg", arg)
                .field("term", term)
                .finish(),
        }
    }
}
