//! The core River syntax implementation.
//!
//! The provided River parser turns flat source text into a nested tree of
//! syntactic groups, which can be used for evaluation, formatting tools,
//! etc.
//!
//! Parsing happens in two stages: a [`Lexer`](lexer::Lexer) splits the
//! source into delimiter and text tokens, and a grouper reassembles the
//! token sequence into a [`TokenTree`](ast::TokenTree). Both stages are
//! pure functions over immutable input and are safe to run concurrently on
//! independent sources.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod source;
pub mod tokens;

mod parser;

pub use crate::parser::{group, parse, Grouper};
