//! The language parser.
//!
//! This is a handwritten grouping parser. Top-level splitting of a group
//! body is done by a cheap separator scan, which can cut straight through a
//! nested group of the same bracket kind; a second depth-aware pass
//! re-merges the affected chunks before recursing. This keeps each pass a
//! simple linear scan instead of a full recursive-descent scanner while
//! still producing a correct parse for arbitrarily nested groups.
use crate::ast::TokenTree;
use crate::error::{ErrorKind, ParseError};
use crate::lexer::tokenize;
use crate::source::{SourceFile, Span};
use crate::tokens::{Delim, Token, TokenInfo};
use log::debug;
use std::ops::Range;

/// Parse a source file into a token tree.
pub fn parse(file: &SourceFile) -> Result<TokenTree, ParseError> {
    let tokens = tokenize(file);
    Grouper::new().group(&tokens)
}

/// Group a token sequence into a token tree using the default nesting limit.
pub fn group(tokens: &[TokenInfo]) -> Result<TokenTree, ParseError> {
    Grouper::new().group(tokens)
}

/// Builds token trees out of token sequences.
///
/// Grouping is a pure function of its input; the only state carried here is
/// configuration. A fresh grouper groups at most `max_depth` levels of
/// nesting before giving up, so pathological inputs fail with an error
/// instead of overflowing the call stack.
pub struct Grouper {
    max_depth: usize,
}

impl Default for Grouper {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

impl Grouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grouper with a specific nesting depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Group a token sequence into a token tree.
    pub fn group(&self, tokens: &[TokenInfo]) -> Result<TokenTree, ParseError> {
        self.group_tokens(tokens, 0)
    }

    fn group_tokens(&self, tokens: &[TokenInfo], depth: usize) -> Result<TokenTree, ParseError> {
        if depth > self.max_depth {
            let span = tokens.first().map(|info| info.span).unwrap_or_default();
            return Err(ParseError::new(ErrorKind::TooDeep(self.max_depth), span));
        }

        debug!("grouping {} tokens at depth {}", tokens.len(), depth);

        let (first, last) = match tokens {
            [] => return Err(ParseError::new(ErrorKind::EmptySource, Span::default())),
            [only] => {
                return match &only.token {
                    Token::Text(text) => Ok(TokenTree::Leaf(text.clone())),
                    Token::Delim(_) => Err(ParseError::new(
                        ErrorKind::UnexpectedToken(only.token.clone()),
                        only.span,
                    )),
                };
            }
            [first, .., last] => (first, last),
        };

        if let Token::Delim(delim) = first.token {
            let content = &tokens[1..tokens.len() - 1];

            return match delim {
                Delim::LeftParen => {
                    self.expect_closer(last, delim, first.span)?;
                    // Parentheses only wrap; they have no node of their own.
                    self.group_tokens(content, depth + 1)
                }
                Delim::LeftBrace => {
                    self.expect_closer(last, delim, first.span)?;
                    let items = self.group_items(content, Delim::Semicolon, depth + 1)?;
                    Ok(TokenTree::Table(items))
                }
                Delim::LeftBracket => {
                    self.expect_closer(last, delim, first.span)?;
                    let items = self.group_items(content, Delim::Comma, depth + 1)?;
                    Ok(TokenTree::Sequence(items))
                }
                delim if delim.is_closing() => Err(ParseError::new(
                    ErrorKind::UnmatchedCloser(delim),
                    first.span,
                )),
                _ => Err(ParseError::new(ErrorKind::Malformed, first.span)),
            };
        }

        match (&first.token, &tokens[1].token) {
            (Token::Text(name), Token::Delim(Delim::Equals)) => {
                let value = strip_trailing_separator(&tokens[2..]);
                Ok(TokenTree::Assignment {
                    name: name.clone(),
                    value: Box::new(self.group_tokens(value, depth + 1)?),
                })
            }
            (Token::Text(arg), Token::Delim(Delim::Colon)) => Ok(TokenTree::LambdaLeaf {
                arg: arg.clone(),
                term: Box::new(self.group_tokens(&tokens[2..], depth + 1)?),
            }),
            _ => match &last.token {
                // A single trailing separator is tolerated on any run.
                Token::Delim(delim) if delim.is_separator() => {
                    self.group_tokens(&tokens[..tokens.len() - 1], depth)
                }
                _ => Err(ParseError::new(ErrorKind::Malformed, first.span)),
            },
        }
    }

    /// Build the elements of a group body: split on the separator, re-merge
    /// chunks that were split inside a nested same-kind group, then group
    /// each chunk.
    fn group_items(
        &self,
        content: &[TokenInfo],
        separator: Delim,
        depth: usize,
    ) -> Result<Vec<TokenTree>, ParseError> {
        let chunks = merge_chunks(content, partition(content, separator))?;

        let mut items = Vec::with_capacity(chunks.len());
        for range in chunks {
            let chunk = strip_trailing_separator(&content[range]);
            items.push(self.group_tokens(chunk, depth)?);
        }

        Ok(items)
    }

    fn expect_closer(&self, last: &TokenInfo, opener: Delim, span: Span) -> Result<(), ParseError> {
        match opener.closing() {
            Some(closer) if last.token == Token::Delim(closer) => Ok(()),
            _ => Err(ParseError::new(ErrorKind::UnbalancedDelimiter(opener), span)),
        }
    }
}

/// Split a group body on its separator.
///
/// Each separator closes the current chunk and is included in it; a final
/// partial chunk without a separator is flushed if non-empty. The scan is
/// oblivious to nesting, which `merge_chunks` corrects afterwards. Chunks
/// are ranges over the body so that merging widens a range instead of
/// copying tokens.
fn partition(content: &[TokenInfo], separator: Delim) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = 0;

    for (index, info) in content.iter().enumerate() {
        if info.token == Token::Delim(separator) {
            chunks.push(start..index + 1);
            start = index + 1;
        }
    }

    if start < content.len() {
        chunks.push(start..content.len());
    }

    chunks
}

/// State of the chunk merging pass.
enum MergeState {
    /// No unmatched opener pending.
    Walk,

    /// An opener is awaiting its closer; chunks accumulate into the range
    /// beginning at `start` until `depth` occurrences of `closer` have been
    /// matched.
    Search {
        opener: Delim,
        closer: Delim,
        depth: usize,
        start: usize,
        span: Span,
    },
}

/// Re-join chunks that the separator scan split inside a nested group.
///
/// A chunk containing an opener with no closer in the same chunk starts a
/// merge; following chunks are absorbed while counting same-kind opens and
/// closes, and the merge completes when the count returns to zero. Running
/// out of chunks with a merge still pending means the opener is never
/// closed.
fn merge_chunks(
    content: &[TokenInfo],
    chunks: Vec<Range<usize>>,
) -> Result<Vec<Range<usize>>, ParseError> {
    let mut merged = Vec::new();
    let mut state = MergeState::Walk;

    for chunk in chunks {
        state = match state {
            MergeState::Walk => match unclosed(&content[chunk.clone()])? {
                None => {
                    merged.push(chunk);
                    MergeState::Walk
                }
                Some(pending) => {
                    debug!(
                        "chunk has unclosed '{}', merging until '{}' at depth {}",
                        pending.opener, pending.closer, pending.depth,
                    );
                    MergeState::Search {
                        opener: pending.opener,
                        closer: pending.closer,
                        depth: pending.depth,
                        start: chunk.start,
                        span: pending.span,
                    }
                }
            },
            MergeState::Search {
                opener,
                closer,
                mut depth,
                start,
                span,
            } => {
                for info in &content[chunk.clone()] {
                    match info.token {
                        Token::Delim(delim) if delim == opener => depth += 1,
                        Token::Delim(delim) if delim == closer => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }

                if depth == 0 {
                    debug!("merge complete: chunk {}..{}", start, chunk.end);
                    merged.push(start..chunk.end);
                    MergeState::Walk
                } else {
                    MergeState::Search {
                        opener,
                        closer,
                        depth,
                        start,
                        span,
                    }
                }
            }
        };
    }

    if let MergeState::Search { opener, span, .. } = state {
        return Err(ParseError::new(ErrorKind::UnbalancedDelimiter(opener), span));
    }

    Ok(merged)
}

/// An opener found in a chunk with no matching closer in the same chunk.
#[derive(Clone, Copy, Debug)]
struct Pending {
    opener: Delim,
    closer: Delim,
    depth: usize,
    span: Span,
}

/// Scan a single chunk for an opener left unclosed within it.
///
/// Depth counting is per delimiter kind: once an opener is pending, only
/// re-opens of the same opener and its closer move the count. A closer seen
/// with nothing pending has no opener anywhere in the enclosing body, since
/// chunks are scanned in source order.
fn unclosed(chunk: &[TokenInfo]) -> Result<Option<Pending>, ParseError> {
    let mut pending: Option<Pending> = None;

    for info in chunk {
        let delim = match info.token {
            Token::Delim(delim) => delim,
            Token::Text(_) => continue,
        };

        pending = match pending {
            None => match delim.closing() {
                Some(closer) => Some(Pending {
                    opener: delim,
                    closer,
                    depth: 1,
                    span: info.span,
                }),
                None => {
                    if delim.is_closing() {
                        return Err(ParseError::new(
                            ErrorKind::UnmatchedCloser(delim),
                            info.span,
                        ));
                    }
                    None
                }
            },
            Some(mut pending) => {
                if delim == pending.opener {
                    pending.depth += 1;
                } else if delim == pending.closer {
                    pending.depth -= 1;
                }

                if pending.depth == 0 {
                    None
                } else {
                    Some(pending)
                }
            }
        };
    }

    Ok(pending)
}

/// Drop a single trailing separator from a token run, if present.
fn strip_trailing_separator(tokens: &[TokenInfo]) -> &[TokenInfo] {
    match tokens.split_last() {
        Some((last, rest)) => match last.token {
            Token::Delim(delim) if delim.is_separator() => rest,
            _ => tokens,
        },
        None => tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<TokenInfo> {
        tokenize(&SourceFile::buffer(None, source))
    }

    fn leaf(value: &str) -> TokenTree {
        TokenTree::Leaf(value.into())
    }

    fn assignment(name: &str, value: TokenTree) -> TokenTree {
        TokenTree::Assignment {
            name: name.into(),
            value: Box::new(value),
        }
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(group(&[]).unwrap_err().kind, ErrorKind::EmptySource);
        assert_eq!(
            parse(&SourceFile::buffer(None, "")).unwrap_err().kind,
            ErrorKind::EmptySource,
        );
    }

    #[test]
    fn test_single_leaf() {
        assert_eq!(group(&tokens("5")).unwrap(), leaf("5"));
    }

    #[test]
    fn test_lone_delimiter() {
        assert_eq!(
            group(&tokens(";")).unwrap_err().kind,
            ErrorKind::UnexpectedToken(Token::Delim(Delim::Semicolon)),
        );
    }

    #[test]
    fn test_malformed_run() {
        assert_eq!(group(&tokens("4 5")).unwrap_err().kind, ErrorKind::Malformed);
    }

    #[test]
    fn test_trailing_separator_is_tolerated() {
        assert_eq!(group(&tokens("4 ;")).unwrap(), leaf("4"));
        assert_eq!(group(&tokens("4 ,")).unwrap(), leaf("4"));
    }

    #[test]
    fn test_parens_are_transparent() {
        assert_eq!(group(&tokens("(4)")).unwrap(), leaf("4"));
        assert_eq!(group(&tokens("((4))")).unwrap(), leaf("4"));
        assert_eq!(
            group(&tokens("(a: a)")).unwrap(),
            TokenTree::LambdaLeaf {
                arg: "a".into(),
                term: Box::new(leaf("a")),
            },
        );
    }

    #[test]
    fn test_assignment_without_trailing_separator() {
        assert_eq!(group(&tokens("a = 5")).unwrap(), assignment("a", leaf("5")));
        assert_eq!(group(&tokens("a = 5 ;")).unwrap(), assignment("a", leaf("5")));
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(group(&tokens("{}")).unwrap(), TokenTree::Table(vec![]));
        assert_eq!(group(&tokens("[]")).unwrap(), TokenTree::Sequence(vec![]));
    }

    #[test]
    fn test_unbalanced_opener_fails() {
        let error = group(&tokens("{ a = 5 ;")).unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnbalancedDelimiter(Delim::LeftBrace));
        assert_eq!(error.span.start.column, 1);

        assert_eq!(
            group(&tokens("[ 4 , [ 5 ]")).unwrap_err().kind,
            ErrorKind::UnbalancedDelimiter(Delim::LeftBracket),
        );
    }

    #[test]
    fn test_unbalanced_nested_opener_fails() {
        // The outer brackets match; the inner opener never closes.
        assert_eq!(
            group(&tokens("[ { a = 5 ; ]")).unwrap_err().kind,
            ErrorKind::UnbalancedDelimiter(Delim::LeftBrace),
        );
    }

    #[test]
    fn test_unmatched_closer_fails() {
        assert_eq!(
            group(&tokens("} a")).unwrap_err().kind,
            ErrorKind::UnmatchedCloser(Delim::RightBrace),
        );
        assert_eq!(
            group(&tokens("[ ] ]")).unwrap_err().kind,
            ErrorKind::UnmatchedCloser(Delim::RightBracket),
        );
    }

    #[test]
    fn test_depth_limit() {
        let grouper = Grouper::with_max_depth(2);
        assert_eq!(
            grouper.group(&tokens("[[[1]]]")).unwrap_err().kind,
            ErrorKind::TooDeep(2),
        );

        // The same input is fine for the default grouper.
        assert!(group(&tokens("[[[1]]]")).is_ok());
    }

    #[test]
    fn test_partition_includes_separators() {
        let content = tokens("1 , 2 , 3");
        assert_eq!(partition(&content, Delim::Comma), vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn test_partition_without_trailing_chunk() {
        let content = tokens("1 , 2 ,");
        assert_eq!(partition(&content, Delim::Comma), vec![0..2, 2..4]);
    }

    #[test]
    fn test_unclosed_reports_pending_opener() {
        let pending = unclosed(&tokens("a = { b = {")).unwrap().unwrap();
        assert_eq!(pending.opener, Delim::LeftBrace);
        assert_eq!(pending.closer, Delim::RightBrace);
        assert_eq!(pending.depth, 2);

        assert!(unclosed(&tokens("a = { b }")).unwrap().is_none());
        assert!(unclosed(&tokens("a = 5")).unwrap().is_none());
    }

    #[test]
    fn test_unclosed_ignores_other_kinds_while_searching() {
        // The bracket pair is nested inside the pending brace.
        let pending = unclosed(&tokens("{ x = [ 4 , 5 ]")).unwrap().unwrap();
        assert_eq!(pending.opener, Delim::LeftBrace);
        assert_eq!(pending.depth, 1);
    }

    #[test]
    fn test_unclosed_rejects_stray_closer() {
        assert_eq!(
            unclosed(&tokens("a } b")).unwrap_err().kind,
            ErrorKind::UnmatchedCloser(Delim::RightBrace),
        );
    }

    #[test]
    fn test_merge_rejoins_nested_same_kind_groups() {
        let content = tokens("[ a , b ] , [ c , d ]");
        let chunks = partition(&content, Delim::Comma);
        assert_eq!(chunks.len(), 4);

        let merged = merge_chunks(&content, chunks).unwrap();
        assert_eq!(merged, vec![0..6, 6..11]);
    }

    #[test]
    fn test_merge_counts_multiple_closers_in_one_chunk() {
        // Both inner tables close inside the final chunk; every closer
        // occurrence must count, not one per chunk.
        let content = tokens("a = { b = { x = 1 ; } }");
        let chunks = partition(&content, Delim::Semicolon);
        let merged = merge_chunks(&content, chunks).unwrap();
        assert_eq!(merged, vec![0..content.len()]);
    }

    #[test]
    fn test_nested_sequences_group_as_a_tree() {
        assert_eq!(
            group(&tokens("[ [ a , b ] , [ c , d ] ]")).unwrap(),
            TokenTree::Sequence(vec![
                TokenTree::Sequence(vec![leaf("a"), leaf("b")]),
                TokenTree::Sequence(vec![leaf("c"), leaf("d")]),
            ]),
        );
    }

    #[test]
    fn test_nested_tables_group_as_a_tree() {
        assert_eq!(
            group(&tokens("{ a = { x = 5; y = 6; }; b = { z = 7; t = 8; }; }")).unwrap(),
            TokenTree::Table(vec![
                assignment(
                    "a",
                    TokenTree::Table(vec![
                        assignment("x", leaf("5")),
                        assignment("y", leaf("6")),
                    ]),
                ),
                assignment(
                    "b",
                    TokenTree::Table(vec![
                        assignment("z", leaf("7")),
                        assignment("t", leaf("8")),
                    ]),
                ),
            ]),
        );
    }

    #[test]
    fn test_leaf_count_matches_text_token_count() {
        fn count_leaves(tree: &TokenTree) -> usize {
            match tree {
                TokenTree::Leaf(_) => 1,
                TokenTree::Table(items) | TokenTree::Sequence(items) => {
                    items.iter().map(count_leaves).sum()
                }
                TokenTree::Assignment { value, .. } => count_leaves(value),
                TokenTree::LambdaLeaf { term, .. } => count_leaves(term),
            }
        }

        let source = "[{x = 5; y = [4, 5];}]";
        let stream = tokens(source);

        let text_tokens = stream
            .iter()
            .filter(|info| match info.token {
                Token::Text(_) => true,
                Token::Delim(_) => false,
            })
            .count();

        let tree = group(&stream).unwrap();
        // Assignment names and lambda arguments are text tokens consumed by
        // their nodes rather than leaves, so count them back in.
        fn count_names(tree: &TokenTree) -> usize {
            match tree {
                TokenTree::Leaf(_) => 0,
                TokenTree::Table(items) | TokenTree::Sequence(items) => {
                    items.iter().map(count_names).sum()
                }
                TokenTree::Assignment { value, .. } => 1 + count_names(value),
                TokenTree::LambdaLeaf { term, .. } => 1 + count_names(term),
            }
        }

        assert_eq!(count_leaves(&tree) + count_names(&tree), text_tokens);
    }
}
