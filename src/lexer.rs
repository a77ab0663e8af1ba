//! Splits a source file into a stream of tokens.
use crate::source::{SourceCursor, SourceFile};
use crate::tokens::{Delim, Token, TokenInfo};
use std::borrow::Borrow;

/// Tokenizes a file into a series of tokens.
///
/// Each token is either a single delimiter character or a maximal run of
/// non-delimiter, non-whitespace characters. Whitespace terminates the
/// current text run and is discarded; it never becomes a token and is never
/// merged into adjacent text. Every other character lands in exactly one
/// token, so lexing never fails.
pub struct Lexer<F> {
    cursor: SourceCursor<F>,
}

impl<F: Borrow<SourceFile>> From<F> for Lexer<F> {
    fn from(file: F) -> Self {
        Self {
            cursor: SourceCursor::from(file),
        }
    }
}

impl<F: Borrow<SourceFile>> Lexer<F> {
    /// Get the file being lexed.
    #[inline]
    pub fn file(&self) -> &SourceFile {
        self.cursor.file()
    }

    /// Advance to the next token in the source.
    ///
    /// Returns `None` once the end of the source is reached.
    pub fn lex(&mut self) -> Option<TokenInfo> {
        loop {
            self.cursor.mark();

            let byte = self.cursor.peek()?;

            if let Some(delim) = Delim::from_byte(byte) {
                self.cursor.advance();
                return Some(self.create_token(Token::Delim(delim)));
            }

            if byte.is_ascii_whitespace() {
                self.cursor.advance();
                continue;
            }

            return Some(self.lex_text());
        }
    }

    fn lex_text(&mut self) -> TokenInfo {
        let start = self.cursor.offset();

        while let Some(byte) = self.cursor.peek() {
            if Delim::from_byte(byte).is_some() || byte.is_ascii_whitespace() {
                break;
            }
            self.cursor.advance();
        }

        // Text runs break only at ASCII delimiter or whitespace bytes, so
        // the slice boundaries always fall on character boundaries.
        let text = self.file().source()[start..self.cursor.offset()].to_owned();

        self.create_token(Token::Text(text))
    }

    fn create_token(&self, token: Token) -> TokenInfo {
        TokenInfo {
            token,
            span: self.cursor.span(),
        }
    }
}

impl<F: Borrow<SourceFile>> Iterator for Lexer<F> {
    type Item = TokenInfo;

    fn next(&mut self) -> Option<TokenInfo> {
        self.lex()
    }
}

/// Lex an entire file into a token sequence.
pub fn tokenize<F: Borrow<SourceFile>>(file: F) -> Vec<TokenInfo> {
    Lexer::from(file).collect()
}
