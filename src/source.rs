//! Abstractions over reading files and source code used in the parser.
use std::borrow::Borrow;
use std::fs;
use std::io;
use std::path::Path;

/// A reference to a location in a source file. Useful for error messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    /// The line number. Begins at 1.
    pub line: usize,

    /// The column position in the current line. Begins at 1.
    pub column: usize,

    /// Byte offset from the beginning of the file.
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

/// A span of characters in a source file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Span {
    /// The starting position.
    pub start: Position,

    /// The ending position.
    pub end: Position,
}

impl From<Position> for Span {
    fn from(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// Holds information about a source file being parsed in memory.
#[derive(Clone)]
pub struct SourceFile {
    name: Option<String>,
    buffer: String,
}

impl SourceFile {
    /// Create a new file map using an in-memory buffer.
    pub fn buffer(name: impl Into<Option<String>>, buffer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: buffer.into(),
        }
    }

    /// Open a file as a file map.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path.file_name().map(|s| s.to_string_lossy().into_owned());

        fs::read_to_string(path).map(|string| Self::buffer(name, string))
    }

    /// Get the name of the file.
    pub fn name(&self) -> &str {
        self.name
            .as_ref()
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    pub fn source(&self) -> &str {
        &self.buffer
    }
}

/// A cursor over the bytes of a source file that tracks line and column
/// positions as it advances.
pub struct SourceCursor<F> {
    file: F,
    pos: Position,
    mark: Position,
}

impl<F: Borrow<SourceFile>> From<F> for SourceCursor<F> {
    fn from(file: F) -> Self {
        Self {
            file,
            pos: Position::default(),
            mark: Position::default(),
        }
    }
}

impl<F: Borrow<SourceFile>> SourceCursor<F> {
    /// Get the file being read.
    #[inline]
    pub fn file(&self) -> &SourceFile {
        self.file.borrow()
    }

    /// Get the current position in the file.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Get the byte offset of the current position.
    pub fn offset(&self) -> usize {
        self.pos.offset
    }

    /// Remember the current position as the start of the next span.
    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Get the span from the last mark to the current position.
    pub fn span(&self) -> Span {
        Span {
            start: self.mark,
            end: self.pos,
        }
    }

    pub fn peek(&self) -> Option<u8> {
        self.file().source().as_bytes().get(self.pos.offset).copied()
    }

    pub fn advance(&mut self) -> Option<u8> {
        match self.peek() {
            Some(b'\n') => {
                self.pos.offset += 1;
                self.pos.line += 1;
                self.pos.column = 1;
                Some(b'\n')
            }
            Some(byte) => {
                self.pos.offset += 1;
                self.pos.column += 1;
                Some(byte)
            }
            None => None,
        }
    }
}
