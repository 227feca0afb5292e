//! Input cursor with O(1) checkpoints
//!
//! The cursor walks an immutable byte buffer and keeps the current
//! [`Position`] up to date as it advances. A [`Checkpoint`] is a copy of the
//! position plus the nesting level at which it was taken; rewinding restores
//! both, so rewinding is exact and can be repeated.

use super::char_class::utf8_char_len;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from start of input
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in UTF-8 characters)
    pub column: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The position of the first byte of any input
    #[inline]
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A saved cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: Position,
    level: usize,
}

impl Checkpoint {
    /// Position the checkpoint was taken at
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }
}

/// Cursor over an input buffer
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    position: Position,
    open: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `input`
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: Position::start(),
            open: 0,
        }
    }

    /// The whole input
    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Current position
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current byte offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    /// Unconsumed input
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.position.offset..]
    }

    /// Input between two offsets
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start.min(self.input.len())..end.min(self.input.len())]
    }

    /// Next byte without consuming it
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.position.offset).copied()
    }

    /// Whether the unconsumed input begins with `bytes`
    #[inline]
    pub fn starts_with(&self, bytes: &[u8]) -> bool {
        self.remaining().starts_with(bytes)
    }

    /// Consume one UTF-8 character; false at end of input
    pub fn advance(&mut self) -> bool {
        match self.peek() {
            Some(b) => {
                let len = utf8_char_len(b).min(self.input.len() - self.position.offset);
                self.advance_bytes(len);
                true
            }
            None => false,
        }
    }

    /// Consume `n` bytes, updating line and column
    pub fn advance_bytes(&mut self, n: usize) {
        let end = (self.position.offset + n).min(self.input.len());
        for &b in &self.input[self.position.offset..end] {
            if b == b'\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.position.column += 1;
            }
        }
        self.position.offset = end;
    }

    /// Save the current state
    #[inline]
    pub fn mark(&mut self) -> Checkpoint {
        let checkpoint = Checkpoint {
            position: self.position,
            level: self.open,
        };
        self.open += 1;
        checkpoint
    }

    /// Restore the position and level saved in `checkpoint`
    #[inline]
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.open = checkpoint.level;
    }

    /// Keep the consumed input and close `checkpoint`
    #[inline]
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.open = checkpoint.level;
    }

    /// Number of checkpoints taken and not yet rewound or committed
    #[inline]
    pub fn open_checkpoints(&self) -> usize {
        self.open
    }

    /// At end of input
    #[inline]
    pub fn at_end(&self) -> bool {
        self.position.offset >= self.input.len()
    }

    /// At offset zero
    #[inline]
    pub fn at_start(&self) -> bool {
        self.position.offset == 0
    }

    /// At the first byte of a line
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.position.offset == 0 || self.input.get(self.position.offset - 1) == Some(&b'\n')
    }

    /// Before `\n`, before `\r\n`, or at end of input
    #[inline]
    pub fn at_line_end(&self) -> bool {
        self.at_end() || self.starts_with(b"\n") || self.starts_with(b"\r\n")
    }

    /// The full line containing `offset`, without its line terminator
    pub fn line_at(&self, offset: usize) -> &'a [u8] {
        line_at(self.input, offset)
    }
}

/// The full line of `input` containing `offset`, without its line terminator
pub fn line_at(input: &[u8], offset: usize) -> &[u8] {
    let offset = offset.min(input.len());
    let start = memchr::memrchr(b'\n', &input[..offset]).map_or(0, |i| i + 1);
    let end = memchr::memchr(b'\n', &input[offset..]).map_or(input.len(), |i| offset + i);
    let line = &input[start..end];
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines_and_columns() {
        let mut cursor = Cursor::new(b"ab\ncd");
        assert!(cursor.advance());
        assert!(cursor.advance());
        assert_eq!(cursor.position(), Position::new(2, 1, 3));
        assert!(cursor.advance());
        assert_eq!(cursor.position(), Position::new(3, 2, 1));
        cursor.advance_bytes(2);
        assert!(cursor.at_end());
        assert!(!cursor.advance());
    }

    #[test]
    fn test_columns_count_characters() {
        let mut cursor = Cursor::new("é€x".as_bytes());
        assert!(cursor.advance());
        assert_eq!(cursor.position(), Position::new(2, 1, 2));
        assert!(cursor.advance());
        assert_eq!(cursor.position(), Position::new(5, 1, 3));
    }

    #[test]
    fn test_rewind_is_exact_and_idempotent() {
        let mut cursor = Cursor::new(b"hello\nworld");
        cursor.advance_bytes(2);
        let before = cursor.position();
        let checkpoint = cursor.mark();
        assert_eq!(cursor.open_checkpoints(), 1);
        cursor.advance_bytes(6);
        cursor.rewind(checkpoint);
        assert_eq!(cursor.position(), before);
        assert_eq!(cursor.open_checkpoints(), 0);
        cursor.rewind(checkpoint);
        assert_eq!(cursor.position(), before);
        assert_eq!(cursor.open_checkpoints(), 0);
    }

    #[test]
    fn test_commit_keeps_position() {
        let mut cursor = Cursor::new(b"abc");
        let outer = cursor.mark();
        let inner = cursor.mark();
        cursor.advance_bytes(2);
        cursor.commit(inner);
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.open_checkpoints(), 1);
        cursor.commit(outer);
        assert_eq!(cursor.open_checkpoints(), 0);
    }

    #[test]
    fn test_line_anchors() {
        let mut cursor = Cursor::new(b"a\r\nb");
        assert!(cursor.at_line_start());
        cursor.advance();
        assert!(cursor.at_line_end());
        cursor.advance_bytes(2);
        assert!(cursor.at_line_start());
        assert!(!cursor.at_line_end());
        cursor.advance();
        assert!(cursor.at_line_end());
    }

    #[test]
    fn test_line_at() {
        let input = b"first\r\nsecond line\nthird";
        assert_eq!(line_at(input, 0), b"first");
        assert_eq!(line_at(input, 9), b"second line");
        assert_eq!(line_at(input, input.len()), b"third");
    }
}
