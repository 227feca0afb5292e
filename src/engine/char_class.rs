//! Character class lookup tables for O(1) membership testing
//!
//! Every byte maps to a bit set of the classes it belongs to, computed at
//! compile time. Classes are ASCII-only; multi-byte UTF-8 characters never
//! belong to a class and are matched with literals or `any`.

use serde::{Deserialize, Serialize};

const DIGIT: u16 = 1 << 0;
const LOWER: u16 = 1 << 1;
const UPPER: u16 = 1 << 2;
const UNDERSCORE: u16 = 1 << 3;
const BLANK: u16 = 1 << 4;
const SPACE: u16 = 1 << 5;
const HEX: u16 = 1 << 6;

/// A named single-byte character class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    /// `[0-9]`
    Digit,
    /// `[0-9a-fA-F]`
    HexDigit,
    /// `[a-z]`
    Lower,
    /// `[A-Z]`
    Upper,
    /// `[a-zA-Z]`
    Alpha,
    /// `[a-zA-Z0-9]`
    Alnum,
    /// `[a-zA-Z0-9_]`
    Word,
    /// `[a-zA-Z_]`, the first character of an identifier
    IdentStart,
    /// `[ \t]`
    Blank,
    /// `[ \t\n\r\x0B\x0C]`
    Space,
}

impl CharClass {
    /// Check whether a byte belongs to this class
    #[inline(always)]
    pub fn matches(self, b: u8) -> bool {
        let flags = CLASS_TABLE[b as usize];
        let mask = match self {
            Self::Digit => DIGIT,
            Self::HexDigit => HEX,
            Self::Lower => LOWER,
            Self::Upper => UPPER,
            Self::Alpha => LOWER | UPPER,
            Self::Alnum => LOWER | UPPER | DIGIT,
            Self::Word => LOWER | UPPER | DIGIT | UNDERSCORE,
            Self::IdentStart => LOWER | UPPER | UNDERSCORE,
            Self::Blank => BLANK,
            Self::Space => SPACE,
        };
        flags & mask != 0
    }

    /// Short bracket-expression form, used in trace output and DOT labels
    pub fn describe(self) -> &'static str {
        match self {
            Self::Digit => "[0-9]",
            Self::HexDigit => "[0-9a-fA-F]",
            Self::Lower => "[a-z]",
            Self::Upper => "[A-Z]",
            Self::Alpha => "[a-zA-Z]",
            Self::Alnum => "[a-zA-Z0-9]",
            Self::Word => "[a-zA-Z0-9_]",
            Self::IdentStart => "[a-zA-Z_]",
            Self::Blank => "[ \\t]",
            Self::Space => "[\\s]",
        }
    }
}

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0usize;
    while i < 256 {
        let b = i as u8;
        let mut flags = 0u16;
        if b.is_ascii_digit() {
            flags |= DIGIT | HEX;
        }
        if b.is_ascii_lowercase() {
            flags |= LOWER;
        }
        if b.is_ascii_uppercase() {
            flags |= UPPER;
        }
        if matches!(b, b'a'..=b'f' | b'A'..=b'F') {
            flags |= HEX;
        }
        if b == b'_' {
            flags |= UNDERSCORE;
        }
        if b == b' ' || b == b'\t' {
            flags |= BLANK | SPACE;
        }
        if matches!(b, b'\n' | b'\r' | 0x0B | 0x0C) {
            flags |= SPACE;
        }
        table[i] = flags;
        i += 1;
    }
    table
}

static CLASS_TABLE: [u16; 256] = build_table();

/// Get the UTF-8 character length from the first byte
///
/// Invalid lead bytes count as a single byte so the cursor always advances.
#[inline(always)]
pub fn utf8_char_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else if first_byte & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}
