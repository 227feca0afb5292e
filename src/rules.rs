//! Lexical rules shared by grammars
//!
//! Line terminators, comments, blanks and byte-order marks. [`Lexical::define`]
//! adds them to a builder once; a grammar then refers to the returned ids.
//!
//! Comments come in three kinds:
//! - short: `//` up to the end of the line or input, terminator excluded
//! - medium: `/* ... */` on a single line
//! - long: `/* ... */` spanning lines, only tried once medium has failed

use crate::engine::parser_dsl::*;
use crate::engine::RuleId;
use crate::{choice, seq};

/// Byte-order-mark signatures, longest first so UTF-32 LE wins over UTF-16 LE
pub const BOM_SIGNATURES: [(&str, &[u8]); 5] = [
    ("bom::utf32le", &[0xFF, 0xFE, 0x00, 0x00]),
    ("bom::utf32be", &[0x00, 0x00, 0xFE, 0xFF]),
    ("bom::utf8", &[0xEF, 0xBB, 0xBF]),
    ("bom::utf16le", &[0xFF, 0xFE]),
    ("bom::utf16be", &[0xFE, 0xFF]),
];

/// Ids of the shared lexical rules
#[derive(Debug, Clone, Copy)]
pub struct Lexical {
    /// `\n` or `\r\n`
    pub eol: RuleId,
    /// End of input
    pub eof: RuleId,
    /// `eol` or end of input
    pub eolf: RuleId,
    /// `//` comment
    pub comment_short: RuleId,
    /// Single-line `/* */` comment
    pub comment_medium: RuleId,
    /// Multi-line `/* */` comment
    pub comment_long: RuleId,
    /// Any comment
    pub comment: RuleId,
    /// Spaces and tabs
    pub spaces: RuleId,
    /// One or more of spaces, line terminators and comments
    pub blank: RuleId,
    /// Optional `blank`
    pub blank_opt: RuleId,
    /// Optional byte-order mark
    pub bom: RuleId,
    /// Trailing blanks up to the end of input
    pub blanks_eof: RuleId,
}

impl Lexical {
    /// Add the lexical rules to `b`
    pub fn define(b: &mut GrammarBuilder) -> Self {
        let eol = b.rule("eol", choice!["\n", "\r\n"]);
        let end = b.rule("eof", eof());
        let eolf = b.rule("eolf", choice![eol, end]);

        let comment_short = b.rule("comment::short", seq!["//", until(eolf, any())]);
        let comment_medium = b.rule(
            "comment::medium",
            seq!["/*", until("*/", seq![eolf.not_at(), any()]), "*/"],
        );
        let comment_long = b.rule("comment::long", seq!["/*", until("*/", any()), "*/"]);
        let comment = b.rule(
            "comment",
            choice![comment_short, comment_medium, comment_long],
        );

        let spaces = b.rule("blanks::spaces", one_of(" \t").plus());
        let blank = b.rule("blank", choice![spaces, eol, comment].plus());
        let blank_opt = b.rule("blankOpt", blank.opt());

        let signatures: Vec<RuleId> = BOM_SIGNATURES
            .iter()
            .map(|(name, signature)| b.rule(name, bytes(signature)))
            .collect();
        let bom = b.rule("bom::optional", choice(signatures).opt());

        let blanks_eof = b.rule("blanks::eof", seq![blank_opt, end]);

        Self {
            eol,
            eof: end,
            eolf,
            comment_short,
            comment_medium,
            comment_long,
            comment,
            spaces,
            blank,
            blank_opt,
            bom,
            blanks_eof,
        }
    }

    /// Identifier: a letter or underscore, then word characters
    pub fn identifier() -> Sequence {
        seq![class(CharClass::IdentStart), class(CharClass::Word).star()]
    }
}
