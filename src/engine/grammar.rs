//! Grammar types
//!
//! A grammar is an arena of [`Rule`] nodes addressed by [`RuleId`]. Children
//! are referenced by id, so recursive rules are plain cycles in the arena and
//! the grammar is built once and shared by every parse.

use super::char_class::CharClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a rule in its grammar's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u32);

impl RuleId {
    /// Arena index
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A grammar node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Exact, case-sensitive byte match
    Literal {
        /// Bytes to match
        bytes: Vec<u8>,
    },

    /// One byte out of a set
    OneOf {
        /// Accepted bytes
        set: Vec<u8>,
    },

    /// One byte of a character class
    Class {
        /// The class to test against
        class: CharClass,
    },

    /// Exactly one UTF-8 character
    Any,

    /// All children in order
    Sequence {
        /// Child rules
        rules: Vec<RuleId>,
    },

    /// First child that matches
    Choice {
        /// Alternatives in priority order
        rules: Vec<RuleId>,
    },

    /// Greedy repetition with a lower bound
    Repeat {
        /// Repeated rule
        rule: RuleId,
        /// Minimum number of matches
        min: usize,
    },

    /// Zero or one match
    Optional {
        /// Inner rule
        rule: RuleId,
    },

    /// Positive lookahead
    And {
        /// Inner rule
        rule: RuleId,
    },

    /// Negative lookahead
    Not {
        /// Inner rule
        rule: RuleId,
    },

    /// Repeat `body` until `terminator` would match; the terminator is not consumed
    Until {
        /// Rule tested as a lookahead before each repetition
        terminator: RuleId,
        /// Repeated rule
        body: RuleId,
    },

    /// Zero-width: offset 0
    StartOfFile,
    /// Zero-width: first byte of a line
    StartOfLine,
    /// Zero-width: before a line terminator or at end of input
    EndOfLine,
    /// Zero-width: end of input
    EndOfFile,

    /// Gives a rule an identity for actions, coverage and trees
    Named {
        /// Rule name
        name: String,
        /// Wrapped rule
        rule: RuleId,
    },
}

impl Rule {
    /// Ids of the rules this rule refers to, in match order
    pub fn children(&self) -> Vec<RuleId> {
        match self {
            Rule::Sequence { rules } | Rule::Choice { rules } => rules.clone(),
            Rule::Repeat { rule, .. }
            | Rule::Optional { rule }
            | Rule::And { rule }
            | Rule::Not { rule }
            | Rule::Named { rule, .. } => vec![*rule],
            Rule::Until { terminator, body } => vec![*terminator, *body],
            Rule::Literal { .. }
            | Rule::OneOf { .. }
            | Rule::Class { .. }
            | Rule::Any
            | Rule::StartOfFile
            | Rule::StartOfLine
            | Rule::EndOfLine
            | Rule::EndOfFile => Vec::new(),
        }
    }

    /// Whether this rule examines the input directly
    pub fn is_terminal(&self) -> bool {
        self.children().is_empty()
    }

    /// Short description used for anonymous rules in traces and graphs
    pub fn describe(&self) -> String {
        match self {
            Rule::Literal { bytes } => format!("\"{}\"", escape_bytes(bytes)),
            Rule::OneOf { set } => format!("[{}]", escape_bytes(set)),
            Rule::Class { class } => class.describe().to_string(),
            Rule::Any => "any".to_string(),
            Rule::Sequence { rules } => format!("seq/{}", rules.len()),
            Rule::Choice { rules } => format!("choice/{}", rules.len()),
            Rule::Repeat { min: 0, .. } => "star".to_string(),
            Rule::Repeat { min: 1, .. } => "plus".to_string(),
            Rule::Repeat { min, .. } => format!("repeat{{{},}}", min),
            Rule::Optional { .. } => "opt".to_string(),
            Rule::And { .. } => "at".to_string(),
            Rule::Not { .. } => "not_at".to_string(),
            Rule::Until { .. } => "until".to_string(),
            Rule::StartOfFile => "bof".to_string(),
            Rule::StartOfLine => "bol".to_string(),
            Rule::EndOfLine => "eol".to_string(),
            Rule::EndOfFile => "eof".to_string(),
            Rule::Named { name, .. } => name.clone(),
        }
    }
}

/// Escape bytes for display: printable ASCII stays, everything else is `\xNN`
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02X}", b)),
        }
    }
    out
}

/// A complete grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    rules: Vec<Rule>,
    root: RuleId,
}

impl Grammar {
    /// Create a grammar from an arena and its root
    pub(crate) fn from_parts(rules: Vec<Rule>, root: RuleId) -> Self {
        Self { rules, root }
    }

    /// Top-level rule
    #[inline]
    pub fn root(&self) -> RuleId {
        self.root
    }

    /// Rule by id
    ///
    /// Ids handed out by the builder always resolve.
    #[inline(always)]
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Rule by id, or `None` for a foreign id
    #[inline]
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.index())
    }

    /// Number of rules in the arena
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the arena is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules with their ids
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId(i as u32), rule))
    }

    /// Named rules in definition order
    pub fn named(&self) -> impl Iterator<Item = (RuleId, &str)> {
        self.iter().filter_map(|(id, rule)| match rule {
            Rule::Named { name, .. } => Some((id, name.as_str())),
            _ => None,
        })
    }

    /// Find a named rule
    pub fn find(&self, name: &str) -> Option<RuleId> {
        self.named().find(|(_, n)| *n == name).map(|(id, _)| id)
    }

    /// Name of a named rule
    pub fn name(&self, id: RuleId) -> Option<&str> {
        match self.get(id) {
            Some(Rule::Named { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Display label: the name of a named rule, a short description otherwise
    pub fn label(&self, id: RuleId) -> String {
        self.get(id)
            .map(Rule::describe)
            .unwrap_or_else(|| id.to_string())
    }

    /// Serialize grammar to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize grammar from JSON
    ///
    /// Every child reference and the root must point into the arena.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        let grammar: Grammar = serde_json::from_str(s)?;
        let len = grammar.rules.len();
        let dangling = std::iter::once(grammar.root)
            .chain(grammar.rules.iter().flat_map(Rule::children))
            .find(|id| id.index() >= len);
        match dangling {
            Some(id) => Err(serde::de::Error::custom(format!(
                "rule {} is outside an arena of {} rules",
                id, len
            ))),
            None => Ok(grammar),
        }
    }
}
