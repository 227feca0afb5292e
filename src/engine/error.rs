//! Error types
//!
//! Input that does not match the grammar is not an error in the `Result`
//! sense: it is reported as a [`SyntaxError`] value next to a failed parse.
//! Everything else (bad grammars, unreadable files, broken engine
//! invariants) is an error type here.

use super::cursor::Position;
use super::grammar::RuleId;
use super::grammar_analysis::GrammarIssue;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Internal invariant violations raised while matching
///
/// These abort the parse and are never reported as syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineFault {
    /// Rule nesting went deeper than the configured limit
    #[error("recursion limit of {limit} exceeded at {position} in rule {rule}")]
    RecursionLimit {
        /// Configured limit
        limit: usize,
        /// Rule being entered
        rule: String,
        /// Where it happened
        position: Position,
    },

    /// A repetition body matched without consuming input
    #[error("rule {rule} matched empty input inside a loop at {position}")]
    NoProgress {
        /// The looping rule
        rule: String,
        /// Where it happened
        position: Position,
    },

    /// Checkpoints were left open when the top-level match returned
    #[error("{open} checkpoint(s) left open after the top-level match")]
    UnbalancedCheckpoints {
        /// Number of open checkpoints
        open: usize,
    },

    /// The step budget ran out
    #[error("parse cancelled after {steps} steps")]
    Cancelled {
        /// Steps taken
        steps: u64,
    },
}

/// Defects found while building a grammar or binding actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A declared rule was never defined
    #[error("rule `{0}` was declared but never defined")]
    UndefinedRule(String),

    /// Two rules share a name
    #[error("rule `{0}` is defined more than once")]
    DuplicateRule(String),

    /// An action names a rule that does not exist
    #[error("no rule named `{0}`")]
    UnknownRule(String),

    /// Two actions were bound to the same rule
    #[error("rule {0} already has an action")]
    DuplicateHandler(RuleId),
}

/// Input that does not match the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Name of the content, usually a file path
    pub content_name: String,
    /// Farthest position the parse reached
    pub position: Position,
    /// The source line containing `position`
    pub line: String,
}

impl SyntaxError {
    /// The failure report: a banner, the offending line and a caret under
    /// the failing column
    pub fn report(&self) -> String {
        format!(
            "PARSE FAIL\n{}\n{}^",
            self.line,
            "-".repeat(self.position.column.saturating_sub(1))
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: syntax error",
            self.content_name, self.position
        )
    }
}

/// Content could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Errors surfaced by the driver
#[derive(Debug, Error)]
pub enum ParrError {
    /// The static grammar check found issues
    #[error("grammar definition has {} issue(s)", issues.len())]
    GrammarDefinition {
        /// Everything the analyzer reported
        issues: Vec<GrammarIssue>,
    },

    /// A grammar or action table could not be built
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// Content could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The engine broke an internal invariant
    #[error("engine fault: {0}")]
    Fault(#[from] EngineFault),

    /// A configuration file could not be used
    #[error("invalid configuration {path}: {message}")]
    Config {
        /// Configuration file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A report could not be written
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_puts_caret_under_column() {
        let error = SyntaxError {
            content_name: "test.ssl".to_string(),
            position: Position::new(4, 1, 5),
            line: "abc def".to_string(),
        };
        assert_eq!(error.report(), "PARSE FAIL\nabc def\n----^");
        assert_eq!(error.to_string(), "test.ssl:1:5: syntax error");
    }

    #[test]
    fn test_fault_messages() {
        let fault = EngineFault::Cancelled { steps: 10 };
        assert_eq!(fault.to_string(), "parse cancelled after 10 steps");
        let err: ParrError = fault.into();
        assert!(err.to_string().starts_with("engine fault"));
    }
}
