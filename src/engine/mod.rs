//! Backtracking PEG engine
//!
//! The engine matches a [`Grammar`] arena against a byte buffer by recursive
//! descent with exact rewinding. Everything a run produces besides the match
//! itself (actions, coverage, traces, trees) hangs off two seams: the
//! [`ActionTable`] and the [`MatchObserver`].
//!
//! # Module Organization
//!
//! ## Core Types
//! - [`Cursor`] / [`Position`] - input position with O(1) checkpoints
//! - [`Grammar`] / [`Rule`] / [`RuleId`] - the rule arena
//! - [`Matcher`] - the recursive-descent matcher
//!
//! ## Parser DSL
//! - [`parser_dsl`] - combinators and the [`GrammarBuilder`]
//!
//! ## Actions
//! - [`ActionTable`] / [`ParseState`] - callbacks on named rules
//!
//! ## Observers
//! - [`coverage`] - per-rule attempt counts
//! - [`debug`] - execution traces and grammar graphs
//! - [`tree`] - concrete syntax trees
//!
//! ## Analysis
//! - [`grammar_analysis`] - static checks for loops that cannot terminate
//!
//! ## Strategies
//! - [`strategy`] - direct and two-phase attempts
//! - [`parallel`] - batches of independent inputs

// ============================================================================
// Module Declarations
// ============================================================================

pub mod action;
pub mod char_class;
pub mod coverage;
pub mod cursor;
pub mod debug;
pub mod error;
pub mod grammar;
pub mod grammar_analysis;
pub mod matcher;
pub mod parallel;
pub mod parser_dsl;
pub mod strategy;
pub mod tree;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::{ActionInput, ActionTable, ParseState};
pub use char_class::CharClass;
pub use coverage::{CoverageObserver, CoverageReport};
pub use cursor::{Checkpoint, Cursor, Position};
pub use debug::{GrammarVisualizer, ParseTrace, TraceConfig, TraceObserver};
pub use error::{EngineFault, GrammarError, LoadError, ParrError, SyntaxError};
pub use grammar::{Grammar, Rule, RuleId};
pub use grammar_analysis::{GrammarAnalyzer, GrammarIssue, IssueKind};
pub use matcher::{
    recognize, MatchEvent, MatchLimits, MatchObserver, MatchOutcome, Matcher, NoopObserver,
};
pub use parser_dsl::{GrammarBuilder, Parslet, ParsletExt};
pub use strategy::{Direct, ParseStrategy, StrategyConfig, TwoPhase};
pub use tree::{ParseTree, TreeBuilder, TreeNode};
