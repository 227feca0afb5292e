//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from parr.
//! Importing this module with a wildcard import brings the core types into scope:
//!
//! ```
//! use parr::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Grammar`] - Rule arena
//! - [`Matcher`] - Recursive-descent matcher
//! - [`ParseState`] - Per-run state seen by actions
//! - [`ActionTable`] - Named rule to callback table
//!
//! ## Parser DSL
//! - [`lit()`], [`one_of()`], [`class()`], [`any()`] - terminals
//! - [`seq()`], [`choice()`], [`until()`] - composites
//! - [`bof()`], [`eof()`], [`line_start()`], [`line_end()`] - anchors
//! - [`GrammarBuilder`] - Builder for constructing grammars
//! - [`Parslet`] - Trait for parslet types
//! - [`ParsletExt`] - Extension trait for parslet combinators
//!
//! ## Driver
//! - [`Driver`] - Runs a [`Tool`] in a [`RunMode`]
//! - [`ParserConfig`] - Limits, strategy and trace layout
//!
//! ## Error Handling
//! - [`ParrError`] - Any failure surfaced by the driver
//! - [`SyntaxError`] - Input rejected by the grammar

// ============================================================================
// Core Types
// ============================================================================

pub use crate::engine::{
    ActionInput, ActionTable, CharClass, Grammar, MatchLimits, MatchObserver, Matcher,
    ParseState, Position, Rule, RuleId,
};

// ============================================================================
// Parser DSL
// ============================================================================

pub use crate::engine::parser_dsl::{
    any, bof, choice, class, eof, line_end, line_start, lit, one_of, seq, until, GrammarBuilder,
    Parslet, ParsletExt,
};

// ============================================================================
// Driver
// ============================================================================

pub use crate::driver::{Driver, ParserConfig, RunMode, RunReport, Tool};

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::engine::error::{EngineFault, GrammarError, ParrError, SyntaxError};
