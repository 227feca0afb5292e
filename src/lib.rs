//! Parr - backtracking PEG engine and SSL grammar
//!
//! This crate provides:
//! - A recursive-descent PEG engine with exact rewinding and O(1) checkpoints
//! - A parser DSL for building grammars as rule arenas
//! - Actions bound to named rules, fired with a per-run parse state
//! - Coverage reports, execution traces and parse trees as DOT
//! - A static check for empty loops and left recursion
//! - The grammar of SSL, a small procedural language, with its actions
//! - A driver running a grammar in any of its execution modes
//!
//! ## Quick Start
//!
//! ```rust
//! use parr::engine::parser_dsl::*;
//! use parr::engine::recognize;
//! use parr::seq;
//!
//! let mut builder = GrammarBuilder::new();
//! let word = builder.rule("word", class(CharClass::Alpha).plus());
//! let greeting = builder.rule("greeting", seq!["hello", " ", word, eof()]);
//! let grammar = builder.build(greeting).unwrap();
//!
//! assert!(recognize(&grammar, b"hello world").unwrap().consumed_all);
//! ```
//!
//! ## Parsing SSL
//!
//! ```rust
//! use parr::driver::Driver;
//! use parr::ssl::Ssl;
//!
//! let ssl = Ssl::new().unwrap();
//! let mut driver = Driver::new(&ssl).with_diagnostics(std::io::sink());
//! let report = driver.parse("inline", b"procedure p; procedure p begin end").unwrap();
//! assert_eq!(report.state.data.procedure_names(), vec!["p", "p"]);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Parse batches of inputs on rayon's thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

// Prelude module for convenient imports
pub mod prelude;

pub mod driver;
pub mod engine;
pub mod rules;
pub mod ssl;

/// Re-export commonly used types for convenience
pub use driver::{load_content, Driver, ParserConfig, RunMode, RunReport, Tool};
pub use engine::{
    EngineFault, Grammar, GrammarBuilder, GrammarError, LoadError, ParrError, Position, RuleId,
    SyntaxError,
};
pub use ssl::Ssl;
