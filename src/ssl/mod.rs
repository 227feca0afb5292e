//! SSL: a small procedural language
//!
//! ```text
//! variable a = 1;
//! import variable b;
//! procedure p();
//! procedure q begin
//!     variable c;
//!     c++;
//!     if c > 1 then begin end
//! end
//! ```
//!
//! [`Ssl`] bundles the grammar from [`rules`] with the callbacks from
//! [`actions`] and plugs into the [`Driver`](crate::driver::Driver).

pub mod actions;
pub mod rules;

pub use actions::{SslData, SslEvent};

use crate::driver::Tool;
use crate::engine::{ActionTable, Grammar, GrammarError};

/// The SSL grammar and its actions, built once
#[derive(Debug)]
pub struct Ssl {
    grammar: Grammar,
    actions: ActionTable<SslData>,
}

impl Ssl {
    /// Build the grammar and bind the actions
    pub fn new() -> Result<Self, GrammarError> {
        let grammar = rules::grammar()?;
        let actions = actions::actions(&grammar)?;
        log::debug!(
            "SSL grammar built: {} rules, {} actions",
            grammar.len(),
            actions.len()
        );
        Ok(Self { grammar, actions })
    }
}

impl Tool for Ssl {
    type Data = SslData;

    fn name(&self) -> &str {
        "ssl"
    }

    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn actions(&self) -> &ActionTable<SslData> {
        &self.actions
    }
}
