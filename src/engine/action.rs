//! Action dispatch
//!
//! An [`ActionTable`] maps named rules to callbacks. The matcher calls the
//! callback for a rule each time that rule succeeds outside of a lookahead,
//! passing the matched text and the [`ParseState`] of the current run.

use super::cursor::Position;
use super::error::GrammarError;
use super::grammar::{Grammar, RuleId};
use hashbrown::HashMap;
use std::borrow::Cow;
use std::fmt;

/// Per-run parse state
///
/// `data` is the tool's scratch area; it lives exactly as long as one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState<S> {
    /// Overall success of the run
    pub result: bool,
    /// Name of the content being parsed
    pub content_name: String,
    /// Tool-specific scratch data
    pub data: S,
}

impl<S: Default> ParseState<S> {
    /// Fresh state for one run
    pub fn new(content_name: impl Into<String>) -> Self {
        Self {
            result: true,
            content_name: content_name.into(),
            data: S::default(),
        }
    }

    /// Forget everything a previous attempt recorded
    pub fn reset(&mut self) {
        self.result = true;
        self.data = S::default();
    }
}

/// What an action sees of a successful match
#[derive(Debug, Clone, Copy)]
pub struct ActionInput<'i> {
    /// The matched rule
    pub rule: RuleId,
    /// Its name
    pub name: &'i str,
    /// The matched bytes
    pub bytes: &'i [u8],
    /// Where the match started
    pub start: Position,
    /// Where the match ended
    pub end: Position,
}

impl<'i> ActionInput<'i> {
    /// The matched text, with invalid UTF-8 replaced
    pub fn string(&self) -> Cow<'i, str> {
        String::from_utf8_lossy(self.bytes)
    }
}

/// An action callback
pub type Action<S> = Box<dyn Fn(&ActionInput<'_>, &mut ParseState<S>) + Send + Sync>;

/// Rule id to callback table, one callback per rule
pub struct ActionTable<S> {
    handlers: HashMap<RuleId, Action<S>>,
}

impl<S> ActionTable<S> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Bind a callback to the rule called `name`
    pub fn on<F>(&mut self, grammar: &Grammar, name: &str, action: F) -> Result<&mut Self, GrammarError>
    where
        F: Fn(&ActionInput<'_>, &mut ParseState<S>) + Send + Sync + 'static,
    {
        let rule = grammar
            .find(name)
            .ok_or_else(|| GrammarError::UnknownRule(name.to_string()))?;
        self.on_rule(rule, action)
    }

    /// Bind a callback to a rule id
    pub fn on_rule<F>(&mut self, rule: RuleId, action: F) -> Result<&mut Self, GrammarError>
    where
        F: Fn(&ActionInput<'_>, &mut ParseState<S>) + Send + Sync + 'static,
    {
        if self.handlers.contains_key(&rule) {
            return Err(GrammarError::DuplicateHandler(rule));
        }
        self.handlers.insert(rule, Box::new(action));
        Ok(self)
    }

    /// Whether a rule has a callback
    #[inline]
    pub fn has(&self, rule: RuleId) -> bool {
        self.handlers.contains_key(&rule)
    }

    /// Run the callback for `input.rule`, if any
    #[inline]
    pub fn fire(&self, input: &ActionInput<'_>, state: &mut ParseState<S>) -> bool {
        match self.handlers.get(&input.rule) {
            Some(action) => {
                action(input, state);
                true
            }
            None => false,
        }
    }

    /// Number of bound rules
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no rule is bound
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S> Default for ActionTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for ActionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = self.handlers.keys().collect();
        rules.sort();
        f.debug_struct("ActionTable").field("rules", &rules).finish()
    }
}
