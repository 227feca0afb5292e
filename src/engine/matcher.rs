//! Backtracking matcher
//!
//! [`Matcher`] walks a [`Grammar`] over a [`Cursor`] by plain recursive
//! descent. Every rule takes a checkpoint on entry and either commits it on
//! success or rewinds to it on failure, so a failed rule never moves the
//! cursor. Named rules that succeed outside of a lookahead fire their action.
//!
//! Observers ([`MatchObserver`]) see every rule entry, success and failure;
//! coverage, tracing and tree building are all observers.

use super::action::{ActionInput, ActionTable, ParseState};
use super::cursor::{Cursor, Position};
use super::error::EngineFault;
use super::grammar::{Grammar, Rule, RuleId};

/// Default maximum rule nesting depth
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Resource limits for one run; zero means unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLimits {
    /// Maximum rule nesting depth
    pub max_recursion_depth: usize,
    /// Maximum number of rule attempts
    pub max_steps: u64,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_steps: 0,
        }
    }
}

impl MatchLimits {
    /// Same limits with a step budget
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    /// Same limits with a nesting limit
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}

/// One rule attempt as seen by an observer
#[derive(Debug, Clone, Copy)]
pub struct MatchEvent<'i> {
    /// The rule
    pub rule: RuleId,
    /// Where the attempt started
    pub start: Position,
    /// Where it ended; equal to `start` on entry and failure
    pub end: Position,
    /// Nesting depth, 0 for the root
    pub depth: usize,
    /// Whether the attempt is inside a lookahead
    pub in_predicate: bool,
    /// The whole input
    pub input: &'i [u8],
}

/// Receives rule attempts while matching
pub trait MatchObserver {
    /// A rule is about to be tried
    fn on_enter(&mut self, _grammar: &Grammar, _event: &MatchEvent<'_>) {}

    /// A rule matched
    fn on_success(&mut self, _grammar: &Grammar, _event: &MatchEvent<'_>) {}

    /// A rule failed; the cursor is back at `event.start`
    fn on_failure(&mut self, _grammar: &Grammar, _event: &MatchEvent<'_>) {}

    /// Drop everything recorded so far
    fn reset(&mut self) {}
}

/// Observer that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MatchObserver for NoopObserver {}

/// Result of a top-level match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    /// The root rule matched
    pub matched: bool,
    /// The root rule matched and no input is left
    pub consumed_all: bool,
    /// Cursor position after the root rule
    pub end: Position,
    /// Farthest position at which a terminal rule failed
    pub farthest: Option<Position>,
    /// Number of rule attempts
    pub steps: u64,
}

impl MatchOutcome {
    /// Where a failed parse went wrong
    pub fn failure_position(&self) -> Position {
        match self.farthest {
            Some(farthest) if farthest.offset >= self.end.offset => farthest,
            _ => self.end,
        }
    }
}

/// Recursive-descent matcher for one run
pub struct Matcher<'g, 'i, 'r, S, O: MatchObserver> {
    grammar: &'g Grammar,
    cursor: Cursor<'i>,
    actions: &'g ActionTable<S>,
    state: &'r mut ParseState<S>,
    observer: &'r mut O,
    limits: MatchLimits,
    depth: usize,
    steps: u64,
    predicate_depth: usize,
    farthest: Option<Position>,
}

impl<'g, 'i, 'r, S, O: MatchObserver> Matcher<'g, 'i, 'r, S, O> {
    /// Create a matcher at the start of `input`
    pub fn new(
        grammar: &'g Grammar,
        input: &'i [u8],
        actions: &'g ActionTable<S>,
        state: &'r mut ParseState<S>,
        observer: &'r mut O,
    ) -> Self {
        Self {
            grammar,
            cursor: Cursor::new(input),
            actions,
            state,
            observer,
            limits: MatchLimits::default(),
            depth: 0,
            steps: 0,
            predicate_depth: 0,
            farthest: None,
        }
    }

    /// Set the resource limits
    pub fn with_limits(mut self, limits: MatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current cursor position
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Match the grammar's root rule from the start of the input
    pub fn run(mut self) -> Result<MatchOutcome, EngineFault> {
        log::debug!(
            "matching {} bytes from rule {}",
            self.cursor.input().len(),
            self.grammar.label(self.grammar.root())
        );
        let matched = self.match_rule(self.grammar.root())?;
        let open = self.cursor.open_checkpoints();
        if open != 0 {
            log::warn!("{} checkpoint(s) left open", open);
            return Err(EngineFault::UnbalancedCheckpoints { open });
        }
        let outcome = MatchOutcome {
            matched,
            consumed_all: matched && self.cursor.at_end(),
            end: self.cursor.position(),
            farthest: self.farthest,
            steps: self.steps,
        };
        log::debug!(
            "match finished: matched={} consumed_all={} steps={}",
            outcome.matched,
            outcome.consumed_all,
            outcome.steps
        );
        Ok(outcome)
    }

    /// Try one rule at the current position
    pub fn match_rule(&mut self, id: RuleId) -> Result<bool, EngineFault> {
        self.steps += 1;
        if self.limits.max_steps > 0 && self.steps > self.limits.max_steps {
            return Err(EngineFault::Cancelled { steps: self.steps });
        }
        if self.limits.max_recursion_depth > 0 && self.depth >= self.limits.max_recursion_depth {
            log::warn!("recursion limit reached in {}", self.grammar.label(id));
            return Err(EngineFault::RecursionLimit {
                limit: self.limits.max_recursion_depth,
                rule: self.grammar.label(id),
                position: self.cursor.position(),
            });
        }

        let start = self.cursor.position();
        let checkpoint = self.cursor.mark();
        let event = self.event(id, start, start);
        self.observer.on_enter(self.grammar, &event);

        self.depth += 1;
        let result = self.match_body(id);
        self.depth -= 1;

        if result? {
            self.cursor.commit(checkpoint);
            let end = self.cursor.position();
            let event = self.event(id, start, end);
            self.observer.on_success(self.grammar, &event);
            if self.predicate_depth == 0 {
                self.fire_action(id, start, end);
            }
            Ok(true)
        } else {
            self.cursor.rewind(checkpoint);
            let event = self.event(id, start, start);
            self.observer.on_failure(self.grammar, &event);
            Ok(false)
        }
    }

    fn event(&self, rule: RuleId, start: Position, end: Position) -> MatchEvent<'i> {
        MatchEvent {
            rule,
            start,
            end,
            depth: self.depth,
            in_predicate: self.predicate_depth > 0,
            input: self.cursor.input(),
        }
    }

    fn fire_action(&mut self, id: RuleId, start: Position, end: Position) {
        if !self.actions.has(id) {
            return;
        }
        let Some(name) = self.grammar.name(id) else {
            return;
        };
        let input = ActionInput {
            rule: id,
            name,
            bytes: self.cursor.slice(start.offset, end.offset),
            start,
            end,
        };
        self.actions.fire(&input, self.state);
    }

    fn match_body(&mut self, id: RuleId) -> Result<bool, EngineFault> {
        let grammar = self.grammar;
        let matched = match grammar.rule(id) {
            Rule::Literal { bytes } => {
                if self.cursor.starts_with(bytes) {
                    self.cursor.advance_bytes(bytes.len());
                    true
                } else {
                    false
                }
            }
            Rule::OneOf { set } => match self.cursor.peek() {
                Some(b) if set.contains(&b) => {
                    self.cursor.advance_bytes(1);
                    true
                }
                _ => false,
            },
            Rule::Class { class } => match self.cursor.peek() {
                Some(b) if class.matches(b) => {
                    self.cursor.advance_bytes(1);
                    true
                }
                _ => false,
            },
            Rule::Any => self.cursor.advance(),
            Rule::StartOfFile => self.cursor.at_start(),
            Rule::StartOfLine => self.cursor.at_line_start(),
            Rule::EndOfLine => self.cursor.at_line_end(),
            Rule::EndOfFile => self.cursor.at_end(),

            Rule::Sequence { rules } => {
                for &rule in rules {
                    if !self.match_rule(rule)? {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
            Rule::Choice { rules } => {
                for &rule in rules {
                    if self.match_rule(rule)? {
                        return Ok(true);
                    }
                }
                return Ok(false);
            }
            Rule::Repeat { rule, min } => {
                let mut count = 0;
                loop {
                    let before = self.cursor.offset();
                    if !self.match_rule(*rule)? {
                        break;
                    }
                    self.ensure_progress(*rule, before)?;
                    count += 1;
                }
                return Ok(count >= *min);
            }
            Rule::Optional { rule } => {
                self.match_rule(*rule)?;
                return Ok(true);
            }
            Rule::And { rule } => return self.lookahead(*rule),
            Rule::Not { rule } => return self.lookahead(*rule).map(|m| !m),
            Rule::Until { terminator, body } => loop {
                if self.lookahead(*terminator)? {
                    return Ok(true);
                }
                let before = self.cursor.offset();
                if !self.match_rule(*body)? {
                    return Ok(false);
                }
                self.ensure_progress(*body, before)?;
            },
            Rule::Named { rule, .. } => return self.match_rule(*rule),
        };

        if !matched {
            self.record_failure();
        }
        Ok(matched)
    }

    /// Test `rule` without consuming input or firing actions
    fn lookahead(&mut self, rule: RuleId) -> Result<bool, EngineFault> {
        let checkpoint = self.cursor.mark();
        self.predicate_depth += 1;
        let result = self.match_rule(rule);
        self.predicate_depth -= 1;
        self.cursor.rewind(checkpoint);
        result
    }

    fn ensure_progress(&self, rule: RuleId, before: usize) -> Result<(), EngineFault> {
        if self.cursor.offset() == before {
            log::warn!("{} matched empty input inside a loop", self.grammar.label(rule));
            return Err(EngineFault::NoProgress {
                rule: self.grammar.label(rule),
                position: self.cursor.position(),
            });
        }
        Ok(())
    }

    fn record_failure(&mut self) {
        if self.predicate_depth > 0 {
            return;
        }
        let position = self.cursor.position();
        if self.farthest.is_none_or(|f| position.offset > f.offset) {
            self.farthest = Some(position);
        }
    }
}

/// Match `input` against `grammar` with no actions and no observer
pub fn recognize(grammar: &Grammar, input: &[u8]) -> Result<MatchOutcome, EngineFault> {
    let actions = ActionTable::new();
    let mut state = ParseState::<()>::new("input");
    let mut observer = NoopObserver;
    Matcher::new(grammar, input, &actions, &mut state, &mut observer).run()
}
