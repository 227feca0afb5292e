//! Debugging tools
//!
//! - [`TraceObserver`] records every rule attempt as a [`ParseTrace`]
//! - [`GrammarVisualizer`] renders a grammar as a Graphviz graph

use super::cursor::{line_at, Position};
use super::grammar::{Grammar, Rule, RuleId};
use super::matcher::{MatchEvent, MatchObserver};
use super::tree::escape_dot;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Trace layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Only show named rules
    pub hide_anonymous: bool,
    /// Extra indentation per nesting level
    pub indent_increment: usize,
    /// Indentation of the outermost rule
    pub initial_indent: usize,
    /// Show the source line and a caret under failures
    pub print_source_line: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            hide_anonymous: true,
            indent_increment: 2,
            initial_indent: 5,
            print_source_line: true,
        }
    }
}

/// What happened to a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceAction {
    /// Rule entered
    Start,
    /// Rule matched up to `end`
    Success {
        /// Position after the match
        end: Position,
    },
    /// Rule failed
    Failure,
}

/// A single trace entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Running number of the rule attempt
    pub step: u64,
    /// The rule
    pub rule: RuleId,
    /// Rule label
    pub label: String,
    /// Where the attempt started
    pub position: Position,
    /// Nesting depth
    pub depth: usize,
    /// Whether the attempt is inside a lookahead
    pub in_predicate: bool,
    /// What happened
    pub action: TraceAction,
    /// Source line for failures
    pub line: Option<String>,
}

/// A recorded trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseTrace {
    /// Entries in the order they happened
    pub entries: Vec<TraceEntry>,
    #[serde(skip)]
    config: TraceConfig,
}

impl ParseTrace {
    /// Create an empty trace
    pub fn new(config: TraceConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
        }
    }

    /// Add an entry
    pub fn add(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    /// Number of failure entries
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.action == TraceAction::Failure)
            .count()
    }
}

impl fmt::Display for ParseTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let indent = self.config.initial_indent + entry.depth * self.config.indent_increment;
            let pad = " ".repeat(indent);
            match &entry.action {
                TraceAction::Start => writeln!(
                    f,
                    "{:>6} {}start  {}  pos={}",
                    entry.step, pad, entry.label, entry.position
                )?,
                TraceAction::Success { end } => writeln!(
                    f,
                    "{:>6} {}success  {}  pos={}",
                    entry.step, pad, entry.label, end
                )?,
                TraceAction::Failure => {
                    writeln!(
                        f,
                        "{:>6} {}failure  {}  pos={}",
                        entry.step, pad, entry.label, entry.position
                    )?;
                    if let Some(line) = &entry.line {
                        writeln!(f, "{:>6} {}{}", "", pad, line)?;
                        writeln!(
                            f,
                            "{:>6} {}{}^",
                            "",
                            pad,
                            " ".repeat(entry.position.column.saturating_sub(1))
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Records a [`ParseTrace`] while matching
#[derive(Debug, Default)]
pub struct TraceObserver {
    trace: ParseTrace,
    steps: u64,
    open: Vec<u64>,
}

impl TraceObserver {
    /// Create an observer with the given layout
    pub fn new(config: TraceConfig) -> Self {
        Self {
            trace: ParseTrace::new(config),
            steps: 0,
            open: Vec::new(),
        }
    }

    /// Take the recorded trace
    pub fn finish(self) -> ParseTrace {
        self.trace
    }

    fn shows(&self, grammar: &Grammar, rule: RuleId) -> bool {
        !self.trace.config.hide_anonymous || grammar.name(rule).is_some()
    }

    fn entry(
        &self,
        grammar: &Grammar,
        event: &MatchEvent<'_>,
        step: u64,
        action: TraceAction,
    ) -> TraceEntry {
        let line = (action == TraceAction::Failure && self.trace.config.print_source_line)
            .then(|| String::from_utf8_lossy(line_at(event.input, event.start.offset)).into_owned());
        TraceEntry {
            step,
            rule: event.rule,
            label: grammar.label(event.rule),
            position: event.start,
            depth: event.depth,
            in_predicate: event.in_predicate,
            action,
            line,
        }
    }
}

impl MatchObserver for TraceObserver {
    fn on_enter(&mut self, grammar: &Grammar, event: &MatchEvent<'_>) {
        self.steps += 1;
        self.open.push(self.steps);
        if self.shows(grammar, event.rule) {
            let entry = self.entry(grammar, event, self.steps, TraceAction::Start);
            self.trace.add(entry);
        }
    }

    fn on_success(&mut self, grammar: &Grammar, event: &MatchEvent<'_>) {
        let step = self.open.pop().unwrap_or(self.steps);
        if self.shows(grammar, event.rule) {
            let entry = self.entry(grammar, event, step, TraceAction::Success { end: event.end });
            self.trace.add(entry);
        }
    }

    fn on_failure(&mut self, grammar: &Grammar, event: &MatchEvent<'_>) {
        let step = self.open.pop().unwrap_or(self.steps);
        if self.shows(grammar, event.rule) {
            let entry = self.entry(grammar, event, step, TraceAction::Failure);
            self.trace.add(entry);
        }
    }

    fn reset(&mut self) {
        self.trace.entries.clear();
        self.steps = 0;
        self.open.clear();
    }
}

/// Grammar visualizer
pub struct GrammarVisualizer<'a> {
    grammar: &'a Grammar,
}

impl<'a> GrammarVisualizer<'a> {
    /// Create a visualizer
    pub fn new(grammar: &'a Grammar) -> Self {
        Self { grammar }
    }

    /// Graphviz graph of every rule; named rules are boxes, the root is filled
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = self.write_dot(&mut out);
        out
    }

    fn write_dot<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "digraph grammar {{")?;
        writeln!(out, "  rankdir=TB;")?;
        writeln!(out, "  node [shape=ellipse];")?;
        for (id, rule) in self.grammar.iter() {
            let shape = match rule {
                Rule::Named { .. } => ", shape=box",
                _ => "",
            };
            let fill = if id == self.grammar.root() {
                ", style=filled, fillcolor=lightblue"
            } else {
                ""
            };
            writeln!(
                out,
                "  r{} [label=\"{}\"{}{}];",
                id.0,
                escape_dot(&rule.describe()),
                shape,
                fill
            )?;
            match rule {
                Rule::Until { terminator, body } => {
                    writeln!(out, "  r{} -> r{} [label=\"until\"];", id.0, terminator.0)?;
                    writeln!(out, "  r{} -> r{};", id.0, body.0)?;
                }
                _ => {
                    for child in rule.children() {
                        writeln!(out, "  r{} -> r{};", id.0, child.0)?;
                    }
                }
            }
        }
        writeln!(out, "}}")
    }
}
