//! Static grammar checks
//!
//! Two defects make a PEG loop forever instead of failing:
//! - a repetition (or `until` body) that can succeed without consuming input
//! - a rule that can reach itself again before consuming anything (left
//!   recursion, direct or through other rules)
//!
//! Both are found by walking the rule arena without any input.
//!
//! # Example
//!
//! ```
//! use parr::engine::grammar_analysis::{GrammarAnalyzer, IssueKind};
//! use parr::engine::parser_dsl::*;
//! use parr::seq;
//!
//! let mut builder = GrammarBuilder::new();
//! let r = builder.declare("r");
//! builder.define(r, seq![r, "a"]);
//! let grammar = builder.build(r).unwrap();
//!
//! let issues = GrammarAnalyzer::new(&grammar).analyze();
//! assert_eq!(issues[0].kind, IssueKind::LeftRecursion);
//! ```

use super::grammar::{Grammar, Rule, RuleId};
use hashbrown::HashSet;
use serde::Serialize;
use std::fmt;

/// Kind of grammar issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A loop whose body can match the empty string
    EmptyLoop,
    /// A rule that can re-enter itself at the same position
    LeftRecursion,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLoop => write!(f, "empty loop"),
            Self::LeftRecursion => write!(f, "left recursion"),
        }
    }
}

/// A defect found by the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarIssue {
    /// The kind of issue
    pub kind: IssueKind,
    /// The rule the issue was detected at
    pub rule: RuleId,
    /// Human-readable message
    pub message: String,
    /// Other rules involved, e.g. the members of a recursion cycle
    pub related: Vec<RuleId>,
}

impl GrammarIssue {
    /// Create a new issue
    pub fn new(kind: IssueKind, rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            kind,
            rule,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Add related rules to the issue
    pub fn with_related(mut self, related: Vec<RuleId>) -> Self {
        self.related = related;
        self
    }
}

impl fmt::Display for GrammarIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[rule {}] {}: {}", self.rule.0, self.kind, self.message)
    }
}

/// Grammar analyzer
pub struct GrammarAnalyzer<'a> {
    grammar: &'a Grammar,
    nullable: Vec<bool>,
}

impl<'a> GrammarAnalyzer<'a> {
    /// Create an analyzer; nullability is computed up front
    pub fn new(grammar: &'a Grammar) -> Self {
        let nullable = compute_nullable(grammar);
        Self { grammar, nullable }
    }

    /// Whether a rule can succeed without consuming input
    pub fn is_nullable(&self, id: RuleId) -> bool {
        self.nullable.get(id.index()).copied().unwrap_or(false)
    }

    /// Run every check
    pub fn analyze(&self) -> Vec<GrammarIssue> {
        let mut issues = self.check_empty_loops();
        issues.extend(self.check_left_recursion());
        issues
    }

    /// Loops whose body is nullable
    pub fn check_empty_loops(&self) -> Vec<GrammarIssue> {
        let mut issues = Vec::new();
        for (id, rule) in self.grammar.iter() {
            let body = match rule {
                Rule::Repeat { rule, .. } => *rule,
                Rule::Until { body, .. } => *body,
                _ => continue,
            };
            if self.is_nullable(body) {
                issues.push(
                    GrammarIssue::new(
                        IssueKind::EmptyLoop,
                        id,
                        format!(
                            "{} repeats {}, which can match empty input",
                            rule.describe(),
                            self.grammar.label(body)
                        ),
                    )
                    .with_related(vec![body]),
                );
            }
        }
        issues
    }

    /// Named rules that can reach themselves without consuming input
    pub fn check_left_recursion(&self) -> Vec<GrammarIssue> {
        let mut issues = Vec::new();
        let mut seen_cycles: HashSet<Vec<RuleId>> = HashSet::new();

        for (id, _) in self.grammar.named() {
            let Some(path) = self.find_left_recursive_path(id) else {
                continue;
            };
            let mut members: Vec<RuleId> = path
                .iter()
                .copied()
                .filter(|&r| self.grammar.name(r).is_some())
                .collect();
            members.sort();
            members.dedup();
            if !seen_cycles.insert(members.clone()) {
                continue;
            }
            let chain: Vec<String> = path
                .iter()
                .filter_map(|&r| self.grammar.name(r))
                .chain(self.grammar.name(id))
                .map(str::to_string)
                .collect();
            issues.push(
                GrammarIssue::new(
                    IssueKind::LeftRecursion,
                    id,
                    format!(
                        "{} re-enters itself without consuming input ({})",
                        self.grammar.label(id),
                        chain.join(" -> ")
                    ),
                )
                .with_related(members),
            );
        }
        issues
    }

    /// Rules a rule may call at its own entry position
    fn first_calls(&self, id: RuleId) -> Vec<RuleId> {
        match self.grammar.rule(id) {
            Rule::Sequence { rules } => {
                let mut calls = Vec::new();
                for &child in rules {
                    calls.push(child);
                    if !self.is_nullable(child) {
                        break;
                    }
                }
                calls
            }
            other => other.children(),
        }
    }

    /// A path from `start` back to itself through first-position calls
    fn find_left_recursive_path(&self, start: RuleId) -> Option<Vec<RuleId>> {
        let mut visited = HashSet::new();
        let mut path = vec![start];
        if self.search(start, start, &mut visited, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn search(
        &self,
        current: RuleId,
        target: RuleId,
        visited: &mut HashSet<RuleId>,
        path: &mut Vec<RuleId>,
    ) -> bool {
        for next in self.first_calls(current) {
            if next == target {
                return true;
            }
            if !visited.insert(next) {
                continue;
            }
            path.push(next);
            if self.search(next, target, visited, path) {
                return true;
            }
            path.pop();
        }
        false
    }
}

/// Fixed point over the arena; cycles start out non-nullable
fn compute_nullable(grammar: &Grammar) -> Vec<bool> {
    let mut nullable = vec![false; grammar.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (id, rule) in grammar.iter() {
            if nullable[id.index()] {
                continue;
            }
            let is_nullable = match rule {
                Rule::Literal { bytes } => bytes.is_empty(),
                Rule::OneOf { .. } | Rule::Class { .. } | Rule::Any => false,
                Rule::Sequence { rules } => rules.iter().all(|r| nullable[r.index()]),
                Rule::Choice { rules } => rules.iter().any(|r| nullable[r.index()]),
                Rule::Repeat { rule, min } => *min == 0 || nullable[rule.index()],
                Rule::Optional { .. }
                | Rule::And { .. }
                | Rule::Not { .. }
                | Rule::Until { .. }
                | Rule::StartOfFile
                | Rule::StartOfLine
                | Rule::EndOfLine
                | Rule::EndOfFile => true,
                Rule::Named { rule, .. } => nullable[rule.index()],
            };
            if is_nullable {
                nullable[id.index()] = true;
                changed = true;
            }
        }
    }
    nullable
}
