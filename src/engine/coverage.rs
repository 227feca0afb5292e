//! Rule coverage
//!
//! [`CoverageObserver`] counts how often each rule was entered, matched and
//! failed during a run. Attempts inside lookaheads count too. The resulting
//! [`CoverageReport`] lists every named rule, including those never tried.

use super::grammar::{Grammar, RuleId};
use super::matcher::{MatchEvent, MatchObserver};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counts {
    attempts: u64,
    successes: u64,
    failures: u64,
}

/// Counts rule attempts while matching
#[derive(Debug, Clone, Default)]
pub struct CoverageObserver {
    counts: Vec<Counts>,
}

impl CoverageObserver {
    /// Create an observer sized for `grammar`
    pub fn new(grammar: &Grammar) -> Self {
        Self {
            counts: vec![Counts::default(); grammar.len()],
        }
    }

    fn slot(&mut self, rule: RuleId) -> &mut Counts {
        if rule.index() >= self.counts.len() {
            self.counts.resize(rule.index() + 1, Counts::default());
        }
        &mut self.counts[rule.index()]
    }

    /// Summarize the named rules of `grammar`
    pub fn report(&self, grammar: &Grammar) -> CoverageReport {
        let entries = grammar
            .named()
            .map(|(rule, name)| {
                let counts = self.counts.get(rule.index()).copied().unwrap_or_default();
                CoverageEntry {
                    rule,
                    name: name.to_string(),
                    attempts: counts.attempts,
                    successes: counts.successes,
                    failures: counts.failures,
                }
            })
            .collect();
        CoverageReport { entries }
    }
}

impl MatchObserver for CoverageObserver {
    fn on_enter(&mut self, _grammar: &Grammar, event: &MatchEvent<'_>) {
        self.slot(event.rule).attempts += 1;
    }

    fn on_success(&mut self, _grammar: &Grammar, event: &MatchEvent<'_>) {
        self.slot(event.rule).successes += 1;
    }

    fn on_failure(&mut self, _grammar: &Grammar, event: &MatchEvent<'_>) {
        self.slot(event.rule).failures += 1;
    }

    fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = Counts::default());
    }
}

/// Coverage of one named rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    /// Rule id
    pub rule: RuleId,
    /// Rule name
    pub name: String,
    /// Times the rule was entered
    pub attempts: u64,
    /// Times it matched
    pub successes: u64,
    /// Times it failed
    pub failures: u64,
}

/// Coverage of every named rule, in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// One entry per named rule
    pub entries: Vec<CoverageEntry>,
}

impl CoverageReport {
    /// Entry for a rule name
    pub fn entry(&self, name: &str) -> Option<&CoverageEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Attempt count for a rule name
    pub fn hits(&self, name: &str) -> Option<u64> {
        self.entry(name).map(|e| e.attempts)
    }

    /// Names of rules that were never entered
    pub fn uncovered(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.attempts == 0)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Serialize the report to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.name.len())
            .max()
            .unwrap_or(0)
            .max("rule".len());
        writeln!(
            f,
            "{:<width$}  {:>10}  {:>10}  {:>10}",
            "rule",
            "attempts",
            "successes",
            "failures",
            width = width
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "{:<width$}  {:>10}  {:>10}  {:>10}",
                e.name,
                e.attempts,
                e.successes,
                e.failures,
                width = width
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action::{ActionTable, ParseState};
    use crate::engine::matcher::Matcher;
    use crate::engine::parser_dsl::*;
    use crate::{choice, seq};

    fn run(grammar: &Grammar, input: &[u8]) -> CoverageReport {
        let actions = ActionTable::new();
        let mut state = ParseState::<()>::new("t");
        let mut observer = CoverageObserver::new(grammar);
        Matcher::new(grammar, input, &actions, &mut state, &mut observer)
            .run()
            .unwrap();
        observer.report(grammar)
    }

    fn grammar() -> Grammar {
        let mut builder = GrammarBuilder::new();
        let a = builder.rule("a", "a");
        let b = builder.rule("b", "b");
        let never = builder.rule("never", "z");
        let item = builder.rule("item", choice![a, b]);
        let root = builder.rule("root", seq![item.plus(), never.opt().not_at().opt()]);
        builder.build(root).unwrap()
    }

    #[test]
    fn test_counts_attempts_and_outcomes() {
        let grammar = grammar();
        let report = run(&grammar, b"ab");
        let a = report.entry("a").unwrap();
        assert_eq!((a.attempts, a.successes, a.failures), (3, 1, 2));
        let b = report.entry("b").unwrap();
        assert_eq!((b.attempts, b.successes, b.failures), (2, 1, 1));
        assert_eq!(report.hits("item"), Some(3));
        assert_eq!(report.hits("root"), Some(1));
    }

    #[test]
    fn test_lists_unreached_rules() {
        let mut builder = GrammarBuilder::new();
        let used = builder.rule("used", "x");
        builder.rule("unused", "y");
        let root = builder.rule("root", used);
        let grammar = builder.build(root).unwrap();
        let report = run(&grammar, b"x");
        assert_eq!(report.uncovered(), vec!["unused"]);
        assert_eq!(report.hits("unused"), Some(0));
    }

    #[test]
    fn test_table_and_json() {
        let grammar = grammar();
        let report = run(&grammar, b"a");
        let table = report.to_string();
        assert!(table.lines().next().unwrap().starts_with("rule"));
        assert!(table.contains("never"));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"attempts\""));
    }
}
