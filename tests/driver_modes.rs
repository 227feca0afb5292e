//! Integration tests for the execution modes
//!
//! These tests cover:
//! - Where each mode writes its artefact
//! - Grammar analysis on good and bad tools
//! - The two-phase strategy
//! - Batch parsing

use parr::driver::{CoverageFormat, Driver, ParserConfig, RunMode, RunReport, Tool};
use parr::engine::parser_dsl::*;
use parr::engine::{
    ActionTable, EngineFault, Grammar, IssueKind, ParrError, StrategyConfig, TraceConfig,
};
use parr::seq;
use parr::ssl::{Ssl, SslData};

const GOOD: &[u8] = b"procedure p begin variable x; x++; end";
const BAD: &[u8] = b"procedure p begin x ++; end";

/// Output and diagnostics captured from one run
struct Captured {
    report: Result<RunReport<SslData>, ParrError>,
    output: String,
    diagnostics: String,
}

fn run_with(config: ParserConfig, mode: RunMode, input: &[u8]) -> Captured {
    let ssl = Ssl::new().unwrap();
    let mut output = Vec::new();
    let mut diagnostics = Vec::new();
    let report = {
        let mut driver = Driver::new(&ssl)
            .with_config(config)
            .with_output(&mut output)
            .with_diagnostics(&mut diagnostics);
        driver.run(mode, "mode.ssl", input)
    };
    Captured {
        report,
        output: String::from_utf8(output).unwrap(),
        diagnostics: String::from_utf8(diagnostics).unwrap(),
    }
}

fn run(mode: RunMode, input: &[u8]) -> Captured {
    run_with(ParserConfig::default(), mode, input)
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn test_parse_writes_nothing_on_success() {
    let captured = run(RunMode::Parse, GOOD);
    assert!(captured.report.unwrap().success());
    assert!(captured.output.is_empty());
    assert!(captured.diagnostics.is_empty());
}

#[test]
fn test_parse_reports_failure() {
    let captured = run(RunMode::Parse, BAD);
    assert!(!captured.report.unwrap().success());
    assert!(captured.diagnostics.starts_with("PARSE FAIL\n"));
    assert!(captured.diagnostics.contains("^"));
}

#[test]
fn test_coverage_reports_pass_or_fail() {
    for input in [GOOD, BAD] {
        let captured = run(RunMode::Coverage, input);
        let report = captured.report.unwrap();
        assert!(report.coverage.is_some());
        assert!(captured.output.starts_with("rule"));
    }
}

#[test]
fn test_coverage_as_json() {
    let ssl = Ssl::new().unwrap();
    let mut output = Vec::new();
    {
        let mut driver = Driver::new(&ssl)
            .with_coverage_format(CoverageFormat::Json)
            .with_output(&mut output)
            .with_diagnostics(std::io::sink());
        driver.coverage("json.ssl", GOOD).unwrap();
    }
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert!(entries
        .iter()
        .any(|e| e["name"] == "procedure::body" && e["successes"] == 1));
}

#[test]
fn test_trace_goes_to_diagnostics() {
    let captured = run(RunMode::Trace, GOOD);
    let report = captured.report.unwrap();
    assert!(report.success());
    let trace = report.trace.unwrap();
    assert!(!trace.entries.is_empty());
    assert!(captured.output.is_empty());
    assert!(captured.diagnostics.contains("start  GlobalScope"));
    assert!(captured.diagnostics.contains("success  procedure::name"));
}

#[test]
fn test_trace_can_show_anonymous_rules() {
    let config = ParserConfig::new().with_trace(TraceConfig {
        hide_anonymous: false,
        ..TraceConfig::default()
    });
    let captured = run_with(config, RunMode::Trace, b"variable a;");
    assert!(captured.diagnostics.contains("\"variable\""));
}

#[test]
fn test_parse_tree_only_on_success() {
    let captured = run(RunMode::ParseTree, GOOD);
    assert!(captured.report.unwrap().tree.is_some());
    assert!(captured.output.starts_with("digraph parse_tree"));

    let captured = run(RunMode::ParseTree, BAD);
    assert!(captured.report.unwrap().tree.is_none());
    assert!(captured.output.is_empty());
    assert!(captured.diagnostics.starts_with("PARSE FAIL"));
}

#[test]
fn test_error_trace_only_on_failure() {
    let captured = run(RunMode::ParseErrorTrace, GOOD);
    let report = captured.report.unwrap();
    assert!(report.success());
    assert!(report.trace.is_none());
    assert!(captured.diagnostics.is_empty());

    let captured = run(RunMode::ParseErrorTrace, BAD);
    let report = captured.report.unwrap();
    assert!(!report.success());
    assert_eq!(report.mode, RunMode::ParseErrorTrace);
    assert!(report.trace.unwrap().failures() > 0);
    assert!(captured.diagnostics.contains("failure"));
    assert!(captured.diagnostics.contains("PARSE FAIL"));
}

// ============================================================================
// Analysis
// ============================================================================

/// A tool whose grammar loops forever on empty matches
struct Looping {
    grammar: Grammar,
    actions: ActionTable<()>,
}

impl Looping {
    fn new() -> Self {
        let mut builder = GrammarBuilder::new();
        let spaces = builder.rule("spaces", " ".star());
        let list = builder.declare("list");
        builder.define(list, seq![list, ",", spaces.star()]);
        let grammar = builder.build(list).unwrap();
        Self {
            grammar,
            actions: ActionTable::new(),
        }
    }
}

impl Tool for Looping {
    type Data = ();

    fn name(&self) -> &str {
        "looping"
    }

    fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    fn actions(&self) -> &ActionTable<()> {
        &self.actions
    }
}

#[test]
fn test_analyze_ssl_is_clean() {
    let captured = run(RunMode::Analyze, b"");
    assert!(captured.report.unwrap().success());
    assert!(captured.diagnostics.contains("0 grammar issue(s)"));
}

#[test]
fn test_analyze_reports_every_issue() {
    let tool = Looping::new();
    let mut diagnostics = Vec::new();
    let result = {
        let mut driver = Driver::new(&tool).with_diagnostics(&mut diagnostics);
        driver.run(RunMode::Analyze, "unused", b"")
    };
    let Err(ParrError::GrammarDefinition { issues }) = result else {
        panic!("expected a grammar definition error");
    };
    assert!(issues.iter().any(|i| i.kind == IssueKind::EmptyLoop));
    assert!(issues.iter().any(|i| i.kind == IssueKind::LeftRecursion));
    let diagnostics = String::from_utf8(diagnostics).unwrap();
    assert!(diagnostics.contains(&format!("{} grammar issue(s)", issues.len())));
}

#[test]
fn test_unchecked_left_recursion_is_a_fault() {
    let tool = Looping::new();
    let mut driver = Driver::new(&tool).with_diagnostics(std::io::sink());
    let err = driver.parse("loop", b"a,").unwrap_err();
    assert!(matches!(
        err,
        ParrError::Fault(EngineFault::RecursionLimit { .. })
    ));
}

// ============================================================================
// Strategies and batches
// ============================================================================

#[test]
fn test_two_phase_recovers_from_cancellation() {
    let config = ParserConfig::new().with_strategy(StrategyConfig::TwoPhase {
        optimistic_steps: 10,
    });
    let captured = run_with(config.clone(), RunMode::Coverage, GOOD);
    let report = captured.report.unwrap();
    assert!(report.success());
    assert_eq!(report.state.data.procedure_names(), vec!["p"]);
    let coverage = report.coverage.unwrap();
    assert_eq!(coverage.entry("procedure::body").unwrap().successes, 1);

    let captured = run_with(config, RunMode::Parse, BAD);
    assert!(!captured.report.unwrap().success());
}

#[test]
fn test_direct_budget_is_final() {
    let config = ParserConfig::new().with_max_steps(10);
    let captured = run_with(config, RunMode::Parse, GOOD);
    assert!(matches!(
        captured.report,
        Err(ParrError::Fault(EngineFault::Cancelled { .. }))
    ));
}

#[test]
fn test_trace_is_written_before_a_fault() {
    let config = ParserConfig::new().with_max_steps(200);
    let captured = run_with(config, RunMode::Trace, GOOD);
    assert!(matches!(
        captured.report,
        Err(ParrError::Fault(EngineFault::Cancelled { .. }))
    ));
    assert!(captured.diagnostics.contains("start  GlobalScope"));
}

#[test]
fn test_coverage_is_written_before_a_fault() {
    let config = ParserConfig::new().with_max_steps(200);
    let captured = run_with(config, RunMode::Coverage, GOOD);
    assert!(captured.report.is_err());
    assert!(captured.output.starts_with("rule"));
    assert!(captured.output.contains("GlobalScope"));
}

#[test]
fn test_batch_results_are_independent() {
    let ssl = Ssl::new().unwrap();
    let driver = Driver::new(&ssl);
    let inputs: Vec<(&str, &[u8])> = vec![
        ("a.ssl", &b"procedure a;"[..]),
        ("bad.ssl", BAD),
        ("b.ssl", &b"procedure b begin end"[..]),
    ];
    let results = driver.parse_batch(&inputs);
    let names: Vec<Vec<String>> = results
        .iter()
        .map(|r| {
            let report = r.as_ref().unwrap();
            report
                .state
                .data
                .procedure_names()
                .into_iter()
                .map(String::from)
                .collect()
        })
        .collect();
    assert_eq!(names, vec![vec!["a"], vec!["p"], vec!["b"]]);
    let flags: Vec<bool> = results.iter().map(|r| r.as_ref().unwrap().success()).collect();
    assert_eq!(flags, vec![true, false, true]);
    assert!(results[1].as_ref().unwrap().syntax_error.is_some());
}
