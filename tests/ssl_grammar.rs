//! Integration tests for the SSL grammar
//!
//! These tests run complete programs through the driver and check what the
//! actions, parse trees and coverage reports see.

use parr::driver::{Driver, RunReport};
use parr::ssl::{Ssl, SslData, SslEvent};
use std::io;

const WELL_FORMED: &str = "variable a; procedure p(); procedure q begin variable b; end";
const MALFORMED: &str = "procedure p begin variable b end";

fn parse(input: &str) -> RunReport<SslData> {
    let ssl = Ssl::new().expect("SSL grammar should build");
    let mut driver = Driver::new(&ssl).with_diagnostics(io::sink());
    driver.parse("test.ssl", input.as_bytes()).expect("no engine fault")
}

// ============================================================================
// Accepted programs
// ============================================================================

#[test]
fn test_well_formed_program_parses() {
    let report = parse(WELL_FORMED);
    assert!(report.success());
    assert!(report.syntax_error.is_none());
    assert_eq!(report.state.data.procedure_names(), vec!["p", "q"]);
}

#[test]
fn test_well_formed_tree_names() {
    let ssl = Ssl::new().unwrap();
    let mut output = Vec::new();
    let report = {
        let mut driver = Driver::new(&ssl)
            .with_output(&mut output)
            .with_diagnostics(io::sink());
        driver.parse_tree("test.ssl", WELL_FORMED.as_bytes()).unwrap()
    };
    let tree = report.tree.expect("tree on success");
    assert_eq!(tree.texts("procedure::name"), vec!["p", "q"]);
    assert_eq!(tree.texts("variable::name"), vec!["a", "b"]);
    assert_eq!(tree.find_all("procedure::body").len(), 1);

    let dot = String::from_utf8(output).unwrap();
    assert!(dot.starts_with("digraph parse_tree"));
    assert!(dot.contains("procedure::name\\n\\\"q\\\""));
}

#[test]
fn test_realistic_program() {
    let program = "\u{feff}// counters\r\n\
        import variable total;\r\n\
        variable step := 1;\r\n\
        \r\n\
        procedure reset();\r\n\
        procedure count() /* increments */\r\n\
        begin\r\n\
            variable i = 0;\r\n\
            i++;\r\n\
            if i > 9 then begin end\r\n\
            /* nested\r\n   comment */\r\n\
        end\r\n";
    let report = parse(program);
    assert!(report.success(), "{:?}", report.syntax_error);
    assert_eq!(report.state.data.procedure_names(), vec!["reset", "count"]);
}

// ============================================================================
// Rejected programs
// ============================================================================

#[test]
fn test_missing_semicolon_fails_before_end() {
    let report = parse(MALFORMED);
    assert!(!report.success());
    let error = report.syntax_error.expect("syntax error");
    let b = MALFORMED.find(" b ").unwrap() + 2;
    let end = MALFORMED.rfind("end").unwrap();
    assert!(error.position.offset >= b && error.position.offset <= end);
    assert_eq!(error.position.offset, 29);
    assert_eq!(error.line, MALFORMED);
    assert!(error.report().ends_with(&format!("{}^", "-".repeat(29))));
}

#[test]
fn test_failure_line_is_the_offending_line() {
    let report = parse("variable a;\nvariable b = 10;\nvariable c;\n");
    let error = report.syntax_error.expect("syntax error");
    assert_eq!(error.position.line, 2);
    assert_eq!(error.line, "variable b = 10;");
}

#[test]
fn test_else_is_rejected() {
    let report = parse("procedure p begin if a then begin end else begin end end");
    assert!(!report.success());
}

// ============================================================================
// Actions
// ============================================================================

#[test]
fn test_scope_events_once_per_procedure() {
    let report = parse("procedure p begin end procedure q begin begin end end procedure r;");
    let data = &report.state.data;
    let begins: Vec<_> = data
        .events
        .iter()
        .filter_map(|e| match e {
            SslEvent::ScopeBegin { procedure } => Some(procedure.as_str()),
            _ => None,
        })
        .collect();
    let ends = data.count(|e| matches!(e, SslEvent::ScopeEnd { .. }));
    assert_eq!(begins, vec!["p", "q"]);
    assert_eq!(ends, 2);
    assert_eq!(data.scope_depth, 0);
    assert_eq!(
        data.events.last(),
        Some(&SslEvent::Declared {
            procedure: "r".to_string()
        })
    );
}

#[test]
fn test_each_run_starts_fresh() {
    let ssl = Ssl::new().unwrap();
    let mut driver = Driver::new(&ssl).with_diagnostics(io::sink());
    let first = driver.parse("one.ssl", b"procedure a;").unwrap();
    let second = driver.parse("two.ssl", b"procedure b;").unwrap();
    assert_eq!(first.state.data.procedure_names(), vec!["a"]);
    assert_eq!(second.state.data.procedure_names(), vec!["b"]);
    assert_eq!(second.state.content_name, "two.ssl");
}

// ============================================================================
// Coverage
// ============================================================================

#[test]
fn test_coverage_of_forward_declaration() {
    let ssl = Ssl::new().unwrap();
    let mut output = Vec::new();
    let report = {
        let mut driver = Driver::new(&ssl)
            .with_output(&mut output)
            .with_diagnostics(io::sink());
        driver.coverage("decl.ssl", b"procedure p;").unwrap()
    };
    assert!(report.success());
    let coverage = report.coverage.expect("coverage report");
    assert_eq!(coverage.hits("procedure::body"), Some(0));
    assert_eq!(coverage.hits("procedure::scope::begin"), Some(0));
    assert_eq!(coverage.hits("procedure::scope::end"), Some(0));
    assert!(coverage.hits("procedure::declaration").unwrap() > 0);
    assert!(coverage.hits("procedure::name").unwrap() > 0);
    assert!(coverage.uncovered().contains(&"block"));

    let table = String::from_utf8(output).unwrap();
    assert!(table.contains("procedure::declaration"));
}
