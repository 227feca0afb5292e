//! Execution modes
//!
//! A [`Driver`] runs one [`Tool`] (grammar, actions and scratch type) over a
//! piece of content in one of the [`RunMode`]s. Every run gets a fresh
//! [`ParseState`]; the tool itself is shared and never modified.
//!
//! Reports (coverage tables, parse trees) go to the output sink, while
//! traces, failure reports and grammar issues go to the diagnostics sink.
//! By default these are stdout and stderr.
//!
//! # Example
//!
//! ```rust
//! use parr::driver::{Driver, RunMode};
//! use parr::ssl::Ssl;
//!
//! let ssl = Ssl::new().unwrap();
//! let mut diagnostics = Vec::new();
//! let mut driver = Driver::new(&ssl).with_diagnostics(&mut diagnostics);
//! let report = driver
//!     .run(RunMode::Parse, "inline", b"procedure p begin end")
//!     .unwrap();
//! assert!(report.success());
//! ```

use crate::engine::cursor::line_at;
use crate::engine::parallel;
use crate::engine::{
    ActionTable, CoverageObserver, CoverageReport, EngineFault, Grammar, GrammarAnalyzer,
    GrammarIssue, LoadError, MatchLimits, MatchObserver, MatchOutcome, Matcher, NoopObserver,
    ParrError, ParseState, ParseTrace, ParseTree, StrategyConfig, SyntaxError, TraceConfig,
    TraceObserver, TreeBuilder,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Modes
// ============================================================================

/// What a run does with the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Static grammar check, no input
    Analyze,
    /// Plain parse
    Parse,
    /// Parse and report per-rule counts
    Coverage,
    /// Parse and record every rule attempt
    Trace,
    /// Parse and emit the parse tree as DOT
    ParseTree,
    /// Parse; trace a second run only if the first one failed
    ParseErrorTrace,
}

impl RunMode {
    /// Every mode, in declaration order
    pub const ALL: [RunMode; 6] = [
        RunMode::Analyze,
        RunMode::Parse,
        RunMode::Coverage,
        RunMode::Trace,
        RunMode::ParseTree,
        RunMode::ParseErrorTrace,
    ];

    /// Command-line name
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Analyze => "analyze",
            RunMode::Parse => "parse",
            RunMode::Coverage => "coverage",
            RunMode::Trace => "trace",
            RunMode::ParseTree => "parse-tree",
            RunMode::ParseErrorTrace => "parse-error-trace",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown mode `{}`", s))
    }
}

/// How the coverage report is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

// ============================================================================
// Configuration
// ============================================================================

/// Run configuration
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes:
///
/// ```json
/// { "max_recursion_depth": 500, "strategy": { "kind": "two-phase", "optimistic_steps": 100000 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum rule nesting depth (0 = unlimited)
    pub max_recursion_depth: usize,

    /// Maximum number of rule attempts (0 = unlimited)
    pub max_steps: u64,

    /// How parses are attempted
    pub strategy: StrategyConfig,

    /// Trace layout
    pub trace: TraceConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let limits = MatchLimits::default();
        Self {
            max_recursion_depth: limits.max_recursion_depth,
            max_steps: limits.max_steps,
            strategy: StrategyConfig::default(),
            trace: TraceConfig::default(),
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParrError> {
        let path = path.as_ref();
        let config_error = |message: String| ParrError::Config {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Set the maximum recursion depth
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Set the step budget
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the trace layout
    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    /// Limits for one attempt
    pub fn limits(&self) -> MatchLimits {
        MatchLimits::default()
            .with_max_recursion_depth(self.max_recursion_depth)
            .with_max_steps(self.max_steps)
    }
}

// ============================================================================
// Tools
// ============================================================================

/// A grammar with its actions
///
/// The driver builds a fresh `ParseState<Self::Data>` for every run.
pub trait Tool {
    /// Scratch data the actions work on
    type Data: Default + Send;

    /// Name used in logs
    fn name(&self) -> &str;

    /// The grammar
    fn grammar(&self) -> &Grammar;

    /// Callbacks bound to the grammar's named rules
    fn actions(&self) -> &ActionTable<Self::Data>;
}

/// Result of one run
#[derive(Debug)]
pub struct RunReport<D> {
    /// The mode that produced this report
    pub mode: RunMode,
    /// Final state of the run
    pub state: ParseState<D>,
    /// Match details, absent for [`RunMode::Analyze`]
    pub outcome: Option<MatchOutcome>,
    /// Why the input was rejected
    pub syntax_error: Option<SyntaxError>,
    /// Per-rule counts ([`RunMode::Coverage`])
    pub coverage: Option<CoverageReport>,
    /// Parse tree ([`RunMode::ParseTree`], successful runs only)
    pub tree: Option<ParseTree>,
    /// Rule attempts ([`RunMode::Trace`], failed [`RunMode::ParseErrorTrace`])
    pub trace: Option<ParseTrace>,
}

impl<D> RunReport<D> {
    fn new(mode: RunMode, state: ParseState<D>) -> Self {
        Self {
            mode,
            state,
            outcome: None,
            syntax_error: None,
            coverage: None,
            tree: None,
            trace: None,
        }
    }

    /// Whether the input was accepted
    pub fn success(&self) -> bool {
        self.state.result
    }
}

/// Run `tool` over `input` with `observer` attached, under the configured
/// strategy
///
/// The state and observer are reset before every attempt, so a retry starts
/// from scratch.
fn execute<T: Tool, O: MatchObserver>(
    tool: &T,
    config: &ParserConfig,
    mode: RunMode,
    content_name: &str,
    input: &[u8],
    observer: &mut O,
) -> Result<RunReport<T::Data>, EngineFault> {
    let grammar = tool.grammar();
    let actions = tool.actions();
    let strategy = config.strategy.build();
    let mut state = ParseState::new(content_name);
    log::debug!(
        "{} {}: {} mode, {} strategy",
        tool.name(),
        content_name,
        mode,
        strategy.name()
    );

    let outcome = strategy.execute(config.limits(), &mut |limits| {
        state.reset();
        observer.reset();
        Matcher::new(grammar, input, actions, &mut state, observer)
            .with_limits(limits)
            .run()
    })?;

    state.result = outcome.consumed_all;
    let syntax_error = (!state.result).then(|| {
        let position = outcome.failure_position();
        SyntaxError {
            content_name: content_name.to_string(),
            position,
            line: String::from_utf8_lossy(line_at(input, position.offset)).into_owned(),
        }
    });

    let mut report = RunReport::new(mode, state);
    report.outcome = Some(outcome);
    report.syntax_error = syntax_error;
    Ok(report)
}

// ============================================================================
// Driver
// ============================================================================

/// Runs a [`Tool`] in any [`RunMode`]
pub struct Driver<'t, T: Tool> {
    tool: &'t T,
    config: ParserConfig,
    coverage_format: CoverageFormat,
    output: Box<dyn Write + 't>,
    diagnostics: Box<dyn Write + 't>,
}

impl<'t, T: Tool> Driver<'t, T> {
    /// Create a driver writing to stdout and stderr
    pub fn new(tool: &'t T) -> Self {
        Self {
            tool,
            config: ParserConfig::default(),
            coverage_format: CoverageFormat::default(),
            output: Box::new(io::stdout()),
            diagnostics: Box::new(io::stderr()),
        }
    }

    /// Use `config` for every run
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Write coverage reports as `format`
    pub fn with_coverage_format(mut self, format: CoverageFormat) -> Self {
        self.coverage_format = format;
        self
    }

    /// Write reports to `output`
    pub fn with_output(mut self, output: impl Write + 't) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Write traces, failure reports and grammar issues to `diagnostics`
    pub fn with_diagnostics(mut self, diagnostics: impl Write + 't) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Run in `mode`
    pub fn run(
        &mut self,
        mode: RunMode,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        match mode {
            RunMode::Analyze => {
                self.analyze()?;
                Ok(RunReport::new(mode, ParseState::new(content_name)))
            }
            RunMode::Parse => self.parse(content_name, input),
            RunMode::Coverage => self.coverage(content_name, input),
            RunMode::Trace => self.trace(content_name, input),
            RunMode::ParseTree => self.parse_tree(content_name, input),
            RunMode::ParseErrorTrace => self.parse_error_trace(content_name, input),
        }
    }

    /// Check the grammar for loops that cannot terminate
    ///
    /// Issues are written to the diagnostics sink; any issue is an error.
    pub fn analyze(&mut self) -> Result<(), ParrError> {
        let issues: Vec<GrammarIssue> = GrammarAnalyzer::new(self.tool.grammar()).analyze();
        for issue in &issues {
            writeln!(self.diagnostics, "{}", issue)?;
        }
        writeln!(
            self.diagnostics,
            "{}: {} grammar issue(s)",
            self.tool.name(),
            issues.len()
        )?;
        if issues.is_empty() {
            Ok(())
        } else {
            log::warn!("{} grammar issue(s) in {}", issues.len(), self.tool.name());
            Err(ParrError::GrammarDefinition { issues })
        }
    }

    /// Parse `input`; the whole input must match
    pub fn parse(
        &mut self,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        let report = self.execute(RunMode::Parse, content_name, input, &mut NoopObserver)?;
        self.report_failure(&report)?;
        Ok(report)
    }

    /// Parse and write per-rule counts to the output, pass or fail
    pub fn coverage(
        &mut self,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        let mut observer = CoverageObserver::new(self.tool.grammar());
        let result = self.execute(RunMode::Coverage, content_name, input, &mut observer);
        // counts up to a fault are still written
        let coverage = observer.report(self.tool.grammar());
        match self.coverage_format {
            CoverageFormat::Table => write!(self.output, "{}", coverage)?,
            CoverageFormat::Json => {
                let json = coverage.to_json().map_err(io::Error::from)?;
                writeln!(self.output, "{}", json)?;
            }
        }
        let mut report = result?;
        self.report_failure(&report)?;
        report.coverage = Some(coverage);
        Ok(report)
    }

    /// Parse and write every rule attempt to the diagnostics
    pub fn trace(
        &mut self,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        self.traced(RunMode::Trace, content_name, input)
    }

    /// Parse and write the parse tree to the output as DOT
    pub fn parse_tree(
        &mut self,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        let mut builder = TreeBuilder::new();
        let mut report = self.execute(RunMode::ParseTree, content_name, input, &mut builder)?;
        if report.success() {
            let tree = builder.finish();
            write!(self.output, "{}", tree.to_dot())?;
            report.tree = Some(tree);
        } else {
            self.report_failure(&report)?;
        }
        Ok(report)
    }

    /// Parse; if that fails, parse again with tracing
    pub fn parse_error_trace(
        &mut self,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        let report = self.execute(RunMode::ParseErrorTrace, content_name, input, &mut NoopObserver)?;
        if report.success() {
            return Ok(report);
        }
        log::debug!("{} failed, tracing a second run", content_name);
        self.traced(RunMode::ParseErrorTrace, content_name, input)
    }

    /// Parse many inputs with independent states
    ///
    /// Nothing is written to the sinks; failures are in the reports. With the
    /// `parallel` feature the inputs are spread over rayon's thread pool.
    pub fn parse_batch<C>(
        &self,
        inputs: &[(&str, C)],
    ) -> Vec<Result<RunReport<T::Data>, ParrError>>
    where
        T: Sync,
        C: AsRef<[u8]> + Sync,
    {
        let tool = self.tool;
        let config = &self.config;
        parallel::parse_batch(inputs, |(content_name, input)| {
            execute(
                tool,
                config,
                RunMode::Parse,
                content_name,
                input.as_ref(),
                &mut NoopObserver,
            )
            .map_err(ParrError::from)
        })
    }

    fn traced(
        &mut self,
        mode: RunMode,
        content_name: &str,
        input: &[u8],
    ) -> Result<RunReport<T::Data>, ParrError> {
        let mut observer = TraceObserver::new(self.config.trace.clone());
        let result = self.execute(mode, content_name, input, &mut observer);
        let trace = observer.finish();
        write!(self.diagnostics, "{}", trace)?;
        let mut report = result?;
        self.report_failure(&report)?;
        report.trace = Some(trace);
        Ok(report)
    }

    fn execute<O: MatchObserver>(
        &self,
        mode: RunMode,
        content_name: &str,
        input: &[u8],
        observer: &mut O,
    ) -> Result<RunReport<T::Data>, ParrError> {
        execute(self.tool, &self.config, mode, content_name, input, observer).map_err(|fault| {
            log::warn!("{}: {}", content_name, fault);
            ParrError::from(fault)
        })
    }

    fn report_failure(&mut self, report: &RunReport<T::Data>) -> Result<(), ParrError> {
        if let Some(error) = &report.syntax_error {
            log::debug!("{}", error);
            writeln!(self.diagnostics, "{}", error.report())?;
        }
        Ok(())
    }
}

/// Read a whole file into memory
pub fn load_content(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssl::Ssl;

    #[test]
    fn test_mode_names_round_trip() {
        for mode in RunMode::ALL {
            assert_eq!(mode.to_string().parse::<RunMode>().unwrap(), mode);
        }
        assert!("tree".parse::<RunMode>().is_err());
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: ParserConfig = serde_json::from_str(r#"{"max_steps": 50}"#).unwrap();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.max_recursion_depth, ParserConfig::default().max_recursion_depth);
        assert_eq!(config.strategy, StrategyConfig::Direct);
        assert!(config.trace.hide_anonymous);
    }

    #[test]
    fn test_config_limits() {
        let config = ParserConfig::new()
            .with_max_recursion_depth(10)
            .with_max_steps(20);
        assert_eq!(
            config.limits(),
            MatchLimits {
                max_recursion_depth: 10,
                max_steps: 20
            }
        );
    }

    #[test]
    fn test_failure_report_goes_to_diagnostics() {
        let ssl = Ssl::new().unwrap();
        let mut output = Vec::new();
        let mut diagnostics = Vec::new();
        {
            let mut driver = Driver::new(&ssl)
                .with_output(&mut output)
                .with_diagnostics(&mut diagnostics);
            let report = driver.parse("bad.ssl", b"variable x").unwrap();
            assert!(!report.success());
            assert!(report.syntax_error.is_some());
        }
        assert!(output.is_empty());
        let diagnostics = String::from_utf8(diagnostics).unwrap();
        assert!(diagnostics.starts_with("PARSE FAIL\nvariable x\n"));
    }

    #[test]
    fn test_step_budget_is_a_fault() {
        let ssl = Ssl::new().unwrap();
        let mut driver = Driver::new(&ssl)
            .with_config(ParserConfig::new().with_max_steps(5))
            .with_diagnostics(io::sink());
        let err = driver.parse("t", b"variable a;").unwrap_err();
        assert!(matches!(
            err,
            ParrError::Fault(EngineFault::Cancelled { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_content("/definitely/not/here.ssl").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
