//! Command-line front end for the SSL grammar
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use parr::driver::{load_content, CoverageFormat, Driver, ParserConfig, RunMode, Tool};
use parr::engine::{GrammarVisualizer, ParrError, StrategyConfig};
use parr::ssl::Ssl;
use std::path::PathBuf;
use std::process::ExitCode;

/// When to run the static grammar check
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnalyzeRules {
    /// Do not check
    Skip,
    /// Check and stop on issues, otherwise continue
    ExitOnError,
    /// Check and stop
    ExitAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Table,
    Json,
}

impl From<ReportFormat> for CoverageFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Table => CoverageFormat::Table,
            ReportFormat::Json => CoverageFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(name = "parr-ssl")]
#[command(about = "Parse SSL files and inspect the grammar")]
#[command(version)]
struct Cli {
    /// File to parse; not needed with --print-grammar or --analyze-rules=exit-after
    #[arg(long)]
    file: Option<PathBuf>,

    /// parse, parse-tree, trace, coverage, parse-error-trace or analyze
    #[arg(long = "run", default_value = "parse")]
    mode: RunMode,

    /// Check the grammar for empty loops and left recursion first
    #[arg(
        long,
        value_enum,
        num_args = 0..=1,
        require_equals = true,
        default_value = "skip",
        default_missing_value = "exit-on-error"
    )]
    analyze_rules: AnalyzeRules,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Try with this step budget first, then without one
    #[arg(long, value_name = "STEPS")]
    two_phase: Option<u64>,

    /// Maximum rule nesting depth (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Coverage report format
    #[arg(long, value_enum, default_value = "table")]
    coverage_format: ReportFormat,

    /// Print the grammar as a DOT graph and exit
    #[arg(long)]
    print_grammar: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.file.is_none() && !cli.print_grammar && cli.analyze_rules != AnalyzeRules::ExitAfter {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "the following required arguments were not provided:\n  --file <FILE>",
            )
            .exit();
    }

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn config(cli: &Cli) -> Result<ParserConfig, ParrError> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::load(path)?,
        None => ParserConfig::default(),
    };
    if let Some(optimistic_steps) = cli.two_phase {
        config = config.with_strategy(StrategyConfig::TwoPhase { optimistic_steps });
    }
    if let Some(depth) = cli.max_depth {
        config = config.with_max_recursion_depth(depth);
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<bool, ParrError> {
    let config = config(cli)?;
    let ssl = Ssl::new()?;

    if cli.print_grammar {
        print!("{}", GrammarVisualizer::new(ssl.grammar()).to_dot());
        return Ok(true);
    }

    let mut driver = Driver::new(&ssl)
        .with_config(config)
        .with_coverage_format(cli.coverage_format.into());

    match cli.analyze_rules {
        AnalyzeRules::Skip => {}
        AnalyzeRules::ExitOnError => driver.analyze()?,
        AnalyzeRules::ExitAfter => {
            driver.analyze()?;
            return Ok(true);
        }
    }

    let Some(path) = &cli.file else {
        return Ok(true);
    };
    let content = load_content(path)?;
    let report = driver.run(cli.mode, &path.display().to_string(), &content)?;
    Ok(report.success())
}
