//! Command-line interface for the stateful-code detector
//!
//! Translates CLI arguments into a configured `FileProcessor` run: resolves
//! the report format and workaround mode up front, dispatches on whether the
//! input is a file or a directory, and maps the outcome to a process exit
//! code.

use clap::Parser;
use std::path::PathBuf;
use std::process;

use stateful_detector::{
    exit_codes, DetectorResult, FileProcessor, ReportFormat, WorkaroundMode, WorkaroundSpec,
};

/// Detect stateful code in framework-managed singleton beans
#[derive(Parser)]
#[command(name = "stateful-detector")]
#[command(version)]
#[command(about = "Detects instance-state mutation in Spring and EJB singleton beans")]
#[command(
    long_about = "Analyzes Java sources for fields of framework-managed singletons that are \
mutated outside constructors and one-time initializers. Findings can be reported as \
human-readable text or CSV, or remediated by inserting a @Scope annotation."
)]
struct Cli {
    /// File or directory to analyze
    input_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Report output format (default, csv)
    #[arg(long, default_value = "default")]
    report_format: String,

    /// Rewrite offending components instead of reporting (apply, preview)
    #[arg(long)]
    workaround_mode: Option<String>,

    /// Scope name the workaround inserts
    #[arg(long, default_value = "prototype")]
    workaround_scope_name: String,

    /// ScopedProxyMode the workaround inserts
    #[arg(long, default_value = "TARGET_CLASS")]
    workaround_proxy_mode: String,

    /// Additional scope name treated as exempt (repeatable)
    #[arg(long = "allowed-scope", action = clap::ArgAction::Append)]
    allowed_scopes: Vec<String>,

    /// Exit with code 65 when stateful issues are detected
    #[arg(long)]
    fail_on_detection: bool,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> DetectorResult<i32> {
    // Option errors surface before any file is touched
    let format = ReportFormat::from_str(&cli.report_format)?;
    let workaround = cli
        .workaround_mode
        .as_deref()
        .map(WorkaroundMode::from_str)
        .transpose()?
        .map(|mode| {
            WorkaroundSpec::new(
                cli.workaround_scope_name.clone(),
                cli.workaround_proxy_mode.clone(),
                mode,
            )
        });

    if !cli.input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input_path.display());
        return Ok(exit_codes::ERROR);
    }

    let mut processor = FileProcessor::new(
        format.create_reporter(),
        workaround,
        cli.allowed_scopes,
        cli.fail_on_detection,
    )?;

    if cli.input_path.is_dir() {
        processor.process_directory(&cli.input_path)
    } else {
        processor.process_file(&cli.input_path)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
