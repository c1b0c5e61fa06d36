//! Synchrony CLI - Command-line interface for utterance synchrony analysis
//!
//! Commands:
//! - run: Score every session and column against reference windows
//! - validate: Check configuration and input without writing results
//! - distance: Edit distance between two symbol strings, optionally with its table

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use utterance_synchrony::types::ReferenceWindow;
use utterance_synchrony::{
    sink_from_config, window_count, CsvRecordSource, DistanceTable, OutputLayout,
    SynchronyConfig, SynchronyError, SynchronyProcessor, SYNCHRONY_VERSION,
};

/// Synchrony - Levenshtein synchrony analysis of coded utterance sessions
#[derive(Parser)]
#[command(name = "synchrony")]
#[command(version = SYNCHRONY_VERSION)]
#[command(about = "Score coded utterance sessions against reference windows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every session and column, writing one table per pair
    Run {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output directory (per_table layout) or file (combined layout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output layout
        #[arg(long)]
        layout: Option<Layout>,
    },

    /// Validate configuration and input, reporting sessions found
    Validate {
        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Edit distance between two symbol strings
    Distance {
        /// First sequence (characters, or whitespace-separated codes)
        a: String,

        /// Second sequence
        b: String,

        /// Print the full dynamic programming table
        #[arg(long)]
        table: bool,
    },
}

#[derive(Args)]
struct AnalysisArgs {
    /// Input CSV file
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Reference window to compare against (repeatable; all must share one length)
    #[arg(short, long = "window")]
    windows: Vec<String>,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Attribute columns to analyze, by name or position (default: all)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Declared attribute names, in input column order
    #[arg(long, value_delimiter = ',')]
    attributes: Vec<String>,

    /// Input starts with a header row
    #[arg(long)]
    has_headers: bool,

    /// Field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Debug-level logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// One CSV file per session and column
    #[value(name = "per_table")]
    PerTable,
    /// A single CSV file for all tables
    Combined,
}

impl From<Layout> for OutputLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::PerTable => OutputLayout::PerTable,
            Layout::Combined => OutputLayout::Combined,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SynchronyCliError> {
    match cli.command {
        Commands::Run {
            analysis,
            output,
            layout,
        } => {
            let mut config = build_config(&analysis)?;
            if output.is_some() {
                config.destination = output;
            }
            if let Some(layout) = layout {
                config.layout = layout.into();
            }
            init_logging(config.verbose);
            cmd_run(config)
        }

        Commands::Validate { analysis } => {
            let config = build_config(&analysis)?;
            init_logging(config.verbose);
            cmd_validate(config)
        }

        Commands::Distance { a, b, table } => cmd_distance(&a, &b, table),
    }
}

/// Start from the config file, if any, then apply flags on top
fn build_config(args: &AnalysisArgs) -> Result<SynchronyConfig, SynchronyCliError> {
    let mut config = match &args.config {
        Some(path) => SynchronyConfig::from_file(path)?,
        None => SynchronyConfig::default(),
    };

    if args.file.is_some() {
        config.source = args.file.clone();
    }
    if !args.windows.is_empty() {
        config.reference_windows = args.windows.clone();
    }
    if !args.columns.is_empty() {
        config.columns = args.columns.clone();
    }
    if !args.attributes.is_empty() {
        config.attributes = args.attributes.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    config.has_headers |= args.has_headers;
    config.verbose |= args.verbose;

    Ok(config)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_run(config: SynchronyConfig) -> Result<(), SynchronyCliError> {
    let processor = SynchronyProcessor::new(config)?;
    let mut source = CsvRecordSource::from_config(processor.config(), &processor.plan().attributes)?;
    let mut sink = sink_from_config(processor.config())?;

    let summary = processor.run(&mut source, sink.as_mut())?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_validate(config: SynchronyConfig) -> Result<(), SynchronyCliError> {
    let processor = SynchronyProcessor::new(config)?;
    let mut source = CsvRecordSource::from_config(processor.config(), &processor.plan().attributes)?;
    let sessions = processor.ingest(&mut source)?;

    let plan = processor.plan();
    let window_len = NonZeroUsize::new(plan.references.window_len());
    let report = ValidationReport {
        references: plan.references.labels(),
        window_length: plan.references.window_len(),
        columns: plan.projectors.iter().map(|p| p.name().to_string()).collect(),
        records: sessions.iter().map(|s| s.len()).sum(),
        sessions: sessions
            .iter()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                utterances: s.len(),
                windows: window_len.map_or(0, |len| window_count(s.len(), len)),
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_distance(a: &str, b: &str, table: bool) -> Result<(), SynchronyCliError> {
    let a = ReferenceWindow::parse(a).symbols;
    let b = ReferenceWindow::parse(b).symbols;

    if table {
        let table = DistanceTable::compute(&a, &b);
        print!("{}", table);
        println!("distance: {}", table.distance());
    } else {
        println!("{}", utterance_synchrony::distance(&a, &b));
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum SynchronyCliError {
    Io(io::Error),
    Synchrony(SynchronyError),
    Json(serde_json::Error),
}

impl From<io::Error> for SynchronyCliError {
    fn from(e: io::Error) -> Self {
        SynchronyCliError::Io(e)
    }
}

impl From<SynchronyError> for SynchronyCliError {
    fn from(e: SynchronyError) -> Self {
        SynchronyCliError::Synchrony(e)
    }
}

impl From<serde_json::Error> for SynchronyCliError {
    fn from(e: serde_json::Error) -> Self {
        SynchronyCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: &str, message: String, hint: &str) -> Self {
        CliError {
            code: code.to_string(),
            message,
            hint: Some(hint.to_string()),
        }
    }
}

impl From<SynchronyCliError> for CliError {
    fn from(e: SynchronyCliError) -> Self {
        match e {
            SynchronyCliError::Io(e) => {
                CliError::new("IO_ERROR", e.to_string(), "Check file paths and permissions")
            }
            SynchronyCliError::Json(e) => {
                CliError::new("JSON_ERROR", e.to_string(), "Report output could not be encoded")
            }
            SynchronyCliError::Synchrony(e) => {
                let (code, hint) = match &e {
                    SynchronyError::InputFormat { .. } | SynchronyError::MissingCode { .. } => (
                        "INPUT_FORMAT",
                        "Each row needs session_id, owner_id, turn_id and one code per attribute",
                    ),
                    SynchronyError::InvalidColumn(_) => (
                        "INVALID_COLUMN",
                        "Columns must name or index a declared attribute",
                    ),
                    SynchronyError::EmptyReferenceWindow { .. } => {
                        ("EMPTY_REFERENCE_WINDOW", "Reference windows need at least one symbol")
                    }
                    SynchronyError::MismatchedWindowLength { .. } => (
                        "MISMATCHED_WINDOW_LENGTH",
                        "All reference windows must have the same length",
                    ),
                    SynchronyError::NoReferenceWindows => {
                        ("NO_REFERENCE_WINDOWS", "Pass at least one --window")
                    }
                    SynchronyError::Config(_) => {
                        ("CONFIG_ERROR", "Check the configuration file and flags")
                    }
                    SynchronyError::Csv(_) => ("CSV_ERROR", "Check the input file encoding and quoting"),
                    SynchronyError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                };
                CliError::new(code, e.to_string(), hint)
            }
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    references: Vec<String>,
    window_length: usize,
    columns: Vec<String>,
    records: usize,
    sessions: Vec<SessionSummary>,
}

#[derive(serde::Serialize)]
struct SessionSummary {
    id: String,
    utterances: usize,
    windows: usize,
}
