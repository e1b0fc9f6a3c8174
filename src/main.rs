//! tabslim - shrink and tidy tabular data before exploration

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

use tabslim::config::{Config, OutputFormat, RowFilter, TextEncoding};
use tabslim::memory;
use tabslim::output::render_to_stdout;
use tabslim::pipeline;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEncoding {
    Utf8,
    Latin1,
}

impl From<CliEncoding> for TextEncoding {
    fn from(e: CliEncoding) -> Self {
        match e {
            CliEncoding::Utf8 => TextEncoding::Utf8,
            CliEncoding::Latin1 => TextEncoding::Latin1,
        }
    }
}

/// Shrink and tidy tabular data (CSV, JSON, Parquet) before exploration
#[derive(Parser, Debug)]
#[command(name = "tabslim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file
    file: PathBuf,

    /// Keep only rows where COLUMN equals VALUE (e.g. city=Paris)
    #[arg(long, value_name = "COLUMN=VALUE")]
    filter: Option<RowFilter>,

    /// Column(s) to parse as dates (comma-separated)
    #[arg(long, value_delimiter = ',')]
    parse_dates: Vec<String>,

    /// Text encoding of CSV input
    #[arg(long, value_enum, default_value = "utf8")]
    encoding: CliEncoding,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Write JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Preview the first N rows of the result
    #[arg(long, value_name = "N", default_value_t = 0)]
    head: usize,

    /// Keep the original column storage
    #[arg(long)]
    no_optimize: bool,

    /// Keep the original column labels
    #[arg(long)]
    no_normalize: bool,

    /// Allow labels that collide after normalization
    #[arg(long)]
    allow_duplicate_labels: bool,

    /// Print process memory usage when done
    #[arg(long)]
    show_memory: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = Config::new(cli.file)
            .with_parse_dates(cli.parse_dates)
            .with_encoding(cli.encoding.into())
            .with_output_format(cli.format.into())
            .with_compact(cli.compact)
            .with_head(cli.head)
            .with_optimize(!cli.no_optimize)
            .with_normalize(!cli.no_normalize)
            .with_allow_duplicate_labels(cli.allow_duplicate_labels)
            .with_show_memory(cli.show_memory);
        config.filter = cli.filter;
        config
    }
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(2)
        }
    }
}

/// Log to stderr, filtered by RUST_LOG, then TABSLIM_LOG, then `warn`
fn init_logging() {
    let fallback = std::env::var("TABSLIM_LOG").unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_error(e: &anyhow::Error) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "Error:");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {:#}", e);
}

fn run() -> Result<()> {
    let config: Config = Cli::parse().into();

    let output = pipeline::run(&config)?;
    render_to_stdout(&output.summary, &config)?;

    if config.show_memory {
        memory::report()?;
    }

    Ok(())
}
