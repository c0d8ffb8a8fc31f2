//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use logsift_pipeline::OutputFormat;

/// logsift -- search, filter and follow web server access logs.
///
/// Reads Apache/Nginx combined-format logs, filters records with a small
/// query language (`status>=500 method:POST url:*login*`) or a plain
/// substring search, and writes matches as text, JSON or CSV.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about, long_about = None)]
pub struct Cli {
    /// Input log file; repeat for several files. Use `-` for stdin.
    #[arg(short = 'l', long = "log", value_name = "FILE", required = true)]
    pub logs: Vec<String>,

    /// Structured query, e.g. `status>=400 method:POST url:*login*`.
    #[arg(short, long, value_name = "EXPR")]
    pub query: Option<String>,

    /// Plain substring search over method, url, user agent, timestamp and ip.
    #[arg(short, long, value_name = "TERM")]
    pub search: Option<String>,

    /// Output format (default from config, otherwise text).
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Write matched records to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report lines that fail to parse on stderr.
    #[arg(long)]
    pub strict: bool,

    /// Case-insensitive matching for queries and searches.
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Follow exactly one file as it grows, surviving truncation and rotation.
    #[arg(short = 'f', long)]
    pub tail: bool,

    /// In tail mode, start from the beginning of the file instead of the end.
    #[arg(long, requires = "tail")]
    pub from_start: bool,

    /// In tail mode, how long to wait between polls when no new data arrived.
    #[arg(long, value_name = "MS", requires = "tail")]
    pub poll_interval_ms: Option<u64>,

    /// Path to an optional logsift.toml configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Supported record output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// `[timestamp] ip method url -> status`
    Text,
    /// JSON array (one object per line in tail mode).
    Json,
    /// Quoted CSV without a header row.
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}
