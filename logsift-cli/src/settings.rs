//! Effective run settings: defaults, config file, env overrides, then CLI flags.
//!
//! Everything that can make an invocation invalid before any input is read is
//! checked here, so command handlers only deal with runtime failures.

use std::path::{Path, PathBuf};

use logsift_core::config::LogsiftConfig;
use logsift_pipeline::tail::StartPosition;
use logsift_pipeline::{PipelineConfig, PipelineConfigBuilder};

use crate::cli::Cli;
use crate::error::CliError;

/// Label used for standard input, both on the command line and in diagnostics.
pub const STDIN_LABEL: &str = "-";

/// Load the configuration file (if any), apply env overrides and the
/// `--log-level` flag, and validate the result.
///
/// Without a path, only defaults and `LOGSIFT_*` environment variables apply.
pub async fn load_config(
    path: Option<&Path>,
    log_level: Option<&str>,
) -> Result<LogsiftConfig, CliError> {
    let mut config = match path {
        Some(path) => LogsiftConfig::load(path).await?,
        None => LogsiftConfig::from_env()?,
    };

    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
        config.validate()?;
    }

    Ok(config)
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Input sources in command-line order (`-` is stdin).
    pub sources: Vec<String>,
    /// Structured query expression.
    pub query: Option<String>,
    /// Plain substring search term.
    pub search: Option<String>,
    /// Output file; stdout when `None`.
    pub output: Option<PathBuf>,
    /// Follow a single file instead of reading sources once.
    pub tail: bool,
    /// Typed pipeline settings after flag overrides.
    pub pipeline: PipelineConfig,
}

impl RunSettings {
    /// Merge the loaded configuration with command-line flags.
    ///
    /// Boolean flags can only switch a setting on; leaving a flag out keeps
    /// the configured value.
    pub fn resolve(cli: &Cli, config: &LogsiftConfig) -> Result<Self, CliError> {
        let mut builder = PipelineConfigBuilder::from_config(PipelineConfig::from_core(config)?);

        if let Some(format) = cli.format {
            builder = builder.format(format.into());
        }
        if cli.strict {
            builder = builder.strict(true);
        }
        if cli.ignore_case {
            builder = builder.case_insensitive(true);
        }
        if cli.from_start {
            builder = builder.from_start(true);
        }
        if let Some(ms) = cli.poll_interval_ms {
            builder = builder.poll_interval_ms(ms);
        }
        let pipeline = builder.build()?;

        if cli.tail {
            if cli.logs.len() != 1 {
                return Err(CliError::Config(
                    "--tail expects exactly one --log FILE (not multiple, not stdin)".to_owned(),
                ));
            }
            if cli.logs[0] == STDIN_LABEL {
                return Err(CliError::Config(
                    "--tail cannot follow stdin; provide a file path with --log".to_owned(),
                ));
            }
        }

        Ok(Self {
            sources: cli.logs.clone(),
            query: cli.query.clone(),
            search: cli.search.clone(),
            output: cli.output.clone(),
            tail: cli.tail,
            pipeline,
        })
    }

    /// Where tail mode starts reading a freshly opened file.
    pub fn start_position(&self) -> StartPosition {
        if self.pipeline.from_start {
            StartPosition::Beginning
        } else {
            StartPosition::End
        }
    }
}
