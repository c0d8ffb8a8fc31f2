//! CLI-specific error types and exit code mapping

use logsift_core::error::LogsiftError;
use logsift_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid invocation or configuration (bad config file, tail misuse,
    /// unopenable output file).
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (stdout write, diagnostics write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error (core config, or pipeline errors lifted into core).
    #[error("{0}")]
    Core(#[from] LogsiftError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                     |
    /// |------|-----------------------------|
    /// | 0    | Success                     |
    /// | 1    | General / pipeline error    |
    /// | 2    | Configuration error         |
    /// | 10   | IO error                    |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(LogsiftError::Config(_)) => 2,
            Self::Io(_) | Self::Core(LogsiftError::Io(_)) => 10,
            Self::Core(_) => 1,
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        match e {
            LogPipelineError::Io(io) => Self::Io(io),
            other => Self::Core(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsift_core::error::{ConfigError, PipelineError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("--tail cannot follow stdin".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(LogsiftError::Config(ConfigError::FileNotFound {
            path: "logsift.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2, "core config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_pipeline_error() {
        let err: CliError = LogPipelineError::Source {
            label: "access.log".to_owned(),
            reason: "read failed".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 1, "pipeline error should return exit code 1");
    }

    #[test]
    fn test_from_pipeline_config_error() {
        let err: CliError = LogPipelineError::Config {
            field: "poll_interval_ms".to_owned(),
            reason: "must be 10-60000".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::Core(LogsiftError::Config(_))));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_from_pipeline_source_error_is_lifted_into_core() {
        let err: CliError = LogPipelineError::Source {
            label: "-".to_owned(),
            reason: "broken".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            CliError::Core(LogsiftError::Pipeline(PipelineError::Source { .. }))
        ));
    }

    #[test]
    fn test_from_pipeline_io_error() {
        let err: CliError = LogPipelineError::Io(std::io::Error::other("disk full")).into();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = format!("{}", err);
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }
}
