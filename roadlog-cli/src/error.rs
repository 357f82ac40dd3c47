//! CLI-specific error types and exit code mapping

use roadlog_core::error::RoadlogError;
use roadlog_correlator::CorrelatorError;
use roadlog_path_validator::PathValidatorError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from roadlog-core.
    #[error("{0}")]
    Core(#[from] RoadlogError),

    /// One or more run groups failed to aggregate.
    #[error("aggregate error: {0}")]
    Aggregate(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                 |
    /// |------|-----------------------------------------|
    /// | 0    | Success                                 |
    /// | 1    | Command or stream failure                |
    /// | 2    | Configuration error                      |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(RoadlogError::Config(_)) => 2,
            Self::Core(RoadlogError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Aggregate(_) => 1,
        }
    }
}

impl From<CorrelatorError> for CliError {
    fn from(e: CorrelatorError) -> Self {
        match e {
            CorrelatorError::Io { path, source } => Self::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
            other => Self::Core(other.into()),
        }
    }
}

impl From<PathValidatorError> for CliError {
    fn from(e: PathValidatorError) -> Self {
        match e {
            PathValidatorError::Config { .. } => Self::Config(e.to_string()),
            PathValidatorError::Io { path, source } => Self::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadlog_core::error::{ConfigError, StreamError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1, "command error should return exit code 1");
    }

    #[test]
    fn test_exit_code_aggregate_error() {
        let err = CliError::Aggregate("1 run group failed".to_owned());
        assert_eq!(err.exit_code(), 1, "aggregate error should return exit code 1");
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 1, "json serialize error should return exit code 1");
    }

    #[test]
    fn test_exit_code_core_follows_variant() {
        let config: CliError = RoadlogError::Config(ConfigError::FileNotFound {
            path: "missing.toml".to_owned(),
        })
        .into();
        assert_eq!(config.exit_code(), 2);

        let io: CliError =
            RoadlogError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).into();
        assert_eq!(io.exit_code(), 10);

        let stream: CliError = RoadlogError::Stream(StreamError::Aborted("boom".to_owned())).into();
        assert_eq!(stream.exit_code(), 1);
    }

    #[test]
    fn test_from_correlator_missing_file() {
        let err: CliError = CorrelatorError::MissingFile {
            stem: "10-5-1".to_owned(),
            path: "/data/10-5-1.xml".to_owned(),
        }
        .into();
        assert!(matches!(err, CliError::Core(RoadlogError::Stream(_))));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("10-5-1.xml"));
    }

    #[test]
    fn test_from_correlator_io_keeps_path() {
        let err: CliError = CorrelatorError::io(
            "/out/10-5.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("/out/10-5.csv"));
    }

    #[test]
    fn test_from_path_validator_errors() {
        let config: CliError = PathValidatorError::Config {
            field: "row_width".to_owned(),
            reason: "must be greater than 0, got 0".to_owned(),
        }
        .into();
        assert_eq!(config.exit_code(), 2);

        let io: CliError = PathValidatorError::Io {
            path: "run.log".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert_eq!(io.exit_code(), 10);
        assert!(io.to_string().contains("run.log"));
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = format!("{}", err);
        assert!(display_str.contains("configuration error"), "should include error context");
        assert!(display_str.contains("invalid TOML syntax"), "should include error message");
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(format!("{}", err), "execution failed");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            _ => panic!("expected Io error variant"),
        }
    }
}
