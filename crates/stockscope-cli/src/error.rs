use stockscope_core::{CoreError, DirectoryError, SourceError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] DirectoryError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("command error: {0}")]
    Command(String),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Source(error) => Self::Source(error),
            CoreError::Lookup(error) => Self::Lookup(error),
            CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Lookup(DirectoryError::Io { .. }) => 10,
            Self::Lookup(_) => 2,
            Self::Source(_) => 3,
            Self::StrictModeViolation { .. } => 5,
            Self::Command(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        let not_found = CliError::from(DirectoryError::NotFound {
            exchange: String::from("NYSE"),
            name: String::from("Nobody Inc."),
        });
        assert_eq!(not_found.exit_code(), 2);

        let upstream = CliError::from(CoreError::Source(SourceError::unavailable("down")));
        assert_eq!(upstream.exit_code(), 3);

        let strict = CliError::StrictModeViolation {
            warning_count: 1,
            error_count: 0,
        };
        assert_eq!(strict.exit_code(), 5);
    }
}
