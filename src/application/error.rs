use thiserror::Error;

use crate::{
    application::{indexer::IndexError, replay::ReplayError},
    config::LoadError,
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Errors surfaced at the command-line edge.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status: `2` for bad input, `1` for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_)
            | AppError::Domain(DomainError::Validation { .. })
            | AppError::Config(LoadError::Invalid { .. })
            | AppError::Index(_)
            | AppError::Replay(ReplayError::Parse(_) | ReplayError::Index { .. }) => 2,
            AppError::Config(LoadError::Build(_)) | AppError::Infra(_) | AppError::Unexpected(_) => {
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_exit_with_usage_status() {
        assert_eq!(AppError::validation("bad").exit_code(), 2);
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("parse");
        assert_eq!(AppError::from(ReplayError::Parse(parse)).exit_code(), 2);
    }

    #[test]
    fn invalid_configuration_values_exit_with_usage_status() {
        let err = AppError::from(LoadError::Invalid {
            key: "tracker.trigger_distance_px",
            reason: "must not be negative".to_string(),
        });

        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "invalid configuration for `tracker.trigger_distance_px`: must not be negative"
        );
    }

    #[test]
    fn infrastructure_errors_exit_with_failure_status() {
        let err = AppError::from(InfraError::telemetry("subscriber already set"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "telemetry initialization failed: subscriber already set"
        );
    }
}
