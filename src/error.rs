//! Error types for clusterup operations.
//!
//! This module defines [`ClusterupError`], the primary error type used
//! throughout the orchestrator, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration and prerequisite errors are fatal and stop the run before
//!   any step executes
//! - Step failures are not errors: they are absorbed into
//!   [`crate::steps::StepResult`] and the run continues
//! - Report persistence failures are logged, never propagated
//! - Use `anyhow::Error` (via `ClusterupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for clusterup operations.
#[derive(Debug, Error)]
pub enum ClusterupError {
    /// No configuration existed; a template was written to `path`.
    #[error("Configuration not found: a template was written to {path}; fill it in and re-run")]
    ConfigurationMissing { path: PathBuf },

    /// A required configuration key is missing or empty.
    #[error("Invalid configuration: '{key}' {reason}")]
    ConfigurationInvalid { key: String, reason: String },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Two pipeline entries share a name.
    #[error("Duplicate step name in pipeline: {name}")]
    DuplicateStep { name: String },

    /// A step named on the command line is not in the pipeline.
    #[error("Unknown step: {name}")]
    UnknownStep { name: String },

    /// One or more prerequisites are not satisfied.
    #[error("Unsatisfied prerequisites: {}", .failures.join(", "))]
    PrerequisiteUnsatisfied { failures: Vec<String> },

    /// A collaborator could not be launched or waited on.
    #[error("Failed to run '{command}': {message}")]
    CommandFailed { command: String, message: String },

    /// The run report could not be written.
    #[error("Failed to write report to {path}: {message}")]
    ReportPersistenceFailure { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClusterupError {
    /// Shorthand for a missing or empty required key.
    pub fn missing_key(key: &str) -> Self {
        Self::ConfigurationInvalid {
            key: key.to_string(),
            reason: "is required but missing or empty".to_string(),
        }
    }

    /// Whether this error comes from loading or validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing { .. }
                | Self::ConfigurationInvalid { .. }
                | Self::ConfigParseError { .. }
                | Self::DuplicateStep { .. }
                | Self::UnknownStep { .. }
        )
    }
}

/// Result type alias for clusterup operations.
pub type Result<T> = std::result::Result<T, ClusterupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_missing_displays_path() {
        let err = ClusterupError::ConfigurationMissing {
            path: PathBuf::from("/srv/clusterup.yml"),
        };
        assert!(err.to_string().contains("/srv/clusterup.yml"));
    }

    #[test]
    fn configuration_invalid_names_key() {
        let err = ClusterupError::missing_key("cluster.name");
        let msg = err.to_string();
        assert!(msg.contains("cluster.name"));
        assert!(msg.contains("missing or empty"));
    }

    #[test]
    fn prerequisite_unsatisfied_lists_every_failure() {
        let err = ClusterupError::PrerequisiteUnsatisfied {
            failures: vec!["tool:kubectl".into(), "session".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unsatisfied prerequisites: tool:kubectl, session"
        );
    }

    #[test]
    fn command_failed_displays_command_and_reason() {
        let err = ClusterupError::CommandFailed {
            command: "scripts/create-cluster.sh".into(),
            message: "No such file or directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("scripts/create-cluster.sh"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(ClusterupError::missing_key("x").is_configuration());
        assert!(ClusterupError::UnknownStep { name: "x".into() }.is_configuration());
        assert!(!ClusterupError::PrerequisiteUnsatisfied { failures: vec![] }.is_configuration());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ClusterupError = io_err.into();
        assert!(matches!(err, ClusterupError::Io(_)));
    }
}
