//! Error types for schema resolution
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.
//!
//! Only failures that abort a resolution run live here. Everything that
//! degrades a run without stopping it (missing referenced files, capped
//! duplicates, depth limits) is encoded in the output document as stub or
//! error-marker nodes, never raised as an error.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for resolution operations
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Root schema file could not be read
    #[error("Failed to read root schema '{path}': {source}")]
    RootRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Root schema file is not valid JSON
    #[error("Failed to parse root schema '{path}': {reason}")]
    RootParse { path: PathBuf, reason: String },

    /// Output file could not be written
    #[error("Failed to write output '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl ResolveError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::RootRead { .. } => "ROOT_READ_ERROR",
            Self::RootParse { .. } => "ROOT_PARSE_ERROR",
            Self::OutputWrite { .. } => "OUTPUT_WRITE_ERROR",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::RootRead { .. } => vec![
                "Check that the schema file exists and you have read permissions",
                "Pass the path relative to the current directory or as an absolute path",
            ],
            Self::RootParse { .. } => vec![
                "Validate the root schema with a JSON linter",
                "Comments and trailing commas are tolerated, unbalanced braces are not",
            ],
            Self::OutputWrite { .. } => vec![
                "Check permissions and disk space for the output directory",
                "Omit --output to print the resolved document to stdout",
            ],
            Self::ConfigError { .. } => vec![
                "Check refsolve.toml for syntax errors",
                "Run 'refsolve config' to see the active settings",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for resolution operations
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        let err = ResolveError::RootParse {
            path: PathBuf::from("screen.json"),
            reason: "expected value at line 1".to_string(),
        };
        assert_eq!(err.status_code(), "ROOT_PARSE_ERROR");
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn display_includes_path() {
        let err = ResolveError::RootRead {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("missing.json"));
    }
}
