//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - the run completed and the output is fully resolved
//! - `1`: General error - unspecified failure
//! - `3`: Degraded - the run completed but the output contains stubs or
//!   error markers (or an entity was not found)
//! - `4`: Parse error
//! - `5`: File I/O error
//! - `6`: Configuration error

use crate::error::ResolveError;

/// Standard exit codes for CLI operations.
///
/// These codes follow Unix conventions where 0 indicates success,
/// and non-zero values indicate various error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Run completed but degraded, or entity not found (code 3)
    Degraded = 3,

    /// Failed to parse a schema file (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for a completed resolution run.
    ///
    /// A run that produced any stub or error marker is reported as degraded
    /// so scripts can distinguish "resolved cleanly" from "resolved with
    /// placeholders" without parsing the output document.
    pub fn from_clean_flag(clean: bool) -> Self {
        if clean {
            ExitCode::Success
        } else {
            ExitCode::Degraded
        }
    }

    /// Convert a `ResolveError` to the appropriate exit code.
    ///
    /// Maps specific error types to semantic exit codes that scripts
    /// can use to determine appropriate recovery actions.
    pub fn from_error(error: &ResolveError) -> Self {
        match error {
            ResolveError::RootRead { .. } | ResolveError::OutputWrite { .. } => ExitCode::IoError,
            ResolveError::RootParse { .. } => ExitCode::ParseError,
            ResolveError::ConfigError { .. } => ExitCode::ConfigError,
            ResolveError::General(_) => ExitCode::GeneralError,
        }
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success as u8, 0);
        assert_eq!(ExitCode::GeneralError as u8, 1);
        assert_eq!(ExitCode::Degraded as u8, 3);
        assert_eq!(ExitCode::ConfigError as u8, 6);
    }

    #[test]
    fn test_from_clean_flag() {
        assert_eq!(ExitCode::from_clean_flag(true), ExitCode::Success);
        assert_eq!(ExitCode::from_clean_flag(false), ExitCode::Degraded);
    }

    #[test]
    fn test_from_error() {
        let parse = ResolveError::RootParse {
            path: PathBuf::from("a.json"),
            reason: "bad".to_string(),
        };
        assert_eq!(ExitCode::from_error(&parse), ExitCode::ParseError);

        let config = ResolveError::ConfigError {
            reason: "bad".to_string(),
        };
        assert_eq!(ExitCode::from_error(&config), ExitCode::ConfigError);
    }

    #[test]
    fn test_is_success() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::Degraded.is_success());
        assert!(!ExitCode::GeneralError.is_success());
    }
}
