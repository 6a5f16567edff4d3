//! Error types for fhirsearch.
//!
//! The completion core itself is designed without fatal paths: malformed
//! query text always classifies to some context and missing metadata only
//! means fewer suggestions. The errors here cover the surrounding surface
//! (configuration files, capability documents, I/O) plus the single caller
//! contract the core enforces: a cursor outside the query bounds.

use std::{fmt, io};

/// Crate-wide `Result` type using [`FhirSearchError`] as the error.
pub type Result<T> = std::result::Result<T, FhirSearchError>;

/// Top-level error type for fhirsearch operations.
#[derive(Debug)]
pub enum FhirSearchError {
    /// Cursor position handed to `apply` lies outside `[0, query.len()]`.
    CursorOutOfRange {
        /// Offending cursor position.
        cursor: usize,
        /// Length of the query it was applied to.
        len: usize,
    },

    /// Configuration errors.
    Config(ConfigError),

    /// Capability statement errors.
    Capability(CapabilityError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Capability-statement-specific errors.
#[derive(Debug)]
pub enum CapabilityError {
    /// The document is not a parseable CapabilityStatement.
    InvalidDocument(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for FhirSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FhirSearchError::CursorOutOfRange { cursor, len } => {
                write!(f, "Cursor position {cursor} out of range for query of length {len}")
            }
            FhirSearchError::Config(e) => write!(f, "Configuration error: {e}"),
            FhirSearchError::Capability(e) => write!(f, "Capability error: {e}"),
            FhirSearchError::Io(e) => write!(f, "I/O error: {e}"),
            FhirSearchError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::InvalidDocument(msg) => {
                write!(f, "Invalid capability statement: {msg}")
            }
        }
    }
}

impl std::error::Error for FhirSearchError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CapabilityError {}

/* ==================== Conversions to FhirSearchError ==================== */

impl From<io::Error> for FhirSearchError {
    fn from(err: io::Error) -> Self {
        FhirSearchError::Io(err)
    }
}

impl From<ConfigError> for FhirSearchError {
    fn from(err: ConfigError) -> Self {
        FhirSearchError::Config(err)
    }
}

impl From<CapabilityError> for FhirSearchError {
    fn from(err: CapabilityError) -> Self {
        FhirSearchError::Capability(err)
    }
}

impl From<String> for FhirSearchError {
    fn from(msg: String) -> Self {
        FhirSearchError::Generic(msg)
    }
}

impl From<&str> for FhirSearchError {
    fn from(msg: &str) -> Self {
        FhirSearchError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_out_of_range_display() {
        let err = FhirSearchError::CursorOutOfRange { cursor: 12, len: 5 };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn config_error_wraps() {
        let err: FhirSearchError = ConfigError::FileNotFound("/tmp/x.toml".to_string()).into();
        assert!(err.to_string().contains("/tmp/x.toml"));
    }

    #[test]
    fn capability_error_wraps() {
        let err: FhirSearchError =
            CapabilityError::InvalidDocument("not json".to_string()).into();
        assert!(err.to_string().contains("not json"));
    }
}
