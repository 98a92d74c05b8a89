//! Error types for diskparam.
//!
//! Every fallible operation returns `Result<T, ParamError>` instead of
//! panicking. Hard errors (validation, lookup, parse, template integrity)
//! propagate to the caller untouched; only file discovery treats absence
//! as a normal outcome.

use thiserror::Error;

/// Result type alias for diskparam operations.
pub type ParamResult<T> = Result<T, ParamError>;

/// Unified error type for all diskparam operations.
#[derive(Debug, Error)]
pub enum ParamError {
    // ===== Caller errors =====
    /// Caller-supplied argument out of contract.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// A YAML run plan failed its declared constraints.
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] validator::ValidationErrors),

    /// Key absent from both the supplied config and the simulator defaults.
    #[error("Could not find '{key}' in param or defaults")]
    KeyNotFound {
        /// The requested key.
        key: String,
    },

    // ===== Format errors =====
    /// Malformed line in a param or director file.
    #[error("Parse error on line {line}: {message} ('{content}')")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
        /// What the parser expected.
        message: String,
    },

    /// A bundled template is missing a required entry or annotation.
    #[error("Template integrity error: {message}")]
    TemplateIntegrity {
        /// Description of the defect.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Unit errors =====
    /// Conversion between units with different dimensions.
    #[error("Cannot convert '{from}' to '{to}': incompatible dimensions")]
    IncompatibleUnits {
        /// Source unit.
        from: String,
        /// Target unit.
        to: String,
    },

    /// Unit string could not be understood.
    #[error("Unit parse error: {0}")]
    UnitParse(String),

    // ===== Snapshot errors =====
    /// Snapshot file could not be decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParamError {
    /// Create a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a lookup error for `key`.
    #[must_use]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Create a parse error located at `line`.
    #[must_use]
    pub fn parse(line: usize, content: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Create a template integrity error.
    #[must_use]
    pub fn template(message: impl Into<String>) -> Self {
        Self::TemplateIntegrity {
            message: message.into(),
        }
    }

    /// Create a unit parse error.
    #[must_use]
    pub fn unit(message: impl Into<String>) -> Self {
        Self::UnitParse(message.into())
    }

    /// Create a snapshot decoding error.
    #[must_use]
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot(message.into())
    }

    /// Check if the caller passed something out of contract.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidOptions(_))
    }

    /// Check if this is a failure to read or decode a file.
    ///
    /// Discovery treats these as "file not usable" rather than fatal.
    #[must_use]
    pub const fn is_unreadable_file(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(ParamError::validation("r_orb").is_validation());
        assert!(!ParamError::key_not_found("dDelta").is_validation());
        assert!(!ParamError::template("missing").is_validation());
    }

    #[test]
    fn test_key_not_found_display() {
        let msg = ParamError::key_not_found("dKpcUnit").to_string();
        assert!(msg.contains("dKpcUnit"));
        assert!(msg.contains("defaults"));
    }

    #[test]
    fn test_parse_display_locates_line() {
        let err = ParamError::parse(7, "dDelta 0.01", "expected 'key = value'");
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("dDelta 0.01"));
        assert!(err.is_unreadable_file());
    }

    #[test]
    fn test_incompatible_units_display() {
        let err = ParamError::IncompatibleUnits {
            from: "kpc".to_string(),
            to: "Msol".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("kpc"));
        assert!(msg.contains("Msol"));
    }

    #[test]
    fn test_io_error_is_unreadable() {
        let err = ParamError::from(std::io::Error::other("gone"));
        assert!(err.is_unreadable_file());
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_template_display() {
        let msg = ParamError::template("no #sigma_max").to_string();
        assert!(msg.contains("Template integrity"));
    }

    #[test]
    fn test_error_debug() {
        let err = ParamError::validation("test");
        let debug = format!("{err:?}");
        assert!(debug.contains("Validation"));
    }
}
