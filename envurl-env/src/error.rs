//! Error types for environment access.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use std::path::PathBuf;

use envurl_core::UrlError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for environment operations.
pub type EnvResult<T> = Result<T, EnvError>;

/// Errors raised while reading variables, `.env` files or settings files.
#[derive(Error, Debug, Diagnostic)]
pub enum EnvError {
    /// A required variable is not set and has no default.
    #[error("Environment variable '{0}' is not set")]
    #[diagnostic(
        code(envurl::env::missing_variable),
        help("set the variable, add it to your .env file or provide a default")
    )]
    MissingVariable(String),

    /// A variable is set but cannot be converted to the requested type.
    #[error("Invalid value for '{var}': {message}")]
    #[diagnostic(code(envurl::env::invalid_value))]
    InvalidValue { var: String, message: String },

    /// A file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    #[diagnostic(code(envurl::env::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `.env` file could not be parsed.
    #[error("Invalid .env file: {0}")]
    #[diagnostic(code(envurl::env::dotenv))]
    DotEnv(#[from] dotenvy::Error),

    /// A settings file could not be parsed.
    #[error("Invalid settings: {0}")]
    #[diagnostic(code(envurl::env::settings))]
    Settings(String),

    /// The variable held a URL that could not be converted.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Url(#[from] UrlError),
}

impl EnvError {
    /// Create an invalid value error.
    pub fn invalid_value(var: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            var: var.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a missing variable error.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingVariable(_))
    }
}

impl From<toml::de::Error> for EnvError {
    fn from(err: toml::de::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EnvError::MissingVariable("DATABASE_URL".into());
        assert_eq!(err.to_string(), "Environment variable 'DATABASE_URL' is not set");
        assert!(err.is_missing());

        let err = EnvError::invalid_value("PORT", "expected an integer, got 'abc'");
        assert_eq!(err.to_string(), "Invalid value for 'PORT': expected an integer, got 'abc'");
    }

    #[test]
    fn test_url_error_is_transparent() {
        let err = EnvError::from(UrlError::malformed("x", "missing scheme"));
        assert_eq!(err.to_string(), "Malformed URL 'x': missing scheme");
        assert!(!err.is_missing());
    }
}
