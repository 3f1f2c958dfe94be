//! CLI error types and result alias.

use envurl_core::UrlError;
use envurl_env::EnvError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(envurl::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(envurl::config))]
    Config(String),

    /// URL conversion error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Url(#[from] UrlError),

    /// Environment error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Env(#[from] EnvError),

    /// Output error
    #[error("Output error: {0}")]
    #[diagnostic(code(envurl::output))]
    Output(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(format!("Failed to serialize JSON: {}", err))
    }
}
