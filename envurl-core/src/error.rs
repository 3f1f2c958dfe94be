//! Error types for URL normalization and scheme dispatch.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use crate::registry::Domain;

/// Result type for URL operations.
pub type UrlResult<T> = Result<T, UrlError>;

/// Errors that can occur while turning a URL into settings.
///
/// None of these are transient: parsing is deterministic, so callers are
/// expected to fix the configuration or pass an explicit backend instead of
/// retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum UrlError {
    /// The string could not be split into a scheme and a host or path.
    #[error("Malformed URL '{url}': {message}")]
    #[diagnostic(code(envurl::url::malformed))]
    MalformedUrl { url: String, message: String },

    /// The scheme is not in the domain's registry and no override was given.
    #[error("Unknown {domain} scheme: {scheme}")]
    #[diagnostic(
        code(envurl::url::unknown_scheme),
        help("pass an explicit backend or use one of the registered schemes")
    )]
    UnknownScheme { domain: Domain, scheme: String },

    /// A scheme needs a URL component that is absent.
    #[error("Missing {field} in {domain} URL")]
    #[diagnostic(code(envurl::url::missing_field))]
    MissingField { domain: Domain, field: &'static str },

    /// An option value could not be interpreted.
    #[error("Invalid option '{key}': {message}")]
    #[diagnostic(code(envurl::url::invalid_option))]
    InvalidOption { key: String, message: String },

    /// No handler is registered under this name.
    #[error("No URL handler registered for '{0}'")]
    #[diagnostic(code(envurl::registry::unknown_handler))]
    UnknownHandler(String),
}

impl UrlError {
    /// Create a malformed URL error.
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an unknown scheme error.
    pub fn unknown_scheme(domain: Domain, scheme: impl Into<String>) -> Self {
        Self::UnknownScheme {
            domain,
            scheme: scheme.into(),
        }
    }

    /// Check if this is an unknown scheme error.
    pub fn is_unknown_scheme(&self) -> bool {
        matches!(self, Self::UnknownScheme { .. })
    }

    /// Check if this is a malformed URL error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedUrl { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scheme_message_names_domain() {
        let err = UrlError::unknown_scheme(Domain::Cache, "nosql");
        assert_eq!(err.to_string(), "Unknown cache scheme: nosql");
        assert!(err.is_unknown_scheme());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_malformed_message() {
        let err = UrlError::malformed("nohost", "missing scheme");
        assert_eq!(err.to_string(), "Malformed URL 'nohost': missing scheme");
        assert!(err.is_malformed());
    }

    #[test]
    fn test_diagnostic_code() {
        let err = UrlError::UnknownHandler("tasks_url".into());
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("envurl::registry::unknown_handler"));
    }
}
