//! Per-call overrides passed to a handler.

use crate::config::{ConfigMap, ConfigValue};

/// Backend override and explicit options for a single conversion.
///
/// Explicit options win over values taken from the URL's query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerOptions {
    /// Backend identifier used instead of the scheme registry.
    pub backend: Option<String>,
    /// Explicit options.
    pub options: ConfigMap,
}

impl HandlerOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying only a backend override.
    pub fn backend(backend: impl Into<String>) -> Self {
        Self {
            backend: Some(backend.into()),
            options: ConfigMap::new(),
        }
    }

    /// Set the backend override.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Add an explicit option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.options.set(key, value);
        self
    }

    /// Replace all explicit options.
    pub fn with_options(mut self, options: ConfigMap) -> Self {
        self.options = options;
        self
    }

    /// The backend override, ignoring empty strings.
    pub fn backend_override(&self) -> Option<&str> {
        self.backend.as_deref().filter(|b| !b.is_empty())
    }
}

impl From<Option<&str>> for HandlerOptions {
    fn from(backend: Option<&str>) -> Self {
        Self {
            backend: backend.map(String::from),
            options: ConfigMap::new(),
        }
    }
}
