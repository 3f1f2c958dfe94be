//! Domains, the handler trait and the plugin registry.
//!
//! Handlers are looked up by the name of the accessor that uses them
//! (`"database_url"`, `"cache_url"`, ...). The global registry is populated
//! explicitly with the built-in handlers on first use; additional
//! handlers can be registered at runtime.
//!
//! # Examples
//!
//! ```rust
//! use envurl_core::registry::{registry, Domain};
//! use envurl_core::HandlerOptions;
//!
//! let handler = registry().for_domain(Domain::Cache).unwrap();
//! let config = handler
//!     .get_backend("redis://localhost:6379/0", &HandlerOptions::default())
//!     .unwrap();
//! assert_eq!(config.get_str("LOCATION"), Some("redis://localhost:6379/0"));
//! ```

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::config::ConfigMap;
use crate::error::{UrlError, UrlResult};
use crate::handlers::{
    CacheHandler, DatabaseHandler, EmailHandler, QueueHandler, SearchHandler, TasksHandler,
};
use crate::options::HandlerOptions;
use crate::parser::{ParsedUrl, parse};

// ============================================================================
// Domain
// ============================================================================

/// A configuration domain with its own scheme registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Relational databases (`DATABASE_URL`).
    Database,
    /// Caches (`CACHE_URL`).
    Cache,
    /// Outgoing mail (`EMAIL_URL`).
    Email,
    /// Search indexes (`SEARCH_URL`).
    Search,
    /// Message queues (`QUEUE_URL`).
    Queue,
    /// Background task backends (`TASKS_URL`).
    Tasks,
}

impl Domain {
    /// All domains in registration order.
    pub const ALL: [Domain; 6] = [
        Domain::Database,
        Domain::Cache,
        Domain::Email,
        Domain::Search,
        Domain::Queue,
        Domain::Tasks,
    ];

    /// Lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Email => "email",
            Self::Search => "search",
            Self::Queue => "queue",
            Self::Tasks => "tasks",
        }
    }

    /// Environment variable read when none is given.
    pub fn default_var(&self) -> &'static str {
        match self {
            Self::Database => "DATABASE_URL",
            Self::Cache => "CACHE_URL",
            Self::Email => "EMAIL_URL",
            Self::Search => "SEARCH_URL",
            Self::Queue => "QUEUE_URL",
            Self::Tasks => "TASKS_URL",
        }
    }

    /// Registry name of the built-in handler.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Database => "database_url",
            Self::Cache => "cache_url",
            Self::Email => "email_url",
            Self::Search => "search_url",
            Self::Queue => "queue_url",
            Self::Tasks => "tasks_url",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Domain {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "database" | "databases" | "db" | "database_url" => Ok(Self::Database),
            "cache" | "caches" | "cache_url" => Ok(Self::Cache),
            "email" | "mail" | "email_url" => Ok(Self::Email),
            "search" | "search_url" => Ok(Self::Search),
            "queue" | "queues" | "queue_url" => Ok(Self::Queue),
            "tasks" | "task" | "tasks_url" => Ok(Self::Tasks),
            _ => Err(UrlError::UnknownHandler(s.to_string())),
        }
    }
}

// ============================================================================
// Scheme tables
// ============================================================================

/// One row of a domain's scheme registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeEntry {
    /// Scheme token.
    pub scheme: &'static str,
    /// Backend identifier; `None` for schemes that configure no engine.
    pub backend: Option<&'static str>,
    /// Port used when the URL has none.
    pub default_port: Option<u16>,
}

impl SchemeEntry {
    /// A scheme mapped to a backend.
    pub const fn new(scheme: &'static str, backend: &'static str) -> Self {
        Self {
            scheme,
            backend: Some(backend),
            default_port: None,
        }
    }

    /// A scheme with no backend identifier.
    pub const fn bare(scheme: &'static str) -> Self {
        Self {
            scheme,
            backend: None,
            default_port: None,
        }
    }

    /// Set the default port.
    pub const fn port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }
}

/// Find a scheme in a registry table.
pub fn lookup(table: &'static [SchemeEntry], scheme: &str) -> Option<&'static SchemeEntry> {
    table.iter().find(|entry| entry.scheme == scheme)
}

/// Resolve the backend for a scheme, honoring an explicit override.
///
/// Returns `Ok(None)` for registered schemes without a backend identifier.
pub fn resolve_backend(
    domain: Domain,
    table: &'static [SchemeEntry],
    scheme: &str,
    backend: Option<&str>,
) -> UrlResult<Option<String>> {
    if let Some(backend) = backend.filter(|b| !b.is_empty()) {
        return Ok(Some(backend.to_string()));
    }
    match lookup(table, scheme) {
        Some(entry) => Ok(entry.backend.map(String::from)),
        None => Err(UrlError::unknown_scheme(domain, scheme)),
    }
}

// ============================================================================
// Handler trait
// ============================================================================

/// Converts a parsed URL into a settings mapping for one domain.
pub trait UrlHandler: Send + Sync {
    /// The domain this handler serves.
    fn domain(&self) -> Domain;

    /// The scheme registry.
    fn schemes(&self) -> &'static [SchemeEntry];

    /// Key that carries the backend identifier (`ENGINE`, `BACKEND`, ...).
    fn backend_key(&self) -> &'static str;

    /// Key that carries the endpoint, collected by the aggregator.
    fn location_key(&self) -> Option<&'static str> {
        None
    }

    /// Whether comma-separated URLs are accepted.
    fn aggregates(&self) -> bool {
        false
    }

    /// Environment variable read when none is given.
    fn default_var(&self) -> &'static str {
        self.domain().default_var()
    }

    /// Apply the domain's rules to one parsed URL.
    fn handle(&self, url: &ParsedUrl, opts: &HandlerOptions) -> UrlResult<ConfigMap>;

    /// Parse a raw string and apply the domain's rules.
    fn get_backend(&self, raw: &str, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
        if self.aggregates() {
            return aggregate(raw, self, opts);
        }
        let url = parse(raw)?;
        self.handle(&url, opts)
    }
}

// ============================================================================
// Plugin registry
// ============================================================================

/// Name-keyed table of URL handlers.
pub struct PluginRegistry {
    handlers: RwLock<IndexMap<String, Arc<dyn UrlHandler>>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(IndexMap::new()),
        }
    }

    /// Create a registry holding the built-in handlers.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Domain::Database.method_name(), Arc::new(DatabaseHandler));
        registry.register(Domain::Cache.method_name(), Arc::new(CacheHandler));
        registry.register(Domain::Email.method_name(), Arc::new(EmailHandler));
        registry.register(Domain::Search.method_name(), Arc::new(SearchHandler));
        registry.register(Domain::Queue.method_name(), Arc::new(QueueHandler));
        registry.register(Domain::Tasks.method_name(), Arc::new(TasksHandler));
        registry
    }

    /// Register a handler, returning the one it replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn UrlHandler>,
    ) -> Option<Arc<dyn UrlHandler>> {
        let name = name.into();
        debug!(name = %name, domain = %handler.domain(), "Registering URL handler");
        self.handlers.write().insert(name, handler)
    }

    /// Remove a handler.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn UrlHandler>> {
        self.handlers.write().shift_remove(name)
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn UrlHandler>> {
        self.handlers.read().get(name).map(Arc::clone)
    }

    /// Look up a handler by name, failing when it is absent.
    pub fn require(&self, name: &str) -> UrlResult<Arc<dyn UrlHandler>> {
        self.get(name)
            .ok_or_else(|| UrlError::UnknownHandler(name.to_string()))
    }

    /// The handler registered under the domain's method name.
    pub fn for_domain(&self, domain: Domain) -> UrlResult<Arc<dyn UrlHandler>> {
        self.require(domain.method_name())
    }

    /// Check if a handler is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.handlers.read().keys().cloned().collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

static REGISTRY: LazyLock<PluginRegistry> = LazyLock::new(PluginRegistry::with_defaults);

/// The process-wide registry, populated with the built-in handlers.
pub fn registry() -> &'static PluginRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CeleryHandler;

    static CELERY_SCHEMES: &[SchemeEntry] = &[SchemeEntry::new("celery", "workers.Celery")];

    impl UrlHandler for CeleryHandler {
        fn domain(&self) -> Domain {
            Domain::Queue
        }

        fn schemes(&self) -> &'static [SchemeEntry] {
            CELERY_SCHEMES
        }

        fn backend_key(&self) -> &'static str {
            "CELERY_BACKEND"
        }

        fn handle(&self, url: &ParsedUrl, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
            let backend = resolve_backend(
                self.domain(),
                self.schemes(),
                &url.scheme,
                opts.backend.as_deref(),
            )?;
            let mut config = ConfigMap::new();
            config.set_opt("CELERY_BACKEND", backend);
            Ok(config)
        }
    }

    #[test]
    fn test_domain_names() {
        assert_eq!(Domain::Database.to_string(), "database");
        assert_eq!(Domain::Search.default_var(), "SEARCH_URL");
        assert_eq!(Domain::Queue.method_name(), "queue_url");
        assert_eq!("caches".parse::<Domain>().unwrap(), Domain::Cache);
        assert_eq!("EMAIL".parse::<Domain>().unwrap(), Domain::Email);
        assert_eq!("tasks".parse::<Domain>().unwrap(), Domain::Tasks);
        assert_eq!(Domain::Tasks.default_var(), "TASKS_URL");
        assert!("celery".parse::<Domain>().is_err());
    }

    #[test]
    fn test_with_defaults_registers_all_domains() {
        let registry = PluginRegistry::with_defaults();
        assert_eq!(registry.len(), 6);
        for domain in Domain::ALL {
            let handler = registry.for_domain(domain).unwrap();
            assert_eq!(handler.domain(), domain);
        }
        assert_eq!(
            registry.names(),
            vec![
                "database_url",
                "cache_url",
                "email_url",
                "search_url",
                "queue_url",
                "tasks_url"
            ]
        );
    }

    #[test]
    fn test_register_custom_handler() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register("celery_url", Arc::new(CeleryHandler)).is_none());
        assert!(registry.contains("celery_url"));

        let handler = registry.require("celery_url").unwrap();
        let config = handler
            .get_backend("celery://broker", &HandlerOptions::default())
            .unwrap();
        assert_eq!(config.get_str("CELERY_BACKEND"), Some("workers.Celery"));

        assert!(registry.unregister("celery_url").is_some());
        assert!(matches!(
            registry.require("celery_url"),
            Err(UrlError::UnknownHandler(_))
        ));
    }

    #[test]
    fn test_resolve_backend() {
        let table: &'static [SchemeEntry] = CELERY_SCHEMES;
        assert_eq!(
            resolve_backend(Domain::Queue, table, "celery", None).unwrap(),
            Some("workers.Celery".to_string())
        );
        assert_eq!(
            resolve_backend(Domain::Queue, table, "other", Some("custom.Backend")).unwrap(),
            Some("custom.Backend".to_string())
        );
        let err = resolve_backend(Domain::Queue, table, "other", None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown queue scheme: other");
    }

    #[test]
    fn test_global_registry() {
        assert!(registry().contains("database_url"));
        assert!(format!("{:?}", registry()).contains("cache_url"));
    }
}
