//! `TASKS_URL` handler.
//!
//! Configures a background task backend. Redis URLs point at the broker,
//! database URLs name the connection alias that stores the queue, and
//! `dummy`/`immediate` need nothing but the backend:
//!
//! ```text
//! redis://broker:6379/0?QUEUES=default,emails    -> RedisBackend
//! postgres://db/default?ENQUEUE_ON_COMMIT=false  -> DatabaseBackend
//! immediate://                                   -> ImmediateBackend
//! ```

use tracing::debug;

use crate::config::{ConfigMap, ConfigValue, is_true};
use crate::error::UrlResult;
use crate::handlers::{coerce_strings, merged_options, split_list};
use crate::options::HandlerOptions;
use crate::parser::{ParsedUrl, RenderOptions, parse};
use crate::registry::{Domain, SchemeEntry, UrlHandler, resolve_backend};

/// Redis backend.
pub const REDIS_BACKEND: &str = "django_tasks.backends.RedisBackend";
/// Redis queue backend.
pub const REDIS_QUEUE_BACKEND: &str = "django_tasks.backends.RedisQueue";
/// Backend storing tasks in a database table.
pub const DATABASE_BACKEND: &str = "django_tasks.backends.database.DatabaseBackend";

/// Database alias used when the URL names none.
pub const DEFAULT_DATABASE: &str = "default";

/// Tasks scheme registry.
pub static SCHEMES: &[SchemeEntry] = &[
    SchemeEntry::new("redis", REDIS_BACKEND),
    SchemeEntry::new("redis-queue", REDIS_QUEUE_BACKEND),
    SchemeEntry::new("postgres", DATABASE_BACKEND),
    SchemeEntry::new("postgresql", DATABASE_BACKEND),
    SchemeEntry::new("mysql", DATABASE_BACKEND),
    SchemeEntry::new("sqlite", DATABASE_BACKEND),
    SchemeEntry::new("dummy", "django_tasks.backends.dummy.DummyBackend"),
    SchemeEntry::new("immediate", "django_tasks.backends.immediate.ImmediateBackend"),
];

/// Schemes that run without an endpoint and accept a bare `scheme://`.
const LOCAL_SCHEMES: &[&str] = &["dummy", "immediate"];

/// Handler for task backend URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TasksHandler;

impl UrlHandler for TasksHandler {
    fn domain(&self) -> Domain {
        Domain::Tasks
    }

    fn schemes(&self) -> &'static [SchemeEntry] {
        SCHEMES
    }

    fn backend_key(&self) -> &'static str {
        "BACKEND"
    }

    fn handle(&self, url: &ParsedUrl, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
        let backend = resolve_backend(Domain::Tasks, SCHEMES, &url.scheme, opts.backend_override())?;

        let mut config = ConfigMap::new();
        config.set_opt("BACKEND", backend);

        match url.scheme.as_str() {
            "redis" | "redis-queue" => {
                let location = if url.hostname.as_deref() == Some("unix") {
                    let path = match url.path_name() {
                        "" => "tmp/redis.sock",
                        path => path,
                    };
                    format!("unix:///{}", path)
                } else {
                    url.render(&RenderOptions::new().scheme("redis"))
                };
                config.set("URL", location);
            }
            "postgres" | "postgresql" | "mysql" | "sqlite" => {
                let alias = match url.path_name() {
                    "" => DEFAULT_DATABASE,
                    name => name,
                };
                config.set("DATABASE", alias);
                config.set("URL", url.to_url());
            }
            scheme if LOCAL_SCHEMES.contains(&scheme) => {}
            _ => {
                config.set("URL", url.to_url());
            }
        }

        let mut enqueue_on_commit = None;
        let mut queues = None;
        let mut backend_options = ConfigMap::new();
        for (key, value) in merged_options(url, opts) {
            match key.to_ascii_uppercase().as_str() {
                "ENQUEUE_ON_COMMIT" => enqueue_on_commit = Some(flag(&value)),
                "QUEUES" => queues = Some(split_list(value)),
                _ => {
                    backend_options.set(key, value);
                }
            }
        }

        if let Some(enqueue) = enqueue_on_commit {
            config.set_flag("ENQUEUE_ON_COMMIT", enqueue);
        }
        config.set_opt("QUEUES", queues);
        config.set(
            "BACKEND_OPTIONS",
            coerce_strings(backend_options, ConfigValue::number_or_str),
        );

        debug!(scheme = %url.scheme, "Resolved tasks settings");
        Ok(config)
    }

    fn get_backend(&self, raw: &str, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
        let url = match parse(raw) {
            Ok(url) => url,
            Err(err) => local_backend(raw).ok_or(err)?,
        };
        self.handle(&url, opts)
    }
}

/// `dummy://` and `immediate://` have no host or path to parse.
fn local_backend(raw: &str) -> Option<ParsedUrl> {
    let scheme = raw.trim().strip_suffix("://")?.to_ascii_lowercase();
    LOCAL_SCHEMES
        .contains(&scheme.as_str())
        .then(|| ParsedUrl::new(scheme))
}

fn flag(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Str(s) => is_true(s),
        other => other.is_truthy(),
    }
}

/// Parse a tasks URL.
///
/// # Examples
///
/// ```rust
/// use envurl_core::parse_tasks_url;
///
/// let config = parse_tasks_url("redis://broker:6379/0?QUEUES=default,emails", None).unwrap();
/// assert_eq!(config.get_str("BACKEND"), Some("django_tasks.backends.RedisBackend"));
/// assert_eq!(config.get_str("URL"), Some("redis://broker:6379/0"));
/// ```
pub fn parse_tasks_url(raw: &str, backend: Option<&str>) -> UrlResult<ConfigMap> {
    parse_tasks_url_with(raw, &HandlerOptions::from(backend))
}

/// Parse a tasks URL with explicit options.
pub fn parse_tasks_url_with(raw: &str, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
    TasksHandler.get_backend(raw, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tasks(raw: &str) -> ConfigMap {
        parse_tasks_url(raw, None).unwrap()
    }

    #[test]
    fn test_redis() {
        let config = tasks("redis://:secret@broker:6379/0");
        let expected: ConfigMap = [
            ("BACKEND", ConfigValue::from(REDIS_BACKEND)),
            ("URL", ConfigValue::from("redis://:secret@broker:6379/0")),
        ]
        .into_iter()
        .collect();
        assert_eq!(config, expected);
    }

    #[test]
    fn test_redis_queue_renders_redis_url() {
        let config = tasks("redis-queue://broker/1");
        assert_eq!(config.get_str("BACKEND"), Some(REDIS_QUEUE_BACKEND));
        assert_eq!(config.get_str("URL"), Some("redis://broker/1"));
    }

    #[test]
    fn test_redis_unix_socket() {
        assert_eq!(
            tasks("redis://unix/var/run/redis.sock").get_str("URL"),
            Some("unix:///var/run/redis.sock")
        );
        assert_eq!(
            tasks("redis-queue://unix").get_str("URL"),
            Some("unix:///tmp/redis.sock")
        );
    }

    #[test]
    fn test_database_alias() {
        let config = tasks("postgres://app:pw@db:5432/tasks");
        assert_eq!(config.get_str("BACKEND"), Some(DATABASE_BACKEND));
        assert_eq!(config.get_str("DATABASE"), Some("tasks"));
        assert_eq!(config.get_str("URL"), Some("postgres://app:pw@db:5432/tasks"));

        let config = tasks("mysql://db");
        assert_eq!(config.get_str("DATABASE"), Some(DEFAULT_DATABASE));
    }

    #[test]
    fn test_local_backends() {
        for (raw, backend) in [
            ("dummy://", "django_tasks.backends.dummy.DummyBackend"),
            ("immediate://", "django_tasks.backends.immediate.ImmediateBackend"),
            ("Immediate://localhost", "django_tasks.backends.immediate.ImmediateBackend"),
        ] {
            let config = tasks(raw);
            assert_eq!(config.get_str("BACKEND"), Some(backend), "{raw}");
            assert_eq!(config.len(), 1, "{raw}");
        }
        assert!(parse_tasks_url("redis://", None).unwrap_err().is_malformed());
    }

    #[test]
    fn test_enqueue_queues_and_backend_options() {
        let config = tasks(
            "redis://broker/0?enqueue_on_commit=false&QUEUES=default, emails&result_ttl=3600&prefix=app",
        );
        assert_eq!(config.get_bool("ENQUEUE_ON_COMMIT"), Some(false));
        assert_eq!(
            config.get("QUEUES"),
            Some(&ConfigValue::from(vec!["default", "emails"]))
        );
        let options = config.get_map("BACKEND_OPTIONS").unwrap();
        assert_eq!(options.get_int("result_ttl"), Some(3600));
        assert_eq!(options.get_str("prefix"), Some("app"));
        assert!(!options.contains_key("QUEUES"));

        let config = tasks("sqlite:///jobs.sqlite3?ENQUEUE_ON_COMMIT=1");
        assert_eq!(config.get_bool("ENQUEUE_ON_COMMIT"), Some(true));
        assert!(!config.contains_key("BACKEND_OPTIONS"));
    }

    #[test]
    fn test_explicit_options_win() {
        let opts = HandlerOptions::new().with_option("ENQUEUE_ON_COMMIT", true);
        let config =
            parse_tasks_url_with("postgres://db/default?ENQUEUE_ON_COMMIT=no", &opts).unwrap();
        assert_eq!(config.get_bool("ENQUEUE_ON_COMMIT"), Some(true));
    }

    #[test]
    fn test_backend_override_and_unknown_scheme() {
        let config = parse_tasks_url("celery://broker:5672", Some("my.CeleryBackend")).unwrap();
        assert_eq!(config.get_str("BACKEND"), Some("my.CeleryBackend"));
        assert_eq!(config.get_str("URL"), Some("celery://broker:5672"));

        let err = parse_tasks_url("celery://broker", None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tasks scheme: celery");
    }

    #[test]
    fn test_every_scheme_resolves() {
        for entry in SCHEMES {
            let config = tasks(&format!("{}://host/name", entry.scheme));
            assert_eq!(config.get_str("BACKEND"), entry.backend);
        }
    }
}
