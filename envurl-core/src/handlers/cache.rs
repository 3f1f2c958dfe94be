//! `CACHE_URL` handler.

use tracing::debug;

use crate::config::{ConfigMap, ConfigValue};
use crate::error::UrlResult;
use crate::handlers::{coerce_strings, hoist, merged_options, node_urls, scalar_or_list};
use crate::options::HandlerOptions;
use crate::parser::ParsedUrl;
use crate::registry::{Domain, SchemeEntry, UrlHandler, resolve_backend};

/// Django's built-in Redis cache.
pub const REDIS_CACHE: &str = "django.core.cache.backends.redis.RedisCache";
/// Django's local-memory cache.
pub const LOCMEM_CACHE: &str = "django.core.cache.backends.locmem.LocMemCache";

/// Socket used for `redis://unix` without a path.
pub const DEFAULT_REDIS_SOCKET: &str = "/tmp/redis.sock";

/// Cache scheme registry.
pub static SCHEMES: &[SchemeEntry] = &[
    SchemeEntry::new("dbcache", "django.core.cache.backends.db.DatabaseCache"),
    SchemeEntry::new("dummycache", "django.core.cache.backends.dummy.DummyCache"),
    SchemeEntry::new("filecache", "django.core.cache.backends.filebased.FileBasedCache"),
    SchemeEntry::new("locmem", LOCMEM_CACHE),
    SchemeEntry::new("locmemcache", LOCMEM_CACHE),
    SchemeEntry::new("memcache", "django.core.cache.backends.memcached.MemcachedCache"),
    SchemeEntry::new("pymemcache", "django.core.cache.backends.memcached.PyLibMCCache"),
    SchemeEntry::new("redis", REDIS_CACHE),
    SchemeEntry::new("rediss", REDIS_CACHE),
    SchemeEntry::new("rediscache", REDIS_CACHE),
];

/// Options that belong at the top level of a cache entry.
pub const TOP_LEVEL_OPTIONS: &[&str] = &["TIMEOUT", "KEY_PREFIX", "VERSION", "KEY_FUNCTION", "BINARY"];

/// Handler for cache URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheHandler;

impl UrlHandler for CacheHandler {
    fn domain(&self) -> Domain {
        Domain::Cache
    }

    fn schemes(&self) -> &'static [SchemeEntry] {
        SCHEMES
    }

    fn backend_key(&self) -> &'static str {
        "BACKEND"
    }

    fn location_key(&self) -> Option<&'static str> {
        Some("LOCATION")
    }

    fn aggregates(&self) -> bool {
        true
    }

    fn handle(&self, url: &ParsedUrl, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
        let backend = resolve_backend(Domain::Cache, SCHEMES, &url.scheme, opts.backend_override())?;

        let mut config = ConfigMap::new();
        config.set_opt("BACKEND", backend);
        config.set_opt("LOCATION", location(url));

        let options = coerce_strings(merged_options(url, opts), ConfigValue::number_or_str);
        let options = hoist(options, TOP_LEVEL_OPTIONS, &mut config);
        config.set("OPTIONS", options);

        debug!(scheme = %url.scheme, nodes = url.nodes().len(), "Resolved cache settings");
        Ok(config)
    }
}

fn location(url: &ParsedUrl) -> Option<ConfigValue> {
    let has_path = !matches!(url.path.as_str(), "" | "/");
    match url.scheme.as_str() {
        "dummycache" => None,
        "filecache" => Some(ConfigValue::Str(format!(
            "{}{}",
            url.host_as_written().unwrap_or_default(),
            url.path
        ))),
        "dbcache" => {
            let table = match url.path_name() {
                "" => url.host_as_written().unwrap_or_default(),
                name => name,
            };
            Some(ConfigValue::Str(table.to_string()))
        }
        "locmem" | "locmemcache" if url.extra_hosts.is_empty() => {
            let name = url.host_as_written().unwrap_or_default();
            let path = if has_path { url.path.as_str() } else { "" };
            Some(ConfigValue::Str(format!("{}{}", name, path)))
        }
        scheme if scheme.starts_with("redis") => {
            if url.is_socket() {
                let path = if url.path.is_empty() {
                    DEFAULT_REDIS_SOCKET
                } else {
                    url.path.as_str()
                };
                return Some(ConfigValue::Str(format!("unix://{}", path)));
            }
            let scheme = scheme.replace("cache", "");
            Some(scalar_or_list(node_urls(url, &scheme)))
        }
        "unix" | "memcache" | "pymemcache" if has_path => {
            Some(ConfigValue::Str(format!("unix:{}", url.path)))
        }
        _ => Some(scalar_or_list(url.nodes())),
    }
}

/// Parse a cache URL, or a comma-separated list of cache URLs.
///
/// # Examples
///
/// ```rust
/// use envurl_core::parse_cache_url;
///
/// let config = parse_cache_url("redis://cache-a:6379/0,redis://cache-b:6379/0", None).unwrap();
/// let locations = config.get("LOCATION").and_then(|v| v.as_list()).unwrap();
/// assert_eq!(locations.len(), 2);
/// ```
pub fn parse_cache_url(raw: &str, backend: Option<&str>) -> UrlResult<ConfigMap> {
    parse_cache_url_with(raw, &HandlerOptions::from(backend))
}

/// Parse a cache URL with explicit options.
pub fn parse_cache_url_with(raw: &str, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
    CacheHandler.get_backend(raw, opts)
}
