//! Multi-URL aggregation.
//!
//! Cache and queue URLs may list several endpoints separated by commas:
//!
//! ```text
//! redis://cache-a:6379/0,redis://cache-b:6379/0
//! ```
//!
//! Each URL runs through the handler on its own. The results are folded into
//! one mapping: the first backend wins, every location is collected in input
//! order, and the remaining keys are merged with the first value winning.

use tracing::debug;

use crate::config::{ConfigMap, ConfigValue};
use crate::error::UrlResult;
use crate::options::HandlerOptions;
use crate::parser::parse;
use crate::registry::UrlHandler;

/// Key used for collected locations when the handler names none.
pub const DEFAULT_LOCATION_KEY: &str = "LOCATION";

/// Split a raw string into sub-URLs.
///
/// A comma-separated piece without `://` belongs to the previous URL, so node
/// lists (`redis://h1,h2/0`) and query values containing commas stay intact.
pub fn split_urls(raw: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for part in raw.trim().split(',') {
        match segments.last_mut() {
            Some(last) if !part.contains("://") => {
                last.push(',');
                last.push_str(part);
            }
            _ => segments.push(part.trim().to_string()),
        }
    }
    segments.retain(|s| !s.is_empty());
    segments
}

/// Run `handler` over every URL in `raw` and fold the results.
pub fn aggregate<H>(raw: &str, handler: &H, opts: &HandlerOptions) -> UrlResult<ConfigMap>
where
    H: UrlHandler + ?Sized,
{
    let segments = split_urls(raw);
    if segments.len() <= 1 {
        let url = parse(segments.first().map_or(raw, String::as_str))?;
        return handler.handle(&url, opts);
    }

    debug!(
        domain = %handler.domain(),
        count = segments.len(),
        "Aggregating URLs"
    );

    let backend_key = handler.backend_key();
    let location_key = handler.location_key().unwrap_or(DEFAULT_LOCATION_KEY);

    let mut backend: Option<ConfigValue> = None;
    let mut locations: Vec<ConfigValue> = Vec::with_capacity(segments.len());
    let mut rest = ConfigMap::new();

    for segment in &segments {
        let url = parse(segment)?;
        let mut config = handler.handle(&url, opts)?;

        if let Some(value) = config.remove(backend_key) {
            if backend.is_none() {
                backend = Some(value);
            }
        }

        match config.remove(location_key) {
            Some(ConfigValue::List(items)) => locations.extend(items),
            Some(value) => locations.push(value),
            None => locations.push(ConfigValue::Str(url.to_url())),
        }

        for (key, value) in config {
            if !rest.contains_key(&key) {
                rest.set(key, value);
            }
        }
    }

    let mut merged = ConfigMap::new();
    merged.set_opt(backend_key, backend);
    if locations.len() == 1 {
        merged.set(location_key, locations.remove(0));
    } else {
        merged.set(location_key, locations);
    }
    merged.merge(rest);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{CacheHandler, QueueHandler};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_urls() {
        assert_eq!(
            split_urls("redis://a:6379/0,redis://b:6379/0"),
            vec!["redis://a:6379/0", "redis://b:6379/0"]
        );
        assert_eq!(split_urls("redis://a:6379,b:6379/0"), vec!["redis://a:6379,b:6379/0"]);
        assert_eq!(
            split_urls("memcache://a:11211?servers=x,y, redis://c"),
            vec!["memcache://a:11211?servers=x,y", "redis://c"]
        );
        assert!(split_urls("  ").is_empty());
    }

    #[test]
    fn test_aggregate_hoists_backend_and_collects_locations() {
        let config = aggregate(
            "redis://a:6379/0?timeout=10,redis://b:6379/0?timeout=20",
            &CacheHandler,
            &HandlerOptions::default(),
        )
        .unwrap();

        assert_eq!(
            config.get_str("BACKEND"),
            Some("django.core.cache.backends.redis.RedisCache")
        );
        assert_eq!(
            config.get("LOCATION"),
            Some(&ConfigValue::from(vec!["redis://a:6379/0", "redis://b:6379/0"]))
        );
        // first value wins
        assert_eq!(config.get_int("TIMEOUT"), Some(10));
        assert_eq!(config.keys().next(), Some("BACKEND"));
    }

    #[test]
    fn test_aggregate_flattens_node_lists() {
        let config = aggregate(
            "redis://a:6379,b:6379/0,redis://c:6379/0",
            &CacheHandler,
            &HandlerOptions::default(),
        )
        .unwrap();
        assert_eq!(
            config.get("LOCATION"),
            Some(&ConfigValue::from(vec![
                "redis://a:6379/0",
                "redis://b:6379/0",
                "redis://c:6379/0",
            ]))
        );
    }

    #[test]
    fn test_aggregate_single_url_is_scalar() {
        let config = aggregate(
            "memcache://localhost:11211",
            &CacheHandler,
            &HandlerOptions::default(),
        )
        .unwrap();
        assert_eq!(config.get_str("LOCATION"), Some("localhost:11211"));
    }

    #[test]
    fn test_aggregate_uses_handler_location_key() {
        let config = aggregate(
            "redis://q1:6379/0,redis://q2:6379/0",
            &QueueHandler,
            &HandlerOptions::default(),
        )
        .unwrap();
        assert!(config.contains_key("QUEUE_BACKEND"));
        assert_eq!(
            config.get("QUEUE_LOCATION"),
            Some(&ConfigValue::from(vec!["redis://q1:6379/0", "redis://q2:6379/0"]))
        );
    }

    #[test]
    fn test_aggregate_propagates_unknown_scheme() {
        let err = aggregate(
            "redis://a:6379/0,nosql://b",
            &CacheHandler,
            &HandlerOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_unknown_scheme());
    }
}
