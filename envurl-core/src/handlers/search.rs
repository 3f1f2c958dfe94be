//! `SEARCH_URL` handler for Haystack-style search backends.

use tracing::{debug, warn};

use crate::config::{ConfigMap, ConfigValue, is_true};
use crate::error::{UrlError, UrlResult};
use crate::handlers::{merged_options, split_list};
use crate::options::HandlerOptions;
use crate::parser::{DEFAULT_SCHEME, ParsedUrl, RenderOptions};
use crate::registry::{Domain, SchemeEntry, UrlHandler, resolve_backend};

/// Search scheme registry. The `dsl` variants configure a client, not an engine.
pub static SCHEMES: &[SchemeEntry] = &[
    SchemeEntry::new(
        "elasticsearch",
        "haystack.backends.elasticsearch_backend.ElasticsearchSearchEngine",
    ),
    SchemeEntry::new(
        "elasticsearch2",
        "haystack.backends.elasticsearch2_backend.Elasticsearch2SearchEngine",
    ),
    SchemeEntry::bare("elasticsearch+dsl"),
    SchemeEntry::bare("elasticsearch-dsl"),
    SchemeEntry::new("solr", "haystack.backends.solr_backend.SolrEngine"),
    SchemeEntry::new("whoosh", "haystack.backends.whoosh_backend.WhooshEngine"),
    SchemeEntry::new("xapian", "haystack.backends.xapian_backend.XapianEngine"),
    SchemeEntry::new("simple", "haystack.backends.simple_backend.SimpleEngine"),
];

/// Handler for search URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchHandler;

impl UrlHandler for SearchHandler {
    fn domain(&self) -> Domain {
        Domain::Search
    }

    fn schemes(&self) -> &'static [SchemeEntry] {
        SCHEMES
    }

    fn backend_key(&self) -> &'static str {
        "ENGINE"
    }

    fn handle(&self, url: &ParsedUrl, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
        let engine = resolve_backend(Domain::Search, SCHEMES, &url.scheme, opts.backend_override())?;

        let mut config = ConfigMap::new();
        config.set_opt("ENGINE", engine);

        let mut params = merged_options(url, opts);
        let url_scheme = params
            .remove("SCHEME")
            .map(|s| s.to_plain_string())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string());

        if let Some(value) = params.remove("EXCLUDED_INDEXES") {
            config.set("EXCLUDED_INDEXES", split_list(value));
        }
        if let Some(value) = params.remove("INCLUDE_SPELLING") {
            config.set("INCLUDE_SPELLING", as_bool(value));
        }
        if let Some(value) = params.remove("BATCH_SIZE") {
            config.set("BATCH_SIZE", as_int("BATCH_SIZE", value)?);
        }

        let scheme = url.scheme.as_str();
        if scheme == "simple" {
            if !params.is_empty() {
                warn!(keys = ?params.keys().collect::<Vec<_>>(), "Ignoring options for simple search backend");
            }
            return Ok(config);
        }

        let name = url.path_name().trim_end_matches('/');
        let base = RenderOptions::new().scheme(&url_scheme).no_path();

        match scheme {
            "elasticsearch+dsl" | "elasticsearch-dsl" => {
                config.set("hosts", url.render(&base));
            }
            "solr" => {
                let path = if name.is_empty() { String::new() } else { format!("/{}", name) };
                config.set("URL", url.render(&base.path(&path)));
                config.set("NAME", name);
                take_str(&mut params, &mut config, "KWARGS");
                take_int(&mut params, &mut config, "TIMEOUT")?;
            }
            "whoosh" | "xapian" => {
                config.set("NAME", format!("/{}", name));
                if scheme == "whoosh" {
                    take_str(&mut params, &mut config, "STORAGE");
                    take_int(&mut params, &mut config, "POST_LIMIT")?;
                } else {
                    take_str(&mut params, &mut config, "FLAGS");
                }
            }
            // elasticsearch, elasticsearch2 and overridden engines
            _ => {
                let (prefix, index) = match name.rsplit_once('/') {
                    Some((prefix, index)) => (prefix, index),
                    None => ("", name),
                };
                let path = if prefix.is_empty() { String::new() } else { format!("/{}", prefix) };
                config.set("URL", url.render(&base.path(&path)));
                config.set("NAME", prefix);
                config.set("INDEX_NAME", index);
                take_str(&mut params, &mut config, "INDEX_NAME");
                take_str(&mut params, &mut config, "KWARGS");
                take_int(&mut params, &mut config, "TIMEOUT")?;
            }
        }

        // explicit options nobody consumed are passed through
        for (key, value) in params {
            if opts.options.contains_key(&key) {
                config.set(key.to_ascii_uppercase(), value);
            } else {
                debug!(key = %key, "Ignoring search query parameter");
            }
        }

        debug!(scheme = %url.scheme, "Resolved search settings");
        Ok(config)
    }
}

fn take_str(params: &mut ConfigMap, config: &mut ConfigMap, key: &str) {
    if let Some(value) = params.remove(key) {
        config.set(key, value);
    }
}

fn take_int(params: &mut ConfigMap, config: &mut ConfigMap, key: &str) -> UrlResult<()> {
    if let Some(value) = params.remove(key) {
        config.set(key, as_int(key, value)?);
    }
    Ok(())
}

fn as_int(key: &str, value: ConfigValue) -> UrlResult<ConfigValue> {
    match value {
        ConfigValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(ConfigValue::Int)
            .map_err(|_| UrlError::InvalidOption {
                key: key.to_string(),
                message: format!("expected an integer, got '{}'", s),
            }),
        other => Ok(other),
    }
}

fn as_bool(value: ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Str(s) => ConfigValue::Bool(is_true(&s)),
        other => other,
    }
}

/// Parse a search URL.
///
/// # Examples
///
/// ```rust
/// use envurl_core::parse_search_url;
///
/// let config = parse_search_url("elasticsearch://127.0.0.1:9200/index?SCHEME=http", None).unwrap();
/// assert_eq!(config.get_str("URL"), Some("http://127.0.0.1:9200"));
/// assert_eq!(config.get_str("INDEX_NAME"), Some("index"));
/// ```
pub fn parse_search_url(raw: &str, engine: Option<&str>) -> UrlResult<ConfigMap> {
    parse_search_url_with(raw, &HandlerOptions::from(engine))
}

/// Parse a search URL with explicit options.
pub fn parse_search_url_with(raw: &str, opts: &HandlerOptions) -> UrlResult<ConfigMap> {
    SearchHandler.get_backend(raw, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn search(raw: &str) -> ConfigMap {
        parse_search_url(raw, None).unwrap()
    }

    #[test]
    fn test_elasticsearch_index() {
        let config = search("elasticsearch://127.0.0.1:9200/index?SCHEME=http");
        assert_eq!(
            config.get_str("ENGINE"),
            Some("haystack.backends.elasticsearch_backend.ElasticsearchSearchEngine")
        );
        assert_eq!(config.get_str("URL"), Some("http://127.0.0.1:9200"));
        assert_eq!(config.get_str("INDEX_NAME"), Some("index"));
        assert!(!config.contains_key("NAME"));
    }

    #[test]
    fn test_elasticsearch_nested_path() {
        let config = search("elasticsearch://host:9200/myindex/seg");
        assert_eq!(config.get_str("NAME"), Some("myindex"));
        assert_eq!(config.get_str("INDEX_NAME"), Some("seg"));
        assert_eq!(config.get_str("URL"), Some("https://host:9200/myindex"));
    }

    #[test]
    fn test_elasticsearch_explicit_index_wins() {
        let config = search("elasticsearch2://host:9200/myindex/seg/?INDEX_NAME=other&TIMEOUT=20");
        assert_eq!(config.get_str("INDEX_NAME"), Some("other"));
        assert_eq!(config.get_str("NAME"), Some("myindex"));
        assert_eq!(config.get_int("TIMEOUT"), Some(20));
    }

    #[test]
    fn test_elasticsearch_dsl() {
        let config = search("elasticsearch+dsl://127.0.0.1:9200?SCHEME=http");
        assert!(!config.contains_key("ENGINE"));
        assert_eq!(config.get_str("hosts"), Some("http://127.0.0.1:9200"));
        assert!(!config.contains_key("URL"));
        assert!(!config.contains_key("NAME"));

        let config = search("elasticsearch-dsl://127.0.0.1:9200/ignored");
        assert_eq!(config.get_str("hosts"), Some("https://127.0.0.1:9200"));
    }

    #[test]
    fn test_solr() {
        let config = search("solr://solr.example.com:8983/solr/core?TIMEOUT=60&KWARGS=x&SCHEME=http");
        assert_eq!(config.get_str("URL"), Some("http://solr.example.com:8983/solr/core"));
        assert_eq!(config.get_str("NAME"), Some("solr/core"));
        assert_eq!(config.get_int("TIMEOUT"), Some(60));
        assert_eq!(config.get_str("KWARGS"), Some("x"));
    }

    #[test]
    fn test_whoosh_and_xapian() {
        let config = search("whoosh:///var/index/?STORAGE=file&POST_LIMIT=1024");
        assert_eq!(config.get_str("NAME"), Some("/var/index"));
        assert_eq!(config.get_str("STORAGE"), Some("file"));
        assert_eq!(config.get_int("POST_LIMIT"), Some(1024));
        assert!(!config.contains_key("URL"));

        let config = search("xapian:///var/xapian?FLAGS=spelling");
        assert_eq!(config.get_str("NAME"), Some("/var/xapian"));
        assert_eq!(config.get_str("FLAGS"), Some("spelling"));
    }

    #[test]
    fn test_simple_common_options() {
        let config = search(
            "simple://localhost?BATCH_SIZE=100&INCLUDE_SPELLING=true&EXCLUDED_INDEXES=a.Index, b.Index&TIMEOUT=5",
        );
        let expected: ConfigMap = [
            (
                "ENGINE",
                ConfigValue::from("haystack.backends.simple_backend.SimpleEngine"),
            ),
            ("EXCLUDED_INDEXES", ConfigValue::from(vec!["a.Index", "b.Index"])),
            ("INCLUDE_SPELLING", ConfigValue::Bool(true)),
            ("BATCH_SIZE", ConfigValue::Int(100)),
        ]
        .into_iter()
        .collect();
        assert_eq!(config, expected);
    }

    #[test]
    fn test_explicit_options_pass_through() {
        let opts = HandlerOptions::new()
            .with_option("timeout", 30)
            .with_option("silently_fail", true);
        let config = parse_search_url_with("elasticsearch://host:9200/idx", &opts).unwrap();
        assert_eq!(config.get_int("TIMEOUT"), Some(30));
        assert!(!config.contains_key("timeout"));
        assert_eq!(config.get_bool("SILENTLY_FAIL"), Some(true));
    }

    #[test]
    fn test_non_integer_option_is_rejected() {
        let err = parse_search_url("solr://host:8983/core?TIMEOUT=soon", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid option 'TIMEOUT': expected an integer, got 'soon'"
        );
        assert!(parse_search_url("simple://host?BATCH_SIZE=lots", None).is_err());
    }

    #[test]
    fn test_engine_override() {
        let config = parse_search_url("custom://host:9200/idx", Some("my.Engine")).unwrap();
        assert_eq!(config.get_str("ENGINE"), Some("my.Engine"));
        assert_eq!(config.get_str("INDEX_NAME"), Some("idx"));
    }

    #[test]
    fn test_unknown_scheme() {
        let err = parse_search_url("//localhost:9200/index_name", None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown search scheme: https");
    }
}
