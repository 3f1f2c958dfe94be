//! Domain handlers.
//!
//! Each handler owns a static scheme table and turns a [`ParsedUrl`] into the
//! settings mapping for its domain:
//!
//! | Handler | Backend key | Aggregates |
//! |---------|-------------|------------|
//! | [`DatabaseHandler`] | `ENGINE` | no |
//! | [`CacheHandler`] | `BACKEND` | yes (`LOCATION`) |
//! | [`EmailHandler`] | `EMAIL_BACKEND` | no |
//! | [`SearchHandler`] | `ENGINE` | no |
//! | [`QueueHandler`] | `QUEUE_BACKEND` | yes (`QUEUE_LOCATION`) |
//! | [`TasksHandler`] | `BACKEND` | no |

pub mod cache;
pub mod database;
pub mod email;
pub mod queue;
pub mod search;
pub mod tasks;

pub use cache::CacheHandler;
pub use database::DatabaseHandler;
pub use email::EmailHandler;
pub use queue::QueueHandler;
pub use search::SearchHandler;
pub use tasks::TasksHandler;

use crate::config::{ConfigMap, ConfigValue};
use crate::options::HandlerOptions;
use crate::parser::ParsedUrl;

/// Query parameters as strings, overlaid with the explicit options.
pub(crate) fn merged_options(url: &ParsedUrl, opts: &HandlerOptions) -> ConfigMap {
    let mut merged = ConfigMap::new();
    for (key, value) in &url.query {
        merged.set(key.as_str(), value.as_str());
    }
    for (key, value) in opts.options.iter() {
        merged.set(key, value.clone());
    }
    merged
}

/// Apply `coerce` to every string value.
pub(crate) fn coerce_strings(map: ConfigMap, coerce: fn(&str) -> ConfigValue) -> ConfigMap {
    map.into_iter()
        .map(|(key, value)| match value {
            ConfigValue::Str(s) => (key, coerce(&s)),
            other => (key, other),
        })
        .collect()
}

/// Move recognized keys into `config` upper-cased and return the rest.
pub(crate) fn hoist(options: ConfigMap, recognized: &[&str], config: &mut ConfigMap) -> ConfigMap {
    let mut rest = ConfigMap::new();
    for (key, value) in options {
        let upper = key.to_ascii_uppercase();
        if recognized.contains(&upper.as_str()) {
            config.set(upper, value);
        } else {
            rest.set(key, value);
        }
    }
    rest
}

/// One `scheme://[userinfo@]node<path>` string per authority node.
pub(crate) fn node_urls(url: &ParsedUrl, scheme: &str) -> Vec<String> {
    let userinfo = url.userinfo();
    url.nodes()
        .into_iter()
        .map(|node| format!("{}://{}{}{}", scheme, userinfo, node, url.path))
        .collect()
}

/// Split a comma separated string into a list, dropping blank items.
pub(crate) fn split_list(value: ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Str(s) => ConfigValue::from(
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>(),
        ),
        other => other,
    }
}

/// A single item as a scalar, several as a list.
pub(crate) fn scalar_or_list(mut items: Vec<String>) -> ConfigValue {
    if items.len() == 1 {
        ConfigValue::Str(items.remove(0))
    } else {
        ConfigValue::from(items)
    }
}
