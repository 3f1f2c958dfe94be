//! Configuration mapping produced by the domain handlers.
//!
//! A [`ConfigMap`] is an ordered map from upper-case setting names to
//! [`ConfigValue`]s. Falsy values are never stored: setting a key to an empty
//! string, `false`, `0`, an empty list or an empty map removes the key. Call
//! sites rely on this to test for presence instead of emptiness. The one
//! exception is [`ConfigMap::set_flag`], for flags whose consumer defaults to
//! `true`.
//!
//! ```rust
//! use envurl_core::{ConfigMap, ConfigValue};
//!
//! let mut config = ConfigMap::new();
//! config.set("HOST", "localhost");
//! config.set("PORT", 5432);
//! config.set("PASSWORD", "");
//!
//! assert_eq!(config.get_str("HOST"), Some("localhost"));
//! assert_eq!(config.get_int("PORT"), Some(5432));
//! assert!(!config.contains_key("PASSWORD"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

const TRUE_PREFIXES: [&str; 8] = ["T", "t", "1", "on", "ok", "Y", "y", "en"];

/// Interpret a string as a boolean flag.
///
/// Anything starting with `T`, `t`, `1`, `on`, `ok`, `Y`, `y` or `en` is true.
/// Leading whitespace is significant (`" 1"` is false).
pub fn is_true(value: &str) -> bool {
    !value.is_empty() && value != "0" && TRUE_PREFIXES.iter().any(|p| value.starts_with(p))
}

/// A single setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
    /// Ordered list of values.
    List(Vec<ConfigValue>),
    /// Nested mapping (e.g. `OPTIONS`).
    Map(ConfigMap),
}

impl ConfigValue {
    /// Whether the value would survive `ConfigMap::set`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
        }
    }

    /// Parse an integer, falling back to a float, falling back to the string.
    pub fn number_or_str(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            Self::Int(i)
        } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
            Self::Float(f)
        } else {
            Self::Str(raw.to_string())
        }
    }

    /// Parse an integer, falling back to the string.
    pub fn int_or_str(raw: &str) -> Self {
        raw.parse::<i64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Str(raw.to_string()))
    }

    /// Get the string, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float, if this is a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the list, if this is a list.
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Get the nested map, if this is a map.
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Render the value as it would appear in a URL or an env file.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::to_plain_string)
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(s) => write!(f, "{}", s),
            Self::List(_) | Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for ConfigValue {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u16> for ConfigValue {
    fn from(i: u16) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(m: ConfigMap) -> Self {
        Self::Map(m)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered settings mapping with omit-if-empty semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, ConfigValue>", into = "IndexMap<String, ConfigValue>")]
pub struct ConfigMap {
    entries: IndexMap<String, ConfigValue>,
}

impl ConfigMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, or remove the key when the value is falsy.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if value.is_truthy() {
            self.entries.insert(key, value);
        } else {
            self.entries.shift_remove(&key);
        }
        self
    }

    /// Store an optional value; `None` removes the key.
    pub fn set_opt<V: Into<ConfigValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        match value {
            Some(v) => self.set(key, v),
            None => {
                self.entries.shift_remove(&key.into());
                self
            }
        }
    }

    /// Store a boolean flag, keeping an explicit `false`.
    pub fn set_flag(&mut self, key: impl Into<String>, flag: bool) -> &mut Self {
        self.entries.insert(key.into(), ConfigValue::Bool(flag));
        self
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set every entry of `other`, overwriting existing keys.
    pub fn merge(&mut self, other: ConfigMap) -> &mut Self {
        for (k, v) in other.entries {
            self.set(k, v);
        }
        self
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Get a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// Get an integer value.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_int)
    }

    /// Get a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    /// Get a nested map.
    pub fn get_map(&self, key: &str) -> Option<&ConfigMap> {
        self.get(key).and_then(ConfigValue::as_map)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.shift_remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Consume into the underlying ordered map.
    pub fn into_inner(self) -> IndexMap<String, ConfigValue> {
        self.entries
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigMap {
    fn from(entries: IndexMap<String, ConfigValue>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ConfigMap> for IndexMap<String, ConfigValue> {
    fn from(map: ConfigMap) -> Self {
        map.entries
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, ConfigValue);
    type IntoIter = indexmap::map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Index<&str> for ConfigMap {
    type Output = ConfigValue;

    fn index(&self, key: &str) -> &ConfigValue {
        self.entries
            .get(key)
            .unwrap_or_else(|| panic!("no setting named '{}'", key))
    }
}
