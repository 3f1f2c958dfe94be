//! Settings declared now and read from the environment later.
//!
//! A [`DeferredSetting`] records which variable to read and how to convert
//! it. Nothing touches the environment until a [`SettingsResolver`] is asked
//! for the value, at which point the result is cached under the resolved
//! variable name and the kind of conversion.

use std::collections::HashMap;

use envurl_core::{ConfigMap, ConfigValue, Domain, is_true};
use indexmap::IndexMap;
use tracing::debug;

use crate::env::{Env, UrlArgs, convert_url, parse_float, parse_int, split_list};
use crate::error::{EnvError, EnvResult};
use crate::source::EnvSource;

/// How a deferred value is converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Raw string.
    #[default]
    Str,
    /// Integer.
    Int,
    /// Float.
    Float,
    /// Truth-y flag.
    Bool,
    /// Comma separated list.
    List,
    /// Database URL.
    Database,
    /// Cache URL.
    Cache,
    /// Email URL.
    Email,
    /// Search URL.
    Search,
    /// Queue URL.
    Queue,
    /// Tasks URL.
    Tasks,
}

impl ValueKind {
    /// The URL domain for URL kinds.
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Self::Database => Some(Domain::Database),
            Self::Cache => Some(Domain::Cache),
            Self::Email => Some(Domain::Email),
            Self::Search => Some(Domain::Search),
            Self::Queue => Some(Domain::Queue),
            Self::Tasks => Some(Domain::Tasks),
            _ => None,
        }
    }
}

impl From<Domain> for ValueKind {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Database => Self::Database,
            Domain::Cache => Self::Cache,
            Domain::Email => Self::Email,
            Domain::Search => Self::Search,
            Domain::Queue => Self::Queue,
            Domain::Tasks => Self::Tasks,
        }
    }
}

/// Placeholder for a setting whose value comes from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredSetting {
    /// Variable to read; the setting's own name when `None`.
    pub name: Option<String>,
    /// Conversion applied to the value.
    pub kind: ValueKind,
    /// Raw value used when the variable is unset.
    pub default: Option<String>,
    /// Prefix used instead of the environment's.
    pub prefix: Option<String>,
    /// Backend override for URL kinds.
    pub backend: Option<String>,
    /// Explicit options for URL kinds.
    pub options: ConfigMap,
}

impl DeferredSetting {
    /// A string setting named after the setting itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// A setting of `kind`.
    pub fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Read `name` instead of the setting's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the fallback value.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Use `prefix` instead of the environment's prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the backend override.
    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Add an explicit option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.options.set(key, value);
        self
    }
}

/// A converted value and the conversion inputs that produced it.
#[derive(Debug)]
struct CachedValue {
    setting: DeferredSetting,
    value: Option<ConfigValue>,
}

impl CachedValue {
    fn converted_like(&self, other: &DeferredSetting) -> bool {
        self.setting.default == other.default
            && self.setting.backend == other.backend
            && self.setting.options == other.options
    }
}

/// Resolves [`DeferredSetting`]s against an [`Env`], caching results.
#[derive(Debug)]
pub struct SettingsResolver<'e, S: EnvSource> {
    env: &'e Env<S>,
    cache: HashMap<(String, ValueKind), CachedValue>,
}

impl<'e, S: EnvSource> SettingsResolver<'e, S> {
    /// Create a resolver with an empty cache.
    pub fn new(env: &'e Env<S>) -> Self {
        Self {
            env,
            cache: HashMap::new(),
        }
    }

    /// Resolve the value of `setting_name` described by `placeholder`.
    ///
    /// Unset scalar settings without a default resolve to `None`; unset URL
    /// settings fail with [`EnvError::MissingVariable`].
    pub fn resolve(
        &mut self,
        setting_name: &str,
        placeholder: &DeferredSetting,
    ) -> EnvResult<Option<ConfigValue>> {
        let name = placeholder.name.as_deref().unwrap_or(setting_name);
        let prefix = placeholder.prefix.as_deref().or(self.env.prefix());
        let var = self.env.resolve_name_with(name, prefix);
        let key = (var, placeholder.kind);

        if let Some(cached) = self.cache.get(&key) {
            if cached.converted_like(placeholder) {
                return Ok(cached.value.clone());
            }
        }

        let raw = self.env.lookup(&key.0).or_else(|| placeholder.default.clone());
        let value = convert(&key.0, raw, placeholder)?;
        debug!(setting = setting_name, var = %key.0, kind = ?key.1, "Resolved deferred setting");
        self.cache.insert(
            key,
            CachedValue {
                setting: placeholder.clone(),
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Resolve several settings; unset ones are left out.
    pub fn resolve_all<'a, I>(&mut self, settings: I) -> EnvResult<IndexMap<String, ConfigValue>>
    where
        I: IntoIterator<Item = (&'a str, &'a DeferredSetting)>,
    {
        let mut resolved = IndexMap::new();
        for (name, placeholder) in settings {
            if let Some(value) = self.resolve(name, placeholder)? {
                resolved.insert(name.to_string(), value);
            }
        }
        Ok(resolved)
    }

    /// The cached value for a resolved variable name and conversion.
    pub fn cached(&self, var: &str, kind: ValueKind) -> Option<&ConfigValue> {
        self.cache
            .get(&(var.to_string(), kind))
            .and_then(|cached| cached.value.as_ref())
    }

    /// Forget every cached value.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn convert(
    var: &str,
    raw: Option<String>,
    placeholder: &DeferredSetting,
) -> EnvResult<Option<ConfigValue>> {
    if let Some(domain) = placeholder.kind.domain() {
        let url = raw.ok_or_else(|| EnvError::MissingVariable(var.to_string()))?;
        let args = UrlArgs {
            default: None,
            backend: placeholder.backend.clone(),
            options: placeholder.options.clone(),
        };
        return convert_url(domain, &url, &args).map(|config| Some(ConfigValue::Map(config)));
    }

    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = match placeholder.kind {
        ValueKind::Int => ConfigValue::Int(parse_int(var, &raw)?),
        ValueKind::Float => ConfigValue::Float(parse_float(var, &raw)?),
        ValueKind::Bool => ConfigValue::Bool(is_true(&raw)),
        ValueKind::List => ConfigValue::from(split_list(&raw)),
        _ => ConfigValue::Str(raw),
    };
    Ok(Some(value))
}
