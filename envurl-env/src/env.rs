//! Typed access to environment variables.

use std::collections::HashSet;
use std::path::Path;

use envurl_core::{ConfigMap, ConfigValue, Domain, HandlerOptions, is_true, registry};
use indexmap::IndexMap;
use tracing::debug;

use crate::dotenv::DotEnv;
use crate::error::{EnvError, EnvResult};
use crate::settings::EnvSettings;
use crate::source::{EnvSource, StdEnvSource};

/// Arguments for the URL accessors ([`Env::database_url`] and friends).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlArgs {
    /// URL used when the variable is not set.
    pub default: Option<String>,
    /// Backend identifier used instead of the scheme registry.
    pub backend: Option<String>,
    /// Explicit options; these win over the URL's query string.
    pub options: ConfigMap,
}

impl UrlArgs {
    /// Empty arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback URL.
    pub fn default_url(mut self, url: impl Into<String>) -> Self {
        self.default = Some(url.into());
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

    fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            backend: self.backend.clone(),
            options: self.options.clone(),
        }
    }
}

/// Environment wrapper with typed accessors.
///
/// Values are looked up in this order:
/// 1. values assigned with [`Env::set`]
/// 2. the source (the process environment by default)
/// 3. the loaded `.env` file
///
/// With [`Env::overwrite`] the `.env` file is consulted before the source.
/// [`Env::remove`] hides a variable from every layer.
///
/// # Examples
///
/// ```rust
/// use envurl_env::{Env, MapEnvSource, UrlArgs};
///
/// let env = Env::with_source(
///     MapEnvSource::new()
///         .set("APP_DEBUG", "yes")
///         .set("DATABASE_URL", "postgres://app@db/app"),
/// )
/// .with_prefix("APP_");
///
/// assert!(env.bool("DEBUG"));
/// let db = env.database_url(None, &UrlArgs::new()).unwrap();
/// assert_eq!(db.get_str("HOST"), Some("db"));
/// ```
#[derive(Debug, Clone)]
pub struct Env<S: EnvSource = StdEnvSource> {
    source: S,
    overrides: IndexMap<String, String>,
    removed: HashSet<String>,
    dotenv: Option<DotEnv>,
    prefix: Option<String>,
    overwrite: bool,
    url_vars: IndexMap<Domain, String>,
}

impl Env<StdEnvSource> {
    /// Create an environment over the process variables.
    pub fn new() -> Self {
        Self::with_source(StdEnvSource)
    }

    /// Build an environment from a settings file's contents.
    ///
    /// When `read_env` is set the `.env` file is discovered starting at `dir`.
    pub fn from_settings(settings: &EnvSettings, dir: impl AsRef<Path>) -> EnvResult<Self> {
        Self::with_source(StdEnvSource).apply_settings(settings, dir)
    }
}

impl Default for Env<StdEnvSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EnvSource> Env<S> {
    /// Create an environment with a custom source.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            overrides: IndexMap::new(),
            removed: HashSet::new(),
            dotenv: None,
            prefix: None,
            overwrite: false,
            url_vars: IndexMap::new(),
        }
    }

    /// Prefix added to names that are not set as given.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Attach a parsed `.env` file.
    pub fn with_dotenv(mut self, dotenv: DotEnv) -> Self {
        self.dotenv = Some(dotenv);
        self
    }

    /// Let `.env` values take precedence over the source.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Read `domain`'s URL from `var` instead of its default variable.
    pub fn with_url_var(mut self, domain: Domain, var: impl Into<String>) -> Self {
        self.url_vars.insert(domain, var.into());
        self
    }

    /// Apply a settings file, discovering the `.env` file from `dir`.
    pub fn apply_settings(mut self, settings: &EnvSettings, dir: impl AsRef<Path>) -> EnvResult<Self> {
        if let Some(prefix) = &settings.prefix {
            self = self.with_prefix(prefix.as_str());
        }
        self.overwrite = settings.overwrite;
        for (domain, var) in &settings.urls {
            self.url_vars.insert(*domain, var.clone());
        }
        if settings.read_env {
            self.dotenv = DotEnv::discover(dir, &settings.env_file, settings.search_parents)?;
        }
        Ok(self)
    }

    /// The configured prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The attached `.env` file.
    pub fn dotenv(&self) -> Option<&DotEnv> {
        self.dotenv.as_ref()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<String> {
        if self.removed.contains(name) {
            return None;
        }
        if let Some(value) = self.overrides.get(name) {
            return Some(value.clone());
        }
        let from_file = || self.dotenv.as_ref().and_then(|d| d.get(name).map(String::from));
        if self.overwrite {
            from_file().or_else(|| self.source.get(name))
        } else {
            self.source.get(name).or_else(from_file)
        }
    }

    /// The variable name actually read for `name`.
    ///
    /// The prefix is added unless the name already carries it or the bare
    /// name is set.
    pub fn resolve_name(&self, name: &str) -> String {
        self.resolve_name_with(name, self.prefix.as_deref())
    }

    /// Like [`Env::resolve_name`] with an explicit prefix.
    pub fn resolve_name_with(&self, name: &str, prefix: Option<&str>) -> String {
        match prefix.filter(|p| !p.is_empty()) {
            Some(prefix)
                if !name.is_empty() && !name.starts_with(prefix) && self.lookup(name).is_none() =>
            {
                format!("{}{}", prefix, name)
            }
            _ => name.to_string(),
        }
    }

    /// Get a variable.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lookup(&self.resolve_name(name))
    }

    /// Get a variable or a default.
    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Get a variable, falling back to `default`; fails when neither exists.
    pub fn check_var(&self, name: &str, default: Option<&str>) -> EnvResult<String> {
        let resolved = self.resolve_name(name);
        match self.lookup(&resolved) {
            Some(value) => Ok(value),
            None => default
                .map(String::from)
                .ok_or(EnvError::MissingVariable(resolved)),
        }
    }

    /// Get an integer; `None` when unset.
    pub fn int(&self, name: &str) -> EnvResult<Option<i64>> {
        self.get(name).map(|raw| parse_int(name, &raw)).transpose()
    }

    /// Get an integer or a default.
    pub fn int_or(&self, name: &str, default: i64) -> EnvResult<i64> {
        Ok(self.int(name)?.unwrap_or(default))
    }

    /// Get a float; `None` when unset.
    pub fn float(&self, name: &str) -> EnvResult<Option<f64>> {
        self.get(name)
            .map(|raw| parse_float(name, &raw))
            .transpose()
    }

    /// Get a float or a default.
    pub fn float_or(&self, name: &str, default: f64) -> EnvResult<f64> {
        Ok(self.float(name)?.unwrap_or(default))
    }

    /// Get a flag; unset variables are false.
    pub fn bool(&self, name: &str) -> bool {
        self.get(name).is_some_and(|raw| is_true(&raw))
    }

    /// Get a flag or a default.
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name).map_or(default, |raw| is_true(&raw))
    }

    /// Get a comma separated list; unset variables give an empty list.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name).map(|raw| split_list(&raw)).unwrap_or_default()
    }

    /// Get a comma separated list or a default.
    pub fn list_or(&self, name: &str, default: &[&str]) -> Vec<String> {
        match self.get(name) {
            Some(raw) => split_list(&raw),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check if a variable is set.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Check if every variable is set.
    pub fn is_all_set(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.is_set(name))
    }

    /// Check if any variable is set.
    pub fn is_any_set(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.is_set(name))
    }

    /// Assign a variable for this environment only.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.removed.remove(&name);
        self.overrides.insert(name, value.into());
    }

    /// Hide a variable; returns its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let previous = self.lookup(name);
        self.overrides.shift_remove(name);
        self.removed.insert(name.to_string());
        previous
    }

    /// The variable read for `domain` when no explicit name is given.
    pub fn url_var(&self, domain: Domain) -> &str {
        self.url_vars
            .get(&domain)
            .map(String::as_str)
            .unwrap_or_else(|| domain.default_var())
    }

    /// Resolve a URL variable and convert it with the handler for `domain`.
    pub fn domain_url(&self, domain: Domain, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        let var = var.unwrap_or_else(|| self.url_var(domain));
        let url = self.check_var(var, args.default.as_deref())?;
        debug!(domain = %domain, var, "Converting URL variable");
        convert_url(domain, &url, args)
    }

    /// Resolve a URL variable with a handler registered under `handler`.
    ///
    /// Handlers are registered by accessor name (`database_url`,
    /// `cache_url`, ...) plus any plugins added to the global registry.
    pub fn plugin_url(&self, handler: &str, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        let handler = registry().require(handler)?;
        let var = var.unwrap_or_else(|| handler.default_var());
        let url = self.check_var(var, args.default.as_deref())?;
        Ok(handler.get_backend(&url, &args.handler_options())?)
    }

    /// Read `DATABASE_URL` (or `var`) as database settings.
    pub fn database_url(&self, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        self.domain_url(Domain::Database, var, args)
    }

    /// Read `CACHE_URL` (or `var`) as cache settings.
    pub fn cache_url(&self, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        self.domain_url(Domain::Cache, var, args)
    }

    /// Read `EMAIL_URL` (or `var`) as email settings.
    pub fn email_url(&self, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        self.domain_url(Domain::Email, var, args)
    }

    /// Read `SEARCH_URL` (or `var`) as search settings.
    pub fn search_url(&self, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        self.domain_url(Domain::Search, var, args)
    }

    /// Read `QUEUE_URL` (or `var`) as queue settings.
    pub fn queue_url(&self, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        self.domain_url(Domain::Queue, var, args)
    }

    /// Read `TASKS_URL` (or `var`) as background task settings.
    pub fn tasks_url(&self, var: Option<&str>, args: &UrlArgs) -> EnvResult<ConfigMap> {
        self.domain_url(Domain::Tasks, var, args)
    }
}

pub(crate) fn convert_url(domain: Domain, url: &str, args: &UrlArgs) -> EnvResult<ConfigMap> {
    Ok(registry().for_domain(domain)?.get_backend(url, &args.handler_options())?)
}

pub(crate) fn parse_int(name: &str, raw: &str) -> EnvResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| EnvError::invalid_value(name, format!("expected an integer, got '{}'", raw)))
}

pub(crate) fn parse_float(name: &str, raw: &str) -> EnvResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| EnvError::invalid_value(name, format!("expected a number, got '{}'", raw)))
}

/// Split on commas, trimming whitespace and surrounding quotes.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
