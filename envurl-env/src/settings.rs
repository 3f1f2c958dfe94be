//! `envurl.toml` settings.

use std::path::Path;
use std::str::FromStr;

use envurl_core::Domain;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dotenv::DEFAULT_ENV_FILE;
use crate::error::{EnvError, EnvResult};

/// Default settings file name.
pub const SETTINGS_FILE_NAME: &str = "envurl.toml";

/// How an [`crate::Env`] is assembled.
///
/// ```toml
/// prefix = "APP_"
/// env_file = ".env.local"
///
/// [urls]
/// database = "PRIMARY_DATABASE_URL"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSettings {
    /// Prefix added to variable names that are not set as given.
    pub prefix: Option<String>,

    /// Load a `.env` file.
    pub read_env: bool,

    /// Name of the `.env` file.
    pub env_file: String,

    /// Look for the `.env` file in parent directories as well.
    pub search_parents: bool,

    /// Let `.env` values beat process variables.
    pub overwrite: bool,

    /// Variable read for each domain, overriding `DATABASE_URL` and friends.
    pub urls: IndexMap<Domain, String>,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            prefix: None,
            read_env: true,
            env_file: DEFAULT_ENV_FILE.to_string(),
            search_parents: true,
            overwrite: false,
            urls: IndexMap::new(),
        }
    }
}

impl EnvSettings {
    /// Load settings from a file.
    pub fn from_file(path: impl AsRef<Path>) -> EnvResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| EnvError::io(path, err))?;
        content.parse()
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> EnvResult<String> {
        toml::to_string_pretty(self).map_err(|err| EnvError::Settings(err.to_string()))
    }
}

impl FromStr for EnvSettings {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
