//! `.env` file loading.
//!
//! Files are parsed with `dotenvy` into an ordered map and never written back
//! into the process environment; [`crate::Env`] consults them after the
//! process variables.

use std::io::Read;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{EnvError, EnvResult};
use crate::source::EnvSource;

/// Default `.env` file name.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Variables read from a `.env` file.
#[derive(Debug, Clone, Default)]
pub struct DotEnv {
    vars: IndexMap<String, String>,
    path: Option<PathBuf>,
}

impl DotEnv {
    /// Parse the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> EnvResult<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|err| match err {
            dotenvy::Error::Io(source) => EnvError::io(path, source),
            other => EnvError::DotEnv(other),
        })?;

        let mut vars = IndexMap::new();
        for item in iter {
            let (key, value) = item?;
            vars.insert(key, value);
        }

        info!(path = %path.display(), count = vars.len(), "Loaded env file");
        Ok(Self {
            vars,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse `.env` content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> EnvResult<Self> {
        let mut vars = IndexMap::new();
        for item in dotenvy::from_read_iter(reader) {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(Self { vars, path: None })
    }

    /// Find `file_name` in `dir`, optionally walking up through its parents.
    ///
    /// Returns `Ok(None)` when no file is found.
    pub fn discover(
        dir: impl AsRef<Path>,
        file_name: &str,
        parents: bool,
    ) -> EnvResult<Option<Self>> {
        let mut current = Some(dir.as_ref());
        while let Some(dir) = current {
            let candidate = dir.join(file_name);
            if candidate.is_file() {
                return Self::from_path(candidate).map(Some);
            }
            if !parents {
                break;
            }
            current = dir.parent();
        }
        debug!(file = file_name, "No env file found");
        Ok(None)
    }

    /// The file this was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if the file defined no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl EnvSource for DotEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
