//! # envurl-env
//!
//! Environment access for envurl: typed accessors over process variables and
//! `.env` files, URL variables expanded into settings mappings, and deferred
//! settings resolved on first use.
//!
//! ```rust
//! use envurl_env::{DotEnv, Env, MapEnvSource, UrlArgs};
//!
//! let dotenv = DotEnv::from_reader("CACHE_URL=redis://cache:6379/0\n".as_bytes()).unwrap();
//! let env = Env::with_source(MapEnvSource::new().set("WORKERS", "4")).with_dotenv(dotenv);
//!
//! assert_eq!(env.int_or("WORKERS", 1).unwrap(), 4);
//! let cache = env.cache_url(None, &UrlArgs::new()).unwrap();
//! assert_eq!(cache.get_str("LOCATION"), Some("redis://cache:6379/0"));
//! ```

pub mod deferred;
pub mod dotenv;
pub mod env;
pub mod error;
pub mod settings;
pub mod source;

pub use deferred::{DeferredSetting, SettingsResolver, ValueKind};
pub use dotenv::{DEFAULT_ENV_FILE, DotEnv};
pub use env::{Env, UrlArgs, split_list};
pub use error::{EnvError, EnvResult};
pub use settings::{EnvSettings, SETTINGS_FILE_NAME};
pub use source::{EnvSource, MapEnvSource, StdEnvSource};
