//! `envurl env` command - Convert the URL held by an environment variable.

use std::path::Path;

use envurl_env::{DotEnv, Env, EnvSettings, SETTINGS_FILE_NAME, UrlArgs};
use tracing::debug;

use crate::cli::EnvArgs;
use crate::error::CliResult;
use crate::output;

/// Run the env command
pub fn run(args: EnvArgs) -> CliResult<()> {
    let cwd = std::env::current_dir()?;
    let settings = load_settings(&args, &cwd)?;

    let mut env = Env::from_settings(&settings, &cwd)?;
    if let Some(path) = &args.env_file {
        env = env.with_dotenv(DotEnv::from_path(path)?);
    }
    if let Some(prefix) = &args.prefix {
        env = env.with_prefix(prefix.as_str());
    }

    let mut url_args = UrlArgs::new();
    if let Some(default) = args.default {
        url_args = url_args.default_url(default);
    }
    if let Some(backend) = args.backend {
        url_args = url_args.backend(backend);
    }

    let var = args.var.as_deref().unwrap_or_else(|| env.url_var(args.domain));
    debug!(domain = %args.domain, var = %env.resolve_name(var), "Reading URL variable");
    let config = env.domain_url(args.domain, Some(var), &url_args)?;
    output::settings(&config, args.format)
}

/// Load the settings file named on the command line, or `./envurl.toml`.
fn load_settings(args: &EnvArgs, cwd: &Path) -> CliResult<EnvSettings> {
    let mut settings = match &args.config {
        Some(path) => EnvSettings::from_file(path)?,
        None => {
            let default_path = cwd.join(SETTINGS_FILE_NAME);
            if default_path.is_file() {
                EnvSettings::from_file(default_path)?
            } else {
                EnvSettings::default()
            }
        }
    };
    if args.no_env_file || args.env_file.is_some() {
        settings.read_env = false;
    }
    Ok(settings)
}
