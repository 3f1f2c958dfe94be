//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use envurl_core::Domain;
use std::path::PathBuf;

/// envurl - Expand connection URLs into settings
#[derive(Parser, Debug)]
#[command(name = "envurl")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "envurl - Expand connection URLs into settings", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a URL into settings
    Parse(ParseArgs),

    /// Convert the URL held by an environment variable
    Env(EnvArgs),

    /// List the schemes registered for a domain
    Schemes(SchemesArgs),

    /// Display version information
    Version,
}

/// Output format for settings
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented key/value listing
    #[default]
    Pretty,
    /// JSON object
    Json,
}

// =============================================================================
// Parse Command
// =============================================================================

/// Arguments for the `parse` command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Settings domain (database, cache, email, search, queue)
    pub domain: Domain,

    /// URL to convert; several cache or queue URLs may be comma separated
    pub url: String,

    /// Backend used instead of the scheme's
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Extra option, may be repeated
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

// =============================================================================
// Env Command
// =============================================================================

/// Arguments for the `env` command
#[derive(Args, Debug)]
pub struct EnvArgs {
    /// Settings domain (database, cache, email, search, queue)
    pub domain: Domain,

    /// Variable to read instead of the domain default (e.g. DATABASE_URL)
    #[arg(long)]
    pub var: Option<String>,

    /// URL used when the variable is not set
    #[arg(long)]
    pub default: Option<String>,

    /// Backend used instead of the scheme's
    #[arg(short, long)]
    pub backend: Option<String>,

    /// .env file to load instead of discovering one
    #[arg(short, long)]
    pub env_file: Option<PathBuf>,

    /// Do not load any .env file
    #[arg(long, conflicts_with = "env_file")]
    pub no_env_file: bool,

    /// Prefix for variable names
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Settings file (defaults to ./envurl.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

// =============================================================================
// Schemes Command
// =============================================================================

/// Arguments for the `schemes` command
#[derive(Args, Debug)]
pub struct SchemesArgs {
    /// Domain to list; all domains when omitted
    pub domain: Option<Domain>,
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("timeout=30"),
            Ok(("timeout".to_string(), "30".to_string()))
        );
        assert_eq!(
            parse_key_value("query=a=b"),
            Ok(("query".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_parse_domain_aliases() {
        let cli = Cli::try_parse_from(["envurl", "parse", "db", "sqlite://:memory:"]).unwrap();
        match cli.command {
            Command::Parse(args) => assert_eq!(args.domain, Domain::Database),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
