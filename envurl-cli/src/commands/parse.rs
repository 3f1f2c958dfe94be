//! `envurl parse` command - Convert a URL given on the command line.

use envurl_core::{ConfigValue, HandlerOptions, parse_domain_url};
use tracing::debug;

use crate::cli::ParseArgs;
use crate::error::CliResult;
use crate::output;

/// Run the parse command
pub fn run(args: ParseArgs) -> CliResult<()> {
    let mut opts = HandlerOptions::new();
    if let Some(backend) = args.backend {
        opts = opts.with_backend(backend);
    }
    for (key, value) in args.options {
        opts = opts.with_option(key, ConfigValue::Str(value));
    }

    debug!(domain = %args.domain, "Parsing URL from command line");
    let config = parse_domain_url(args.domain, &args.url, &opts)?;
    output::settings(&config, args.format)
}
