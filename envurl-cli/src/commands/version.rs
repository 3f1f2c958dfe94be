//! `envurl version` command - Display version information.

use envurl_core::{Domain, registry};

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
const NAME: &str = env!("CARGO_PKG_NAME");

/// Run the version command
pub fn run() -> CliResult<()> {
    output::section("envurl");
    output::newline();

    kv("Version", VERSION);
    kv("Binary", NAME);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);

    let schemes: usize = Domain::ALL
        .iter()
        .filter_map(|domain| registry().for_domain(*domain).ok())
        .map(|handler| handler.schemes().len())
        .sum();
    kv("Handlers", &registry().len().to_string());
    kv("Schemes", &schemes.to_string());

    output::newline();

    output::section("Components");
    kv("envurl-core", env!("CARGO_PKG_VERSION"));
    kv("envurl-env", env!("CARGO_PKG_VERSION"));

    output::newline();
    output::dim("https://github.com/pegasusheavy/envurl");

    Ok(())
}
