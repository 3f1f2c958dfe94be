//! `envurl schemes` command - List the registered schemes.

use envurl_core::{Domain, registry};
use owo_colors::OwoColorize;

use crate::cli::SchemesArgs;
use crate::error::CliResult;
use crate::output;

/// Run the schemes command
pub fn run(args: SchemesArgs) -> CliResult<()> {
    let domains = match args.domain {
        Some(domain) => vec![domain],
        None => Domain::ALL.to_vec(),
    };

    for domain in domains {
        let handler = registry().for_domain(domain)?;
        output::header(&format!("{} ({})", domain, handler.default_var()));
        for entry in handler.schemes() {
            let mut line = format!("{:<20}", entry.scheme).bold().to_string();
            line.push_str(entry.backend.unwrap_or("(no backend)"));
            if let Some(port) = entry.default_port {
                line.push_str(&format!(" {}", format!("port {}", port).dimmed()));
            }
            output::list_item(&line);
        }
    }

    let plugins: Vec<String> = registry()
        .names()
        .into_iter()
        .filter(|name| !Domain::ALL.iter().any(|d| name.as_str() == d.method_name()))
        .collect();
    if !plugins.is_empty() {
        output::newline();
        output::section("Plugins");
        for name in plugins {
            output::list_item(&name);
        }
    }

    Ok(())
}
