//! envurl CLI - Command-line interface for envurl.

use clap::Parser;

use envurl_cli::cli::{Cli, Command};
use envurl_cli::commands;
use envurl_cli::error::CliResult;
use envurl_cli::output;
use envurl_core::logging;

fn main() {
    if let Err(e) = run() {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_with_level("debug");
    } else {
        logging::init();
    }

    match cli.command {
        Command::Parse(args) => commands::parse::run(args),
        Command::Env(args) => commands::env::run(args),
        Command::Schemes(args) => commands::schemes::run(args),
        Command::Version => commands::version::run(),
    }
}
