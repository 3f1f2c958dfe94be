//! Styled terminal output utilities.

use envurl_core::{ConfigMap, ConfigValue};
use owo_colors::OwoColorize;

use crate::cli::OutputFormat;
use crate::error::CliResult;

/// Print a header/title
pub fn header(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "─".repeat(text.len()).dimmed());
    println!();
}

/// Print a section header
pub fn section(text: &str) {
    println!("{}", text.bold().white());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a list item
pub fn list_item(text: &str) {
    println!("  {} {}", "•".dimmed(), text);
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Print dimmed text
pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}

/// Print settings in the requested format
pub fn settings(config: &ConfigMap, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", config.to_json_pretty()?),
        OutputFormat::Pretty => {
            for line in render_pretty(config) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Render settings as indented `KEY: value` lines, without styling.
pub fn render_pretty(config: &ConfigMap) -> Vec<String> {
    let mut lines = Vec::new();
    render_map(config, 0, &mut lines);
    lines
}

fn render_map(config: &ConfigMap, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for (key, value) in config.iter() {
        match value {
            ConfigValue::Map(nested) => {
                lines.push(format!("{}{}:", indent, key));
                render_map(nested, depth + 1, lines);
            }
            ConfigValue::List(items) => {
                lines.push(format!("{}{}:", indent, key));
                for item in items {
                    lines.push(format!("{}  - {}", indent, item));
                }
            }
            scalar => lines.push(format!("{}{}: {}", indent, key, scalar)),
        }
    }
}
