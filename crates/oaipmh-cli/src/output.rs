//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use oaipmh_core::OaiError;
use serde::Serialize;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Report an OAI-PMH error from a response body.
///
/// Goes to stderr so the XML on stdout stays intact.
pub fn protocol_error(err: &OaiError) {
    eprintln!("{} {}: {}", "✗".red(), err.code.as_str().yellow().bold(), err.message);
}

/// Note a fetched list page while following resumption tokens.
pub fn page_progress(page: usize, items: usize, more: bool) {
    let tail = if more { "continuing" } else { "complete" };
    eprintln!("{} page {}: {} item(s), {}", "→".cyan(), page, items, tail.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
