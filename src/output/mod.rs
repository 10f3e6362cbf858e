//! Outcome output
//!
//! - `text`: one human-readable line (default)
//! - `json`: one JSON object per line

pub mod json;
pub mod text;

use crate::config::{Config, OutputFormat};
use crate::race::RaceOutcome;
use crate::Result;

/// Render the outcome line in the configured format
pub fn render_outcome(outcome: &RaceOutcome, config: &Config) -> Result<String> {
    match config.output.format {
        OutputFormat::Text => Ok(text::format_outcome(outcome)),
        OutputFormat::Json => json::format_outcome(outcome, &config.lookup.postal_code),
    }
}

/// Print the configuration summary shown by `--dry-run`
pub fn print_configuration(config: &Config) {
    println!("Configuration:");
    println!("  Postal code: {}", config.lookup.postal_code);
    println!("  Timeout:     {}ms", config.race.timeout_ms);
    println!("  Format:      {}", config.output.format);
    println!("  Collaborators:");
    for collaborator in &config.collaborators {
        println!(
            "    {:<10} {} {}",
            collaborator.source.to_string(),
            if collaborator.enabled { "enabled " } else { "disabled" },
            collaborator.endpoint
        );
    }
}
