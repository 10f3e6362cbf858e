//! CLI to Config conversion utilities

use crate::config::cli;
use crate::config::OutputFormat;
use crate::lookup::Source;
use anyhow::{Context, Result};

/// Parse a duration string (e.g., "500ms", "1s", "2m") to milliseconds
///
/// A bare number is taken as milliseconds.
pub fn parse_duration_ms(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("ms") {
        (s.trim_end_matches("ms"), 1u64)
    } else if s.ends_with("sec") || s.ends_with('s') {
        (s.trim_end_matches("sec").trim_end_matches('s'), 1000)
    } else if s.ends_with("min") || s.ends_with('m') {
        (s.trim_end_matches("min").trim_end_matches('m'), 60_000)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))
}

/// Strip the separators people usually type into a postal code
///
/// `01153-000`, `01.153-000` and ` 01153000 ` all become `01153000`.
pub fn normalize_postal_code(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '.') && !c.is_whitespace())
        .collect()
}

/// Convert CLI SourceArg to lookup Source
pub fn convert_source(arg: cli::SourceArg) -> Source {
    match arg {
        cli::SourceArg::Brasilapi => Source::BrasilApi,
        cli::SourceArg::Viacep => Source::ViaCep,
    }
}

/// Convert CLI FormatArg to OutputFormat
pub fn convert_format(arg: cli::FormatArg) -> OutputFormat {
    match arg {
        cli::FormatArg::Text => OutputFormat::Text,
        cli::FormatArg::Json => OutputFormat::Json,
    }
}
