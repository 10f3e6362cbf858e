//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use crate::lookup::Source;
use crate::config::cli_convert::{convert_format, convert_source, normalize_postal_code, parse_duration_ms};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the effective configuration: defaults or `--config` file, then CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Override postal code
    if let Some(ref cep) = cli.cep {
        config.lookup.postal_code = cep.clone();
    }
    config.lookup.postal_code = normalize_postal_code(&config.lookup.postal_code);

    // Override race timeout
    if let Some(ref timeout) = cli.timeout {
        config.race.timeout_ms = parse_duration_ms(timeout).context("Invalid timeout")?;
    }

    // Override endpoints (adds the collaborator if the file left it out)
    let endpoint_overrides = [
        (Source::BrasilApi, &cli.brasilapi_url),
        (Source::ViaCep, &cli.viacep_url),
    ];
    for (source, url) in endpoint_overrides {
        if let Some(url) = url {
            match config.collaborator_mut(source) {
                Some(collaborator) => collaborator.endpoint = url.clone(),
                None => config.collaborators.push(CollaboratorConfig {
                    source,
                    endpoint: url.clone(),
                    enabled: true,
                }),
            }
        }
    }

    // Restrict collaborator set
    if !cli.sources.is_empty() {
        let selected: Vec<Source> = cli.sources.iter().copied().map(convert_source).collect();
        for source in &selected {
            if config.collaborator_mut(*source).is_none() {
                config.collaborators.push(CollaboratorConfig::public(*source));
            }
        }
        for collaborator in &mut config.collaborators {
            collaborator.enabled = selected.contains(&collaborator.source);
        }
    }

    // Override output format
    if let Some(format) = cli.format {
        config.output.format = convert_format(format);
    }

    // Override debug flag
    if cli.debug {
        config.runtime.debug = true;
    }

    Ok(config)
}
