//! Configuration validation

use super::*;
use crate::lookup::provider::POSTAL_CODE_PLACEHOLDER;
use anyhow::Result;
use std::collections::HashSet;

/// Upper bound for the race timeout
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_lookup(&config.lookup)?;
    validate_race(&config.race)?;
    validate_collaborators(&config.collaborators)?;
    validate_runtime(&config.runtime)?;

    Ok(())
}

/// Validate lookup configuration
pub fn validate_lookup(lookup: &LookupConfig) -> Result<()> {
    let code = &lookup.postal_code;

    if code.len() != 8 || !code.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("postal_code must be exactly 8 digits, got {:?}", code);
    }

    Ok(())
}

/// Validate race configuration
pub fn validate_race(race: &RaceConfig) -> Result<()> {
    if race.timeout_ms == 0 {
        anyhow::bail!("timeout must be greater than 0");
    }

    if race.timeout_ms > MAX_TIMEOUT_MS {
        anyhow::bail!(
            "timeout must be <= {} ms, got {}",
            MAX_TIMEOUT_MS,
            race.timeout_ms
        );
    }

    Ok(())
}

/// Validate collaborator list
///
/// Endpoint URLs are not parsed here: a malformed endpoint is a per-worker
/// `build-error` reported through the race, not a startup failure.
pub fn validate_collaborators(collaborators: &[CollaboratorConfig]) -> Result<()> {
    let mut seen = HashSet::new();

    for (i, collaborator) in collaborators.iter().enumerate() {
        if !seen.insert(collaborator.source) {
            anyhow::bail!(
                "Collaborator {} ({}) is configured more than once",
                i,
                collaborator.source
            );
        }

        if !collaborator.endpoint.contains(POSTAL_CODE_PLACEHOLDER) {
            anyhow::bail!(
                "Collaborator {} ({}) endpoint must contain the {} placeholder: {}",
                i,
                collaborator.source,
                POSTAL_CODE_PLACEHOLDER,
                collaborator.endpoint
            );
        }
    }

    if !collaborators.iter().any(|c| c.enabled) {
        anyhow::bail!("At least one collaborator must be enabled");
    }

    Ok(())
}

/// Validate runtime configuration
pub fn validate_runtime(runtime: &RuntimeConfig) -> Result<()> {
    if runtime.user_agent.trim().is_empty() {
        anyhow::bail!("user_agent must not be empty");
    }

    Ok(())
}
