//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Precedence is defaults, then the TOML file, then CLI flags.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::lookup::{Collaborator, Source};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Postal code looked up when none is given
pub const DEFAULT_POSTAL_CODE: &str = "01153000";

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub race: RaceConfig,
    #[serde(default = "default_collaborators")]
    pub collaborators: Vec<CollaboratorConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            race: RaceConfig::default(),
            collaborators: default_collaborators(),
            output: OutputConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Enabled collaborators, in configuration order
    pub fn active_collaborators(&self) -> Vec<Collaborator> {
        self.collaborators
            .iter()
            .filter(|c| c.enabled)
            .map(|c| Collaborator::new(c.source, c.endpoint.clone()))
            .collect()
    }

    pub fn collaborator_mut(&mut self, source: Source) -> Option<&mut CollaboratorConfig> {
        self.collaborators.iter_mut().find(|c| c.source == source)
    }
}

/// What to look up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Postal code (CEP), 8 digits; separators are stripped before use
    #[serde(default = "default_postal_code")]
    pub postal_code: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            postal_code: default_postal_code(),
        }
    }
}

fn default_postal_code() -> String {
    DEFAULT_POSTAL_CODE.to_string()
}

/// Race timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Deadline for the whole race in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RaceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    1000
}

/// One remote lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    pub source: Source,
    /// Endpoint template containing the `{cep}` placeholder
    pub endpoint: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl CollaboratorConfig {
    pub fn public(source: Source) -> Self {
        Self {
            source,
            endpoint: source.default_endpoint().to_string(),
            enabled: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_collaborators() -> Vec<CollaboratorConfig> {
    Source::ALL.iter().copied().map(CollaboratorConfig::public).collect()
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Outcome line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Log at debug level
    #[serde(default)]
    pub debug: bool,
    /// User-Agent header sent to collaborators
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("postrace/{}", env!("CARGO_PKG_VERSION"))
}
