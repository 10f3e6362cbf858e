//! CLI argument parsing using clap

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Collaborator selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// BrasilAPI (brasilapi.com.br)
    Brasilapi,
    /// ViaCEP (viacep.com.br)
    Viacep,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// One human-readable line
    Text,
    /// One JSON object
    Json,
}

/// postrace - race postal-code lookups and report the first answer
#[derive(Parser, Debug)]
#[command(name = "postrace")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Postal code (CEP) to look up, e.g. 01153000 or 01153-000
    #[arg(value_name = "CEP")]
    pub cep: Option<String>,

    /// TOML configuration file (CLI flags take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Race timeout (e.g., 500ms, 1s, 2m)
    #[arg(short = 't', long, env = "POSTRACE_TIMEOUT")]
    pub timeout: Option<String>,

    /// BrasilAPI endpoint template; `{cep}` is replaced by the postal code
    #[arg(long, env = "POSTRACE_BRASILAPI_URL")]
    pub brasilapi_url: Option<String>,

    /// ViaCEP endpoint template; `{cep}` is replaced by the postal code
    #[arg(long, env = "POSTRACE_VIACEP_URL")]
    pub viacep_url: Option<String>,

    /// Restrict the race to these collaborators (repeatable)
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceArg>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Validate and print the configuration without querying anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments that do not depend on the config file
    pub fn validate(&self) -> Result<()> {
        if let Some(ref timeout) = self.timeout {
            super::cli_convert::parse_duration_ms(timeout)?;
        }

        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].contains(source) {
                anyhow::bail!("--source {:?} given more than once", source);
            }
        }

        Ok(())
    }
}
