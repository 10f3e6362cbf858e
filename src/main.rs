//! postrace CLI entry point

use anyhow::{Context, Result};
use postrace::config::{cli::Cli, toml::load_config, validator, Config};
use postrace::output;
use postrace::race::RaceCoordinator;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();
    cli.validate()?;

    let config = load_config(&cli)?;
    init_tracing(&config);

    validator::validate_config(&config)
        .context("Configuration validation failed")?;

    if cli.dry_run {
        output::print_configuration(&config);
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    run_race(config)
}

/// Log to stderr so stdout carries only the outcome line
fn init_tracing(config: &Config) {
    let default_level = if config.runtime.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("postrace={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Run one race and print its outcome
fn run_race(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    let outcome = runtime.block_on(async {
        let coordinator = RaceCoordinator::new(&config)
            .context("Failed to create race coordinator")?;

        Ok::<_, anyhow::Error>(coordinator.run(&config.lookup.postal_code).await)
    })?;

    println!("{}", output::render_outcome(&outcome, &config)?);

    // Losing workers were cancelled when the race resolved; don't wait on them
    runtime.shutdown_background();

    Ok(())
}
