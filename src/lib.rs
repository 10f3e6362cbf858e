//! postrace - first-answer postal-code lookups
//!
//! postrace asks several address-lookup services for the same Brazilian postal
//! code (CEP) at once and reports whichever answers first, giving up after a
//! configurable deadline.
//!
//! # Architecture
//!
//! - **Lookup workers**: one HTTP request per collaborator, normalized into a
//!   single result message (success record or typed failure)
//! - **Race coordinator**: spawns the workers, waits on the result channel and
//!   the shared deadline, resolves to the first arrival or a timeout
//! - **Configuration**: defaults, optional TOML file, CLI flags
//! - **Output**: one text or JSON line per race

pub mod config;
pub mod lookup;
pub mod output;
pub mod race;
pub mod util;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use config::Config;
pub use lookup::{LocationRecord, LookupError, LookupResult, Source};
pub use race::{RaceCoordinator, RaceOutcome};

/// Result type used throughout postrace
pub type Result<T> = anyhow::Result<T>;
