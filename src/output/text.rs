//! Human-readable text output

use crate::lookup::{LookupError, LookupResult};
use crate::race::RaceOutcome;
use crate::util::time::format_duration;

/// Render a race outcome as a single line
///
/// - Success: `BrasilAPI response (183.00ms): cep=01153000 state=SP ...`
/// - Bad status: `ViaCEP returned non-success status: 500 (12.00ms)`
/// - Other failure: `ViaCEP error [transport-error]: ... (12.00ms)`
/// - Timeout: `Timeout: no response received within 1.00s`
pub fn format_outcome(outcome: &RaceOutcome) -> String {
    match outcome {
        RaceOutcome::Winner(LookupResult::Success {
            source,
            record,
            elapsed,
        }) => format!("{} response ({}): {}", source, format_duration(*elapsed), record),
        RaceOutcome::Winner(LookupResult::Failure {
            source,
            error: LookupError::BadStatus(code),
            elapsed,
        }) => format!(
            "{} returned non-success status: {} ({})",
            source,
            code,
            format_duration(*elapsed)
        ),
        RaceOutcome::Winner(LookupResult::Failure {
            source,
            error,
            elapsed,
        }) => format!(
            "{} error [{}]: {} ({})",
            source,
            error.kind(),
            error,
            format_duration(*elapsed)
        ),
        RaceOutcome::Timeout { after } => {
            format!("Timeout: no response received within {}", format_duration(*after))
        }
    }
}
