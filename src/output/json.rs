//! JSON output formatting
//!
//! One object per race, written as a single line so the output stays
//! line-oriented like the text format.

use crate::lookup::{ErrorKind, LocationRecord, LookupResult, Source};
use crate::race::RaceOutcome;
use crate::util::time::{as_millis_u64, format_duration};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::time::Duration;

/// Duration with both milliseconds and human-readable format
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuration {
    pub millis: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            millis: as_millis_u64(d),
            human: format_duration(d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Failure,
    Timeout,
}

/// Serializable view of a race outcome
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    /// RFC 3339 time the report was produced
    pub timestamp: String,
    pub postal_code: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Winner latency, or the race timeout for `timeout`
    pub elapsed: JsonDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<LocationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeReport {
    pub fn from_outcome(outcome: &RaceOutcome, postal_code: &str) -> Self {
        let mut report = OutcomeReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            postal_code: postal_code.to_string(),
            outcome: OutcomeKind::Timeout,
            source: None,
            elapsed: JsonDuration::from_duration(Duration::ZERO),
            record: None,
            kind: None,
            status: None,
            error: None,
        };

        match outcome {
            RaceOutcome::Winner(LookupResult::Success {
                source,
                record,
                elapsed,
            }) => {
                report.outcome = OutcomeKind::Success;
                report.source = Some(*source);
                report.elapsed = JsonDuration::from_duration(*elapsed);
                report.record = Some(record.clone());
            }
            RaceOutcome::Winner(LookupResult::Failure {
                source,
                error,
                elapsed,
            }) => {
                report.outcome = OutcomeKind::Failure;
                report.source = Some(*source);
                report.elapsed = JsonDuration::from_duration(*elapsed);
                report.kind = Some(error.kind());
                report.status = error.status();
                report.error = Some(error.to_string());
            }
            RaceOutcome::Timeout { after } => {
                report.elapsed = JsonDuration::from_duration(*after);
            }
        }

        report
    }
}

/// Render a race outcome as a single-line JSON object
pub fn format_outcome(outcome: &RaceOutcome, postal_code: &str) -> Result<String> {
    let report = OutcomeReport::from_outcome(outcome, postal_code);
    serde_json::to_string(&report).context("Failed to serialize outcome")
}
