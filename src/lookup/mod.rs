//! Address lookup workers
//!
//! This module defines everything a single lookup produces: the normalized
//! [`LocationRecord`], the per-worker error taxonomy and the [`LookupResult`]
//! message each worker delivers to the race coordinator.
//!
//! # Collaborators
//!
//! The set of remote services is closed (see [`Source`]). Each one has its own
//! wire format, handled in `provider`, but they all normalize into the same
//! record so the coordinator never looks at collaborator-specific fields.
//!
//! # Modules
//!
//! - `provider`: collaborator identities, endpoint rendering and body decoding
//! - `worker`: the lookup task (one request, exactly one result message)

pub mod provider;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use provider::{Collaborator, Source};
pub use worker::run_lookup;

/// Normalized address record
///
/// Field presence depends on the collaborator that produced it; consumers must
/// not assume any field is filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("cep", &self.postal_code),
            ("state", &self.state),
            ("city", &self.city),
            ("neighborhood", &self.neighborhood),
            ("street", &self.street),
        ];

        let mut first = true;
        for (name, value) in fields {
            if let Some(value) = value {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{}={}", name, value)?;
                first = false;
            }
        }

        if first {
            write!(f, "(empty record)")?;
        }
        Ok(())
    }
}

/// Coarse error classification reported alongside every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    BuildError,
    TransportError,
    BadStatus,
    DecodeError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BuildError => "build-error",
            ErrorKind::TransportError => "transport-error",
            ErrorKind::BadStatus => "bad-status",
            ErrorKind::DecodeError => "decode-error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single lookup failed
///
/// Every variant is captured into a [`LookupResult::Failure`]; none of them
/// abort the process.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The request could not be constructed (malformed endpoint)
    #[error("failed to build request: {0}")]
    Build(#[source] reqwest::Error),

    /// Connection, DNS or protocol failure reported by the HTTP client
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The shared race deadline passed while the request was in flight
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The race was decided (or abandoned) before this lookup finished
    #[error("request cancelled")]
    Cancelled,

    /// The collaborator answered with a non-success status code
    #[error("non-success status: {0}")]
    BadStatus(u16),

    /// The body was not a JSON object of the expected shape
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::Build(_) => ErrorKind::BuildError,
            LookupError::Transport(_) | LookupError::DeadlineExceeded | LookupError::Cancelled => {
                ErrorKind::TransportError
            }
            LookupError::BadStatus(_) => ErrorKind::BadStatus,
            LookupError::Decode(_) => ErrorKind::DecodeError,
        }
    }

    /// HTTP status carried by a `bad-status` failure
    pub fn status(&self) -> Option<u16> {
        match self {
            LookupError::BadStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Message delivered by a lookup worker through the result channel
#[derive(Debug)]
pub enum LookupResult {
    Success {
        source: Source,
        record: LocationRecord,
        elapsed: Duration,
    },
    Failure {
        source: Source,
        error: LookupError,
        elapsed: Duration,
    },
}

impl LookupResult {
    pub fn source(&self) -> Source {
        match self {
            LookupResult::Success { source, .. } | LookupResult::Failure { source, .. } => *source,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            LookupResult::Success { elapsed, .. } | LookupResult::Failure { elapsed, .. } => *elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LookupResult::Success { .. })
    }

    /// Error kind for failures, `None` for successes
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            LookupResult::Success { .. } => None,
            LookupResult::Failure { error, .. } => Some(error.kind()),
        }
    }
}
