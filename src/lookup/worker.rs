//! Lookup worker
//!
//! A worker performs exactly one HTTP request against one collaborator, bound
//! to the race deadline, and delivers exactly one [`LookupResult`] on the
//! result channel whatever happens along the way.
//!
//! # Failure mapping
//!
//! | Step                   | Failure            | Kind              |
//! |------------------------|--------------------|-------------------|
//! | build request          | malformed endpoint | `build-error`     |
//! | send / read body       | transport, deadline, cancellation | `transport-error` |
//! | status check           | non-2xx            | `bad-status`      |
//! | decode body            | not the expected JSON object | `decode-error` |

use super::{Collaborator, LocationRecord, LookupError, LookupResult};
use crate::race::{Deadline, Interrupt};
use reqwest::Client;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Run one lookup and deliver its result
///
/// Never returns without attempting exactly one send. The channel is sized by
/// the coordinator so the send cannot block; a closed channel means the race
/// was already decided and the message is dropped.
pub async fn run_lookup(
    client: Client,
    collaborator: Collaborator,
    postal_code: String,
    deadline: Deadline,
    results: mpsc::Sender<LookupResult>,
) {
    let source = collaborator.source;
    let started = Instant::now();
    debug!(%source, endpoint = %collaborator.endpoint, "lookup started");

    let outcome = lookup(&client, &collaborator, &postal_code, &deadline).await;
    let elapsed = started.elapsed();

    let message = match outcome {
        Ok(record) => {
            debug!(%source, ?elapsed, "lookup succeeded");
            LookupResult::Success {
                source,
                record,
                elapsed,
            }
        }
        Err(error) => {
            debug!(%source, ?elapsed, kind = %error.kind(), %error, "lookup failed");
            LookupResult::Failure {
                source,
                error,
                elapsed,
            }
        }
    };

    match results.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Closed(_)) => {
            debug!(%source, "race already resolved, discarding result");
        }
        Err(TrySendError::Full(_)) => {
            warn!(%source, "result channel full, discarding result");
        }
    }
}

/// Perform the request and normalize the response
pub async fn lookup(
    client: &Client,
    collaborator: &Collaborator,
    postal_code: &str,
    deadline: &Deadline,
) -> Result<LocationRecord, LookupError> {
    let url = collaborator.url_for(postal_code);
    let request = client.get(url).build().map_err(LookupError::Build)?;

    let response = deadline
        .guard(client.execute(request))
        .await
        .map_err(interrupted)?
        .map_err(LookupError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        // Dropping the response releases the connection without reading the body
        drop(response);
        return Err(LookupError::BadStatus(status.as_u16()));
    }

    let body = deadline
        .guard(response.bytes())
        .await
        .map_err(interrupted)?
        .map_err(LookupError::Transport)?;

    collaborator.source.decode(&body).map_err(LookupError::Decode)
}

fn interrupted(interrupt: Interrupt) -> LookupError {
    match interrupt {
        Interrupt::Expired => LookupError::DeadlineExceeded,
        Interrupt::Cancelled => LookupError::Cancelled,
    }
}
