//! First-arrival race primitives
//!
//! A race launches several independent operations against one shared
//! [`Deadline`] and resolves to whichever message reaches the result channel
//! first, or to a timeout when the deadline fires before any message arrives.
//!
//! # Architecture
//!
//! ```text
//!                 Deadline (instant + cancellation token)
//!                /          |           \
//!         worker A      worker B     coordinator select
//!             \            |            /
//!              mpsc (capacity = workers) --> first_arrival()
//! ```
//!
//! - **Deadline**: cloned into every participant; all clones share one instant
//!   and one token. Cancelling the token is the only way a race is torn down.
//! - **first_arrival**: the single multiplexed wait. It is generic over the
//!   message type so the same primitive serves any set of workers.
//! - **RaceCoordinator** (`coordinator`): wires lookup workers into a race.

pub mod coordinator;

use crate::lookup::LookupResult;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

pub use coordinator::RaceCoordinator;

/// How a deadline-bound wait was interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The deadline instant passed
    Expired,
    /// The token was cancelled before the deadline instant
    Cancelled,
}

/// Shared deadline for one race
///
/// Cloning is cheap; every clone observes the same instant and the same
/// cancellation token.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    token: CancellationToken,
}

/// Stand-in for timeouts too large to add to the current instant
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

impl Deadline {
    /// Deadline `timeout` from now
    ///
    /// A timeout that overflows the clock is clamped to roughly 30 years.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);

        Self {
            at,
            token: CancellationToken::new(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel every participant still waiting on this deadline
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Guard that cancels the deadline when dropped
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Resolve once the deadline instant passes or the token is cancelled
    pub async fn done(&self) -> Interrupt {
        tokio::select! {
            _ = sleep_until(self.at) => Interrupt::Expired,
            _ = self.token.cancelled() => Interrupt::Cancelled,
        }
    }

    /// Run `fut` unless the deadline interrupts it first
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, Interrupt>
    where
        F: std::future::Future,
    {
        tokio::select! {
            output = fut => Ok(output),
            interrupt = self.done() => Err(interrupt),
        }
    }
}

/// Final value of one race
#[derive(Debug)]
pub enum RaceOutcome {
    /// The first message delivered, success or failure
    Winner(LookupResult),
    /// No message arrived before the deadline
    Timeout { after: Duration },
}

impl RaceOutcome {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RaceOutcome::Timeout { .. })
    }

    pub fn winner(&self) -> Option<&LookupResult> {
        match self {
            RaceOutcome::Winner(result) => Some(result),
            RaceOutcome::Timeout { .. } => None,
        }
    }
}

/// Wait for the first message on `rx` or for the deadline
///
/// Returns `None` when the deadline fires (or is cancelled) first. A message
/// received once the deadline instant has passed is late and is discarded,
/// even if its timer has not been polled yet. If every sender is dropped
/// without delivering, the wait falls through to the deadline.
pub async fn first_arrival<T>(rx: &mut mpsc::Receiver<T>, deadline: &Deadline) -> Option<T> {
    tokio::select! {
        biased;
        _ = deadline.done() => None,
        Some(message) = rx.recv() => {
            if deadline.is_expired() {
                None
            } else {
                Some(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let deadline = Deadline::after(Duration::from_secs(1));
        assert!(!deadline.is_expired());

        assert_eq!(deadline.done().await, Interrupt::Expired);
        assert!(deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_saturates_huge_timeout() {
        let deadline = Deadline::after(Duration::MAX);
        assert!(!deadline.is_expired());

        let result = deadline
            .guard(tokio::time::sleep(Duration::from_secs(3600)))
            .await;
        assert_eq!(result, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_instant_and_token() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let clone = deadline.clone();
        assert_eq!(deadline.at, clone.at);

        deadline.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.done().await, Interrupt::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_on_drop() {
        let deadline = Deadline::after(Duration::from_secs(5));
        {
            let _guard = deadline.cancel_on_drop();
            assert!(!deadline.is_cancelled());
        }
        assert!(deadline.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_completes_before_deadline() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let result = deadline
            .guard(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                7
            })
            .await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_interrupted_by_deadline() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let result = deadline
            .guard(tokio::time::sleep(Duration::from_secs(2)))
            .await;
        assert_eq!(result, Err(Interrupt::Expired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_arrival_takes_earliest_message() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let (tx, mut rx) = mpsc::channel(2);

        for (name, delay_ms) in [("slow", 800u64), ("fast", 200)] {
            let tx = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                let _ = tx.try_send(name);
            });
        }
        drop(tx);

        assert_eq!(first_arrival(&mut rx, &deadline).await, Some("fast"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_arrival_times_out() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let (tx, mut rx) = mpsc::channel::<&str>(2);

        for _ in 0..2 {
            let tx = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(2)).await;
                let _ = tx.try_send("late");
            });
        }
        drop(tx);

        let start = Instant::now();
        assert_eq!(first_arrival(&mut rx, &deadline).await, None);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(1));
        assert!(waited < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_arrival_all_senders_dropped() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let (tx, mut rx) = mpsc::channel::<u32>(1);
        drop(tx);

        assert_eq!(first_arrival(&mut rx, &deadline).await, None);
        assert!(deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_arrival_discards_message_queued_at_deadline() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let (tx, mut rx) = mpsc::channel(1);
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.try_send(1u32).unwrap();

        assert!(deadline.is_expired());
        assert_eq!(first_arrival(&mut rx, &deadline).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_arrival_ignores_workers_reporting_expiry() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let (tx, mut rx) = mpsc::channel(2);

        for _ in 0..2 {
            let tx = tx.clone();
            let deadline = deadline.clone();
            tokio::spawn(async move {
                let interrupt = deadline.done().await;
                let _ = tx.try_send(interrupt);
            });
        }
        drop(tx);

        assert_eq!(first_arrival(&mut rx, &deadline).await, None);
    }
}
