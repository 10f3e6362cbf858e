//! Race coordinator
//!
//! This module wires lookup workers into a race. The coordinator:
//! - Derives one deadline from the configured timeout
//! - Creates the result channel, sized to the number of collaborators
//! - Spawns one lookup task per collaborator
//! - Waits for the first message or the deadline
//! - Cancels whatever is still running once the race is decided

use super::{first_arrival, Deadline, RaceOutcome};
use crate::config::Config;
use crate::lookup::{run_lookup, Collaborator};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Orchestrates one race per call to [`RaceCoordinator::run`]
pub struct RaceCoordinator {
    client: Client,

    /// Collaborators raced against each other
    collaborators: Vec<Collaborator>,

    /// Time allowed for the whole race
    timeout: Duration,
}

impl RaceCoordinator {
    /// Create a coordinator from a validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.runtime.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Self::with_client(client, config.active_collaborators(), config.race.timeout())
    }

    /// Create a coordinator around an existing HTTP client
    pub fn with_client(
        client: Client,
        collaborators: Vec<Collaborator>,
        timeout: Duration,
    ) -> Result<Self> {
        if collaborators.is_empty() {
            anyhow::bail!("No collaborators configured for the race");
        }

        Ok(Self {
            client,
            collaborators,
            timeout,
        })
    }

    pub fn collaborators(&self) -> &[Collaborator] {
        &self.collaborators
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Race every collaborator for `postal_code`
    ///
    /// Resolves to the first message delivered, success or failure, or to
    /// [`RaceOutcome::Timeout`] when nothing arrives before the deadline.
    pub async fn run(&self, postal_code: &str) -> RaceOutcome {
        let deadline = Deadline::after(self.timeout);
        // Cancels the losers (or everyone, on timeout) however this returns
        let _cancel = deadline.cancel_on_drop();

        let (tx, mut rx) = mpsc::channel(self.collaborators.len());

        for collaborator in &self.collaborators {
            tokio::spawn(run_lookup(
                self.client.clone(),
                collaborator.clone(),
                postal_code.to_string(),
                deadline.clone(),
                tx.clone(),
            ));
        }
        // Only workers hold senders from here on
        drop(tx);

        debug!(
            workers = self.collaborators.len(),
            timeout = ?self.timeout,
            postal_code,
            "race started"
        );

        match first_arrival(&mut rx, &deadline).await {
            Some(result) => {
                info!(
                    source = %result.source(),
                    success = result.is_success(),
                    elapsed = ?result.elapsed(),
                    "race won"
                );
                RaceOutcome::Winner(result)
            }
            None => {
                info!(timeout = ?self.timeout, "race timed out");
                RaceOutcome::Timeout {
                    after: self.timeout,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{ErrorKind, LookupResult, Source};
    use crate::testutil::*;
    use axum::http::StatusCode;

    async fn race(
        brasilapi: (u64, StatusCode, &'static str),
        viacep: (u64, StatusCode, &'static str),
        timeout: Duration,
    ) -> RaceOutcome {
        let a = spawn_collaborator(Duration::from_millis(brasilapi.0), brasilapi.1, brasilapi.2).await;
        let b = spawn_collaborator(Duration::from_millis(viacep.0), viacep.1, viacep.2).await;

        let coordinator = RaceCoordinator::with_client(
            test_client(),
            vec![
                Collaborator::new(Source::BrasilApi, endpoint(a)),
                Collaborator::new(Source::ViaCep, endpoint(b)),
            ],
            timeout,
        )
        .unwrap();

        coordinator.run("01153000").await
    }

    #[test]
    fn test_requires_collaborators() {
        let result = RaceCoordinator::with_client(test_client(), vec![], Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_from_default_config() {
        let coordinator = RaceCoordinator::new(&Config::default()).unwrap();
        assert_eq!(coordinator.collaborators().len(), 2);
        assert_eq!(coordinator.timeout(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fast_success_wins() {
        let outcome = race(
            (200, StatusCode::OK, BRASILAPI_BODY),
            (800, StatusCode::OK, VIACEP_BODY),
            Duration::from_secs(1),
        )
        .await;

        match outcome {
            RaceOutcome::Winner(LookupResult::Success { source, record, .. }) => {
                assert_eq!(source, Source::BrasilApi);
                assert_eq!(record.postal_code.as_deref(), Some("01153000"));
            }
            other => panic!("expected BrasilAPI success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_either_collaborator_can_win() {
        let outcome = race(
            (800, StatusCode::OK, BRASILAPI_BODY),
            (100, StatusCode::OK, VIACEP_BODY),
            Duration::from_secs(2),
        )
        .await;

        let winner = outcome.winner().expect("expected a winner");
        assert_eq!(winner.source(), Source::ViaCep);
        assert!(winner.is_success());
    }

    #[tokio::test]
    async fn test_both_slow_times_out() {
        let started = std::time::Instant::now();
        let outcome = race(
            (2000, StatusCode::OK, BRASILAPI_BODY),
            (2000, StatusCode::OK, VIACEP_BODY),
            Duration::from_millis(500),
        )
        .await;

        assert!(outcome.is_timeout());
        assert!(started.elapsed() < Duration::from_millis(1500));
        match outcome {
            RaceOutcome::Timeout { after } => assert_eq!(after, Duration::from_millis(500)),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_both_slow_times_out_multi_thread() {
        let a = spawn_collaborator(Duration::from_secs(2), StatusCode::OK, BRASILAPI_BODY).await;
        let b = spawn_collaborator(Duration::from_secs(2), StatusCode::OK, VIACEP_BODY).await;
        let coordinator = RaceCoordinator::with_client(
            test_client(),
            vec![
                Collaborator::new(Source::BrasilApi, endpoint(a)),
                Collaborator::new(Source::ViaCep, endpoint(b)),
            ],
            Duration::from_millis(100),
        )
        .unwrap();

        for round in 0..20 {
            let outcome = coordinator.run("01153000").await;
            assert!(outcome.is_timeout(), "round {}: expected timeout, got {:?}", round, outcome);
        }
    }

    #[tokio::test]
    async fn test_huge_timeout_does_not_panic() {
        let a = spawn_collaborator(Duration::ZERO, StatusCode::OK, BRASILAPI_BODY).await;
        let coordinator = RaceCoordinator::with_client(
            test_client(),
            vec![Collaborator::new(Source::BrasilApi, endpoint(a))],
            Duration::MAX,
        )
        .unwrap();

        let outcome = coordinator.run("01153000").await;
        assert_eq!(outcome.winner().map(LookupResult::source), Some(Source::BrasilApi));
    }

    #[tokio::test]
    async fn test_fast_failure_wins_over_later_success() {
        let outcome = race(
            (100, StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            (500, StatusCode::OK, VIACEP_BODY),
            Duration::from_secs(1),
        )
        .await;

        match outcome {
            RaceOutcome::Winner(LookupResult::Failure { source, error, .. }) => {
                assert_eq!(source, Source::BrasilApi);
                assert_eq!(error.kind(), ErrorKind::BadStatus);
                assert_eq!(error.status(), Some(500));
            }
            other => panic!("expected BrasilAPI failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_error_wins_immediately() {
        let b = spawn_collaborator(Duration::from_millis(300), StatusCode::OK, VIACEP_BODY).await;
        let coordinator = RaceCoordinator::with_client(
            test_client(),
            vec![
                Collaborator::new(Source::BrasilApi, "http://[::1/{cep}"),
                Collaborator::new(Source::ViaCep, endpoint(b)),
            ],
            Duration::from_secs(1),
        )
        .unwrap();

        let outcome = coordinator.run("01153000").await;

        let winner = outcome.winner().expect("expected a winner");
        assert_eq!(winner.source(), Source::BrasilApi);
        assert_eq!(winner.error_kind(), Some(ErrorKind::BuildError));
    }

    #[tokio::test]
    async fn test_single_collaborator_race() {
        let a = spawn_collaborator(Duration::ZERO, StatusCode::OK, BRASILAPI_BODY).await;
        let coordinator = RaceCoordinator::with_client(
            test_client(),
            vec![Collaborator::new(Source::BrasilApi, endpoint(a))],
            Duration::from_secs(1),
        )
        .unwrap();

        let outcome = coordinator.run("01153000").await;
        assert!(outcome.winner().map(LookupResult::is_success).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_coordinator_runs_repeated_races() {
        let a = spawn_collaborator(Duration::from_millis(50), StatusCode::OK, BRASILAPI_BODY).await;
        let b = spawn_collaborator(Duration::from_millis(400), StatusCode::OK, VIACEP_BODY).await;
        let coordinator = RaceCoordinator::with_client(
            test_client(),
            vec![
                Collaborator::new(Source::BrasilApi, endpoint(a)),
                Collaborator::new(Source::ViaCep, endpoint(b)),
            ],
            Duration::from_secs(1),
        )
        .unwrap();

        for _ in 0..3 {
            let outcome = coordinator.run("01153000").await;
            assert_eq!(outcome.winner().map(LookupResult::source), Some(Source::BrasilApi));
        }
    }
}
