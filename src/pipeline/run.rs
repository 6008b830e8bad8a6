// src/pipeline/run.rs

//! One watcher invocation.
//!
//! Order of work:
//! 1. Ingest all sources into a snapshot
//! 2. Publish the snapshot (failure is logged only)
//! 3. Load storm state, decide, alert if needed
//! 4. Persist the settled state
//!
//! State is written only after the decision and its alert attempt complete,
//! so a run cancelled midway commits nothing.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use futures::FutureExt;

use crate::models::{Config, EntryRecord, SnapshotPayload, StormState};
use crate::notify::{AlertMessage, Notifier};
use crate::services::{AllowList, Ingestor, StormAction, decide};
use crate::storage::{SnapshotPublisher, StateStore};
use crate::utils::PageFetcher;

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Payload returned to the caller; empty entries when the run degraded.
    pub payload: SnapshotPayload,

    /// `None` when the run degraded before deciding.
    pub action: Option<StormAction>,

    pub alert_delivered: bool,

    /// State handed to the store, if the run got that far.
    pub state: Option<StormState>,
}

impl RunOutcome {
    fn degraded(payload: SnapshotPayload) -> Self {
        Self {
            payload,
            action: None,
            alert_delivered: false,
            state: None,
        }
    }
}

/// Wires ingestion, publishing, alerting and state persistence together.
pub struct Runner {
    config: Arc<Config>,
    ingestor: Ingestor,
    publisher: Arc<dyn SnapshotPublisher>,
    notifier: Arc<dyn Notifier>,
    state_store: Arc<dyn StateStore>,
}

impl Runner {
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn PageFetcher>,
        publisher: Arc<dyn SnapshotPublisher>,
        notifier: Arc<dyn Notifier>,
        state_store: Arc<dyn StateStore>,
    ) -> Self {
        let ingestor = Ingestor::new(
            fetcher,
            AllowList::from_config(&config.allow_list),
            Duration::from_secs(config.fetch.timeout_secs),
        );
        Self {
            config,
            ingestor,
            publisher,
            notifier,
            state_store,
        }
    }

    /// Run now, in the report zone.
    pub async fn run(&self) -> RunOutcome {
        self.run_at(self.config.report.now()).await
    }

    /// Run as of `now`. Never fails: anything unexpected, including a panic,
    /// yields an empty payload and leaves stored state untouched.
    pub async fn run_at(&self, now: DateTime<FixedOffset>) -> RunOutcome {
        match AssertUnwindSafe(self.execute(now)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                log::error!("Run aborted unexpectedly; returning empty snapshot");
                RunOutcome::degraded(SnapshotPayload::emergency(&self.config.report, &now))
            }
        }
    }

    async fn execute(&self, now: DateTime<FixedOffset>) -> RunOutcome {
        log::info!("Starting school closings fetch...");
        let snapshot = self.ingestor.ingest(&self.config.sources, now).await;
        log::info!("Total entries found: {}", snapshot.len());

        let payload = snapshot.to_payload(&self.config.report);
        if let Err(e) = self.publisher.publish(&payload).await {
            log::warn!("Snapshot publish failed (non-critical): {e}");
        }

        let prior = self.load_state().await;
        let decision = decide(&snapshot, &prior, now, self.config.storm.reset_window());

        let delivered = match decision.action {
            StormAction::EmitAlert => {
                let message =
                    AlertMessage::storm(&self.config.alert, snapshot.len(), &payload.last_updated);
                self.deliver(&message).await
            }
            StormAction::Suppress => {
                log::info!("Storm already alerted; suppressing notification");
                false
            }
            StormAction::NoOp => {
                if decision.reset {
                    log::info!(
                        "No closings for {}h; storm alert reset",
                        self.config.storm.reset_hours
                    );
                }
                false
            }
        };

        let next = decision.settle(delivered);
        if let Err(e) = self.state_store.save(&next).await {
            log::error!("Storm state save failed: {e}");
        }

        RunOutcome {
            payload,
            action: Some(decision.action),
            alert_delivered: delivered,
            state: Some(next),
        }
    }

    /// Load prior state; an unavailable store reads as idle.
    async fn load_state(&self) -> StormState {
        match self.state_store.load().await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                log::warn!("Storm state load failed, assuming idle: {e}");
                StormState::default()
            }
        }
    }

    async fn deliver(&self, message: &AlertMessage) -> bool {
        match self.notifier.notify(message).await {
            Ok(()) => {
                log::info!("Storm alert sent");
                true
            }
            Err(e) => {
                log::warn!("Storm alert not delivered, will retry next run: {e}");
                false
            }
        }
    }

    /// Diagnostic path: send one synthetic alert and return a synthetic
    /// payload. Ingestion, publishing and storm state are not touched.
    pub async fn send_test_alert(&self) -> SnapshotPayload {
        let now = self.config.report.now();
        let stamp = self.config.report.format(&now);
        let payload = SnapshotPayload {
            last_updated: stamp.clone(),
            entries: vec![EntryRecord {
                name: "Test School".to_string(),
                status: "Closed (test)".to_string(),
                update_time: stamp,
                source: "Test Event".to_string(),
            }],
        };

        let message =
            AlertMessage::storm(&self.config.alert, payload.entries.len(), &payload.last_updated);
        self.deliver(&message).await;
        payload
    }
}
