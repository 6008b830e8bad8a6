//! In-memory capabilities and fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::error::{AppError, Result};
use crate::models::{ClosingEntry, SnapshotPayload, StormState};
use crate::notify::{AlertMessage, Notifier};
use crate::storage::{SnapshotPublisher, StateStore};
use crate::utils::PageFetcher;

/// T0 + `hours`, in US Eastern standard time. T0 is 2025-01-06 06:00 EST.
pub fn at(hours: i64) -> DateTime<FixedOffset> {
    let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
    (Utc.with_ymd_and_hms(2025, 1, 6, 11, 0, 0).unwrap() + chrono::Duration::hours(hours))
        .with_timezone(&eastern)
}

pub fn entry(name: &str, observed_at: DateTime<FixedOffset>) -> ClosingEntry {
    ClosingEntry::new(name, "Closed", observed_at, "Test").unwrap()
}

/// Serves canned pages, optionally after a delay. Unknown URLs fail.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, (String, Duration)>,
}

impl FakeFetcher {
    pub fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.page_after(url, html, Duration::ZERO)
    }

    pub fn page_after(mut self, url: &str, html: impl Into<String>, delay: Duration) -> Self {
        self.pages.insert(url.to_string(), (html.into(), delay));
        self
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        let (html, delay) = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "connection refused"))?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(html)
    }
}

#[derive(Default)]
pub struct MemoryPublisher {
    pub fail: bool,
    pub published: Mutex<Vec<SnapshotPayload>>,
}

impl MemoryPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl SnapshotPublisher for MemoryPublisher {
    async fn publish(&self, payload: &SnapshotPayload) -> Result<()> {
        if self.fail {
            return Err(AppError::publish("bucket unavailable"));
        }
        self.published.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<AlertMessage>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &AlertMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(AppError::notify("delivery not confirmed"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStateStore {
    pub fail_load: bool,
    pub fail_save: bool,
    pub state: Mutex<Option<StormState>>,
    pub saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn with_state(state: StormState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<StormState> {
        *self.state.lock().unwrap()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<StormState>> {
        if self.fail_load {
            return Err(AppError::state("table unavailable"));
        }
        Ok(self.current())
    }

    async fn save(&self, state: &StormState) -> Result<()> {
        *self.saves.lock().unwrap() += 1;
        if self.fail_save {
            return Err(AppError::state("table unavailable"));
        }
        *self.state.lock().unwrap() = Some(*state);
        Ok(())
    }
}
