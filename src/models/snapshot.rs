//! Snapshot of one run and its published JSON form.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::{ClosingEntry, ReportConfig};

/// The filtered entries produced by one run, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generated_at: DateTime<FixedOffset>,
    pub entries: Vec<ClosingEntry>,
}

impl Snapshot {
    pub fn new(generated_at: DateTime<FixedOffset>, entries: Vec<ClosingEntry>) -> Self {
        Self {
            generated_at,
            entries,
        }
    }

    pub fn empty(generated_at: DateTime<FixedOffset>) -> Self {
        Self::new(generated_at, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render the snapshot in its published form.
    pub fn to_payload(&self, report: &ReportConfig) -> SnapshotPayload {
        SnapshotPayload {
            last_updated: report.format(&self.generated_at),
            entries: self
                .entries
                .iter()
                .map(|entry| EntryRecord::from_entry(entry, report))
                .collect(),
        }
    }
}

/// Published JSON document consumed by the public status page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotPayload {
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    pub entries: Vec<EntryRecord>,
}

impl SnapshotPayload {
    /// Payload with no entries, returned when a run cannot complete.
    pub fn emergency(report: &ReportConfig, at: &DateTime<FixedOffset>) -> Self {
        Self {
            last_updated: report.format(at),
            entries: Vec::new(),
        }
    }
}

/// Wire record for a single entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct EntryRecord {
    pub name: String,
    pub status: String,
    pub update_time: String,
    pub source: String,
}

impl EntryRecord {
    fn from_entry(entry: &ClosingEntry, report: &ReportConfig) -> Self {
        Self {
            name: entry.name().to_string(),
            status: entry.status().to_string(),
            update_time: report.format(&entry.observed_at()),
            source: entry.source().to_string(),
        }
    }
}
