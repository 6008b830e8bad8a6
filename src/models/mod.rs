// src/models/mod.rs

//! Domain models for the closings watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entry;
mod snapshot;
mod source;
mod state;

// Re-export all public types
pub use config::{
    AlertConfig, AllowListConfig, Config, FetchConfig, LoggingConfig, PublishConfig,
    ReportConfig, StateConfig, StormConfig,
};
pub use entry::ClosingEntry;
pub use snapshot::{EntryRecord, Snapshot, SnapshotPayload};
pub use source::{SourceConfig, SourceLayout};
pub use state::StormState;

#[cfg(feature = "aws")]
pub(crate) use state::lenient_time;
