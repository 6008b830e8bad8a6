//! Storage capabilities: snapshot publishing and storm state persistence.
//!
//! ## Backends
//!
//! ```text
//! LocalStorage   {root}/school_closings.json   published snapshot
//!                {root}/state.json             storm state
//! S3Publisher    s3://{bucket}/{key}           published snapshot   (feature "aws")
//! DynamoStateStore  {table}[id = {key}]        storm state          (feature "aws")
//! ```
//!
//! ## Concurrency
//!
//! State persistence is a plain read-then-write with last-writer-wins. Two
//! overlapping runs can both read `notified = false` and both alert. Runs are
//! expected not to overlap, so no lock is taken.

pub mod local;

#[cfg(feature = "aws")]
pub mod dynamo;
#[cfg(feature = "aws")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{SnapshotPayload, StormState};

// Re-export for convenience
pub use local::LocalStorage;

/// Sink for the published snapshot document.
#[async_trait]
pub trait SnapshotPublisher: Send + Sync {
    async fn publish(&self, payload: &SnapshotPayload) -> Result<()>;
}

/// Get/put store for the single storm state record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored state; `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<StormState>>;

    async fn save(&self, state: &StormState) -> Result<()>;
}
