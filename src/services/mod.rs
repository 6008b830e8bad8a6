// src/services/mod.rs

//! Core services: text cleanup, extraction, scope filtering, ingestion and
//! storm alert decisions.

pub mod extract;
pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod storm;

// Re-export main types for convenience
pub use extract::{ExtractedPair, extract};
pub use filter::AllowList;
pub use ingest::Ingestor;
pub use normalize::normalize;
pub use storm::{Decision, StormAction, decide, reset_due};
