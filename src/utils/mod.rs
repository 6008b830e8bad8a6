//! Utility functions and helpers.

pub mod http;

pub use http::{HttpFetcher, PageFetcher};
