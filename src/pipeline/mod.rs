//! Pipeline entry points.
//!
//! - `Runner::run`: one full watcher invocation
//! - `Runner::send_test_alert`: synthetic alert for checking delivery

pub mod run;

pub use run::{RunOutcome, Runner};
