// src/services/storm.rs

//! Storm alert deduplication.
//!
//! At most one alert is sent per storm. A storm starts with the first run that
//! reports a closing while not yet notified, and ends silently once no closing
//! has been reported for the reset window.

use chrono::{DateTime, Duration, FixedOffset};

use crate::models::{Snapshot, StormState};

/// What the run must do about alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormAction {
    /// New storm: send an alert.
    EmitAlert,
    /// Storm ongoing and already alerted.
    Suppress,
    /// Nothing reported; any reset is silent.
    NoOp,
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: StormAction,

    /// State to persist if no alert is attempted. For `EmitAlert` this still
    /// has `notified = false`; see [`Decision::settle`].
    pub next: StormState,

    /// Whether this decision cleared a previous alert.
    pub reset: bool,
}

impl Decision {
    /// Final state once the alert attempt, if any, has finished.
    ///
    /// `notified` only becomes true on confirmed delivery, so a failed send is
    /// retried by the next run that still sees closings.
    pub fn settle(self, delivered: bool) -> StormState {
        match self.action {
            StormAction::EmitAlert => StormState {
                notified: delivered,
                ..self.next
            },
            StormAction::Suppress | StormAction::NoOp => self.next,
        }
    }
}

/// Decide the alert action and next state for a run at `now`.
pub fn decide(
    snapshot: &Snapshot,
    prior: &StormState,
    now: DateTime<FixedOffset>,
    reset_window: Duration,
) -> Decision {
    if !snapshot.is_empty() {
        let next = StormState {
            notified: prior.notified,
            last_nonempty_time: Some(prior.last_nonempty_time.map_or(now, |last| last.max(now))),
        };
        let action = if prior.notified {
            StormAction::Suppress
        } else {
            StormAction::EmitAlert
        };
        return Decision {
            action,
            next,
            reset: false,
        };
    }

    if prior.notified && reset_due(prior, now, reset_window) {
        return Decision {
            action: StormAction::NoOp,
            next: StormState {
                notified: false,
                ..*prior
            },
            reset: true,
        };
    }

    Decision {
        action: StormAction::NoOp,
        next: *prior,
        reset: false,
    }
}

/// True when the reset window has elapsed since the last closing was seen.
///
/// A missing timestamp counts as due, so a lost or corrupt record cannot keep
/// alerts suppressed forever.
pub fn reset_due(state: &StormState, now: DateTime<FixedOffset>, reset_window: Duration) -> bool {
    match state.last_nonempty_time {
        Some(last) => now.signed_duration_since(last) >= reset_window,
        None => true,
    }
}
