//! Storm notification state persisted between runs.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The only memory shared between runs.
///
/// `notified` is set only after an alert delivery was confirmed.
/// `last_nonempty_time` moves to the run time whenever a run reports at
/// least one closing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StormState {
    #[serde(default)]
    pub notified: bool,

    /// Stored as an ISO-8601 string; an unparsable value loads as `None`.
    #[serde(default, with = "lenient_time")]
    pub last_nonempty_time: Option<DateTime<FixedOffset>>,
}

pub(crate) mod lenient_time {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<FixedOffset>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => s.serialize_some(&at.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn parse(raw: &str) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(raw).ok()
    }
}
