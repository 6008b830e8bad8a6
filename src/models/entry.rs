//! Closing entry data structure.

use chrono::{DateTime, FixedOffset};

use crate::error::{AppError, Result};

/// One reported closing, as produced by a single run.
///
/// Name and status are normalized text: non-empty, and the name carries no
/// leftover `<` from markup that escaped extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingEntry {
    name: String,
    status: String,
    observed_at: DateTime<FixedOffset>,
    source: String,
}

impl ClosingEntry {
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        observed_at: DateTime<FixedOffset>,
        source: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let status = status.into();
        let source = source.into();

        if name.is_empty() || status.is_empty() {
            return Err(AppError::extraction(source, "empty name or status"));
        }
        if name.contains('<') {
            return Err(AppError::extraction(
                source,
                format!("residual markup in name {name:?}"),
            ));
        }

        Ok(Self {
            name,
            status,
            observed_at,
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn observed_at(&self) -> DateTime<FixedOffset> {
        self.observed_at
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn test_new_accepts_clean_text() {
        let entry = ClosingEntry::new("Bristol Public Schools", "Closed", at(), "WFSB").unwrap();
        assert_eq!(entry.name(), "Bristol Public Schools");
        assert_eq!(entry.status(), "Closed");
        assert_eq!(entry.source(), "WFSB");
    }

    #[test]
    fn test_new_rejects_empty_fields() {
        assert!(ClosingEntry::new("", "Closed", at(), "WFSB").is_err());
        assert!(ClosingEntry::new("Bristol", "", at(), "WFSB").is_err());
    }

    #[test]
    fn test_new_rejects_residual_markup() {
        let err = ClosingEntry::new("Bristol <b", "Closed", at(), "WFSB").unwrap_err();
        assert!(matches!(err, AppError::Extraction { .. }));
    }
}
