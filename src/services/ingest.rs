// src/services/ingest.rs

//! Ingestion across all configured sources.
//!
//! Sources are fetched concurrently. A source that fails to fetch contributes
//! no entries; it never stops the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use futures::future;

use crate::error::{AppError, Result};
use crate::models::{ClosingEntry, Snapshot, SourceConfig};
use crate::services::{AllowList, extract};
use crate::utils::PageFetcher;

/// Fetch, extract and filter every source into one snapshot.
pub struct Ingestor {
    fetcher: Arc<dyn PageFetcher>,
    allow_list: AllowList,
    timeout: Duration,
}

impl Ingestor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, allow_list: AllowList, timeout: Duration) -> Self {
        Self {
            fetcher,
            allow_list,
            timeout,
        }
    }

    /// Build the snapshot for a run at `now`.
    ///
    /// Entries keep configured source order regardless of which fetch
    /// finishes first.
    pub async fn ingest(&self, sources: &[SourceConfig], now: DateTime<FixedOffset>) -> Snapshot {
        let results =
            future::join_all(sources.iter().map(|source| self.ingest_source(source, now))).await;

        let mut entries = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(found) => {
                    log::info!("Found {} entries from {}", found.len(), source.name);
                    entries.extend(found);
                }
                Err(e) => log::warn!("{e}; continuing without {}", source.name),
            }
        }

        Snapshot::new(now, entries)
    }

    async fn ingest_source(
        &self,
        source: &SourceConfig,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<ClosingEntry>> {
        log::info!("Fetching {} from {}", source.name, source.url);
        let html = self.fetch(source).await?;

        let entries = extract(&html, source.layout)
            .into_iter()
            .filter(|pair| self.allow_list.is_in_scope(&pair.name))
            .filter_map(
                |pair| match ClosingEntry::new(pair.name, pair.status, now, &source.name) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::debug!("Dropping entry: {e}");
                        None
                    }
                },
            )
            .collect();

        Ok(entries)
    }

    async fn fetch(&self, source: &SourceConfig) -> Result<String> {
        let request = self.fetcher.fetch(&source.url, self.timeout);
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(AppError::fetch(&source.name, e)),
            Err(_) => Err(AppError::fetch(
                &source.name,
                format!("timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceLayout;
    use crate::testing::{FakeFetcher, at};

    const A_URL: &str = "https://a.example.com/closings";
    const B_URL: &str = "https://b.example.com/closings";

    fn sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                name: "A".into(),
                url: A_URL.into(),
                layout: SourceLayout::StatusTable,
            },
            SourceConfig {
                name: "B".into(),
                url: B_URL.into(),
                layout: SourceLayout::HeadingParagraph,
            },
        ]
    }

    fn status_row(name: &str, status: &str) -> String {
        format!(
            r#"<FONT CLASS="orgname">{name}</FONT>: <FONT CLASS="status">{status}</FONT><BR>"#
        )
    }

    fn heading(name: &str, status: &str) -> String {
        format!("<h4>{name}</h4><p>{status}</p>")
    }

    fn ingestor(fetcher: FakeFetcher) -> Ingestor {
        Ingestor::new(
            Arc::new(fetcher),
            AllowList::new(["aces", "bristol public", "canton public", "plymouth"]),
            Duration::from_secs(2),
        )
    }

    fn names(snapshot: &Snapshot) -> Vec<(&str, &str)> {
        snapshot
            .entries
            .iter()
            .map(|e| (e.source(), e.name()))
            .collect()
    }

    #[tokio::test]
    async fn test_source_order_is_kept_when_first_source_is_slower() {
        let fetcher = FakeFetcher::default()
            .page_after(
                A_URL,
                status_row("ACES Central", "Closed")
                    + &status_row("Bristol Public Schools", "Closed"),
                Duration::from_millis(150),
            )
            .page(
                B_URL,
                heading("Canton Public Schools", "Delayed")
                    + &heading("Plymouth Schools", "Closed"),
            );

        let snapshot = ingestor(fetcher).ingest(&sources(), at(0)).await;

        assert_eq!(
            names(&snapshot),
            vec![
                ("A", "ACES Central"),
                ("A", "Bristol Public Schools"),
                ("B", "Canton Public Schools"),
                ("B", "Plymouth Schools"),
            ]
        );
    }

    #[tokio::test]
    async fn test_out_of_scope_names_are_dropped() {
        let fetcher = FakeFetcher::default()
            .page(A_URL, status_row("Hartford Public Schools", "Closed"))
            .page(B_URL, heading("Plymouth Schools", "Closed"));

        let snapshot = ingestor(fetcher).ingest(&sources(), at(0)).await;
        assert_eq!(names(&snapshot), vec![("B", "Plymouth Schools")]);
    }

    #[tokio::test]
    async fn test_failed_source_degrades_to_empty() {
        let fetcher = FakeFetcher::default().page(B_URL, heading("Plymouth Schools", "Closed"));

        let snapshot = ingestor(fetcher).ingest(&sources(), at(0)).await;
        assert_eq!(names(&snapshot), vec![("B", "Plymouth Schools")]);
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let fetcher = FakeFetcher::default()
            .page_after(
                A_URL,
                status_row("ACES Central", "Closed"),
                Duration::from_secs(30),
            )
            .page(B_URL, heading("Plymouth Schools", "Closed"));

        let ingestor = Ingestor::new(
            Arc::new(fetcher),
            AllowList::new(["aces", "plymouth"]),
            Duration::from_millis(50),
        );
        let snapshot = ingestor.ingest(&sources(), at(0)).await;
        assert_eq!(names(&snapshot), vec![("B", "Plymouth Schools")]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_gives_empty_snapshot() {
        let snapshot = ingestor(FakeFetcher::default()).ingest(&sources(), at(0)).await;
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generated_at, at(0));
    }

    #[tokio::test]
    async fn test_entries_share_run_time() {
        let fetcher = FakeFetcher::default()
            .page(A_URL, status_row("ACES Central", "Closed"))
            .page(B_URL, heading("Plymouth Schools", "Closed"));

        let snapshot = ingestor(fetcher).ingest(&sources(), at(3)).await;
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.entries.iter().all(|e| e.observed_at() == at(3)));
    }
}
