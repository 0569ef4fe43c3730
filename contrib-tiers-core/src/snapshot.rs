//! File-backed [`ContributionSource`] for offline runs.
//!
//! Accepts either a saved GitHub `stats/contributors` payload or a plain list of
//! `{author, additions, deletions, commits?}` records. The activity window only applies
//! to the GitHub form; plain records carry no timestamps.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::{ActivityWindow, RepoId};
use crate::contract::{ContributionRecord, ContributionSource, FetchError};
use crate::github::{records_from_stats, ContributorStats};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotPayload {
    Records(Vec<ContributionRecord>),
    Github(Vec<ContributorStats>),
}

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse snapshot JSON into records.
pub fn parse_snapshot(
    content: &str,
    window: &ActivityWindow,
) -> Result<Vec<ContributionRecord>, FetchError> {
    let payload: SnapshotPayload = serde_json::from_str(content).map_err(|e| {
        FetchError::Malformed(format!(
            "expected a list of contribution records or GitHub contributor stats: {e}"
        ))
    })?;
    Ok(match payload {
        SnapshotPayload::Records(records) => {
            if !matches!(window, ActivityWindow::AllTime) {
                warn!(%window, "Activity window ignored for plain snapshot records");
            }
            records
        }
        SnapshotPayload::Github(stats) => records_from_stats(stats, window),
    })
}

#[async_trait]
impl ContributionSource for SnapshotSource {
    async fn fetch(
        &self,
        repo: &RepoId,
        window: &ActivityWindow,
    ) -> Result<Vec<ContributionRecord>, FetchError> {
        info!(path = %self.path.display(), repo = %repo, "Reading contribution snapshot");
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!(error = ?e, path = %self.path.display(), "Failed to read snapshot file");
            FetchError::Io(e)
        })?;
        let records = parse_snapshot(&content, window).map_err(|e| {
            error!(error = %e, path = %self.path.display(), "Failed to parse snapshot file");
            e
        })?;
        info!(records = records.len(), "Snapshot loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_records() {
        let json = r#"[{"author":"a","additions":3,"deletions":1},{"author":"b","additions":0,"deletions":2,"commits":4}]"#;
        let records = parse_snapshot(json, &ActivityWindow::AllTime).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ContributionRecord::new("a", 3, 1));
        assert_eq!(records[1].commits, 4);
    }

    #[test]
    fn parses_github_payload() {
        let json = r#"[{"author":{"login":"octo"},"total":2,"weeks":[{"w":0,"a":4,"d":1,"c":1},{"w":604800,"a":6,"d":0,"c":1}]}]"#;
        let records = parse_snapshot(json, &ActivityWindow::AllTime).unwrap();
        assert_eq!(records, vec![ContributionRecord {
            author: "octo".into(),
            additions: 10,
            deletions: 1,
            commits: 2,
        }]);
    }

    #[test]
    fn rejects_unknown_shape() {
        let err = parse_snapshot(r#"{"not":"a list"}"#, &ActivityWindow::AllTime).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
