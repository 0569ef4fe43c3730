//! # contract: the seam between contribution data and classification
//!
//! This module defines the single capability the aggregator depends on
//! ([`ContributionSource`]) together with the record type it yields and the
//! error it may fail with.
//!
//! ## Interface & Extensibility
//! - Implement [`ContributionSource`] to add a new data origin (hosted API, snapshot file, ...).
//! - The method is async and returns a [`FetchError`] on any failure to obtain or decode data.
//! - Sources never mutate remote state.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so `MockContributionSource` is available under
//!   `cfg(test)` or with the `test-export-mocks` feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::{ActivityWindow, RepoId};

/// A single author's lines added/removed within the queried window.
///
/// A source may emit more than one record per author; the aggregator sums them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Author identifier as known to the source (e.g. a GitHub login).
    pub author: String,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default)]
    pub commits: u64,
}

impl ContributionRecord {
    pub fn new(author: impl Into<String>, additions: u64, deletions: u64) -> Self {
        Self {
            author: author.into(),
            additions,
            deletions,
            commits: 0,
        }
    }
}

/// Failure to obtain contribution data from a source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source could not be reached (DNS, TLS, connection reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The source answered with a non-success HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The hosting API was still computing statistics after every poll attempt.
    #[error("statistics for {repo} still pending after {attempts} attempts")]
    StatsPending { repo: String, attempts: u32 },

    /// The payload did not have the expected shape.
    #[error("malformed contribution data: {0}")]
    Malformed(String),

    /// A local input could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

/// Capability for retrieving contribution records for a repository.
///
/// Implemented by the GitHub statistics client, by the snapshot file reader and by
/// test mocks. The trait is `Send + Sync` and intended for async/await usage.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// Return every contribution record visible to the caller for `repo` within `window`.
    async fn fetch(
        &self,
        repo: &RepoId,
        window: &ActivityWindow,
    ) -> Result<Vec<ContributionRecord>, FetchError>;
}
