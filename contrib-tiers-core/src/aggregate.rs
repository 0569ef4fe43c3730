//! High-level pipeline: fetch → aggregate → classify contributors of one repository.
//!
//! This module holds the orchestration for producing a [`TierReport`]:
//!   - Fetches contribution records through any [`ContributionSource`]
//!   - Sums additions/deletions/commits per unique author ([`aggregate`])
//!   - Assigns every author to exactly one tier of a [`TierTable`] ([`classify`])
//!
//! # Responsibilities
//! - Fail only when fetching fails; classification of fetched data never fails
//! - Authors with no recorded additions or deletions are left out entirely
//! - Output is a pure function of the fetched records, so identical data yields identical reports
//!
//! # Ordering
//! - Tiers appear highest threshold first; empty tiers are omitted
//! - Inside a tier, [`WithinTierOrder`] decides; ties always fall back to the author identifier
//!
//! # Navigation
//! - Main entrypoint: [`contributor_tiers`]
//! - Supporting types: [`ContributorTotal`], [`TierGroup`], [`TierReport`]

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::{ActivityWindow, RepoId, TierTable, WithinTierOrder};
use crate::contract::{ContributionRecord, ContributionSource, FetchError};

/// Per-author totals over the queried window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorTotal {
    pub author: String,
    pub additions: u64,
    pub deletions: u64,
    pub commits: u64,
}

/// All contributors assigned to one tier, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierGroup {
    pub tier: String,
    pub min_additions: u64,
    pub contributors: Vec<ContributorTotal>,
}

impl TierGroup {
    pub fn authors(&self) -> Vec<&str> {
        self.contributors.iter().map(|c| c.author.as_str()).collect()
    }
}

/// Result of classification: non-empty tiers, highest threshold first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TierReport {
    pub tiers: Vec<TierGroup>,
}

impl TierReport {
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn contributor_count(&self) -> usize {
        self.tiers.iter().map(|g| g.contributors.len()).sum()
    }

    pub fn group(&self, tier: &str) -> Option<&TierGroup> {
        self.tiers.iter().find(|g| g.tier == tier)
    }

    /// `tier name -> [author]`, each list in display order.
    pub fn authors_by_tier(&self) -> BTreeMap<&str, Vec<&str>> {
        self.tiers
            .iter()
            .map(|g| (g.tier.as_str(), g.authors()))
            .collect()
    }
}

/// Sum records per unique author, dropping authors with neither additions nor deletions.
///
/// The result is sorted by author identifier.
pub fn aggregate(records: &[ContributionRecord]) -> Vec<ContributorTotal> {
    let mut by_author: BTreeMap<&str, ContributorTotal> = BTreeMap::new();
    for record in records {
        let total = by_author
            .entry(record.author.as_str())
            .or_insert_with(|| ContributorTotal {
                author: record.author.clone(),
                additions: 0,
                deletions: 0,
                commits: 0,
            });
        total.additions = total.additions.saturating_add(record.additions);
        total.deletions = total.deletions.saturating_add(record.deletions);
        total.commits = total.commits.saturating_add(record.commits);
    }

    let totals: Vec<ContributorTotal> = by_author
        .into_values()
        .filter(|t| {
            let counted = t.additions > 0 || t.deletions > 0;
            if !counted {
                debug!(author = %t.author, "Skipping author with zero recorded contributions");
            }
            counted
        })
        .collect();
    debug!(
        records = records.len(),
        authors = totals.len(),
        "Aggregated contribution records"
    );
    totals
}

/// Assign every total to the highest tier it reaches.
pub fn classify(
    totals: Vec<ContributorTotal>,
    table: &TierTable,
    order: WithinTierOrder,
) -> TierReport {
    let mut groups: Vec<TierGroup> = table
        .tiers()
        .iter()
        .map(|t| TierGroup {
            tier: t.name.clone(),
            min_additions: t.min_additions,
            contributors: Vec::new(),
        })
        .collect();

    for total in totals {
        let group = table
            .tier_for(total.additions)
            .and_then(|tier| groups.iter_mut().find(|g| g.tier == tier.name));
        match group {
            Some(group) => {
                debug!(author = %total.author, additions = total.additions, tier = %group.tier, "Classified contributor");
                group.contributors.push(total);
            }
            None => {
                debug!(author = %total.author, additions = total.additions, "Contributor below every tier threshold");
            }
        }
    }

    for group in &mut groups {
        sort_within_tier(&mut group.contributors, order);
    }
    groups.retain(|g| !g.contributors.is_empty());

    TierReport { tiers: groups }
}

fn sort_within_tier(contributors: &mut [ContributorTotal], order: WithinTierOrder) {
    match order {
        WithinTierOrder::Contribution => contributors.sort_by(|a, b| {
            b.additions
                .cmp(&a.additions)
                .then_with(|| a.author.cmp(&b.author))
        }),
        WithinTierOrder::Name => contributors.sort_by(|a, b| a.author.cmp(&b.author)),
    }
}

/// Entrypoint: fetch records for `repo` from `source` and group the authors into tiers.
///
/// An empty record set yields an empty report. Only the fetch can fail.
pub async fn contributor_tiers<S>(
    source: &S,
    repo: &RepoId,
    window: &ActivityWindow,
    table: &TierTable,
    order: WithinTierOrder,
) -> Result<TierReport, FetchError>
where
    S: ContributionSource + ?Sized,
{
    info!(repo = %repo, window = %window, "[TIERS] Fetching contribution records");
    let records = match source.fetch(repo, window).await {
        Ok(records) => {
            info!(repo = %repo, records = records.len(), "[TIERS] Fetch succeeded");
            records
        }
        Err(e) => {
            error!(repo = %repo, error = %e, "[TIERS][ERROR] Fetch failed");
            return Err(e);
        }
    };

    let totals = aggregate(&records);
    let report = classify(totals, table, order);
    info!(
        repo = %repo,
        tiers = report.tiers.len(),
        contributors = report.contributor_count(),
        "[TIERS] Classification complete"
    );
    Ok(report)
}
