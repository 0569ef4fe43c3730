use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// `owner/name` identifier of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    owner: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoIdError {
    #[error("repository must be given as OWNER/NAME, got {0:?}")]
    Format(String),
}

impl RepoId {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepoId {
    type Err = RepoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RepoIdError::Format(s.to_string());
        let (owner, name) = s.split_once('/').ok_or_else(bad)?;
        let valid = |seg: &str| {
            !seg.is_empty() && !seg.contains('/') && !seg.chars().any(char::is_whitespace)
        };
        if !valid(owner) || !valid(name) {
            return Err(bad());
        }
        Ok(RepoId {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for RepoId {
    type Error = RepoIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(value: RepoId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Period of activity that counts towards an author's totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityWindow {
    #[default]
    AllTime,
    /// Only activity at or after this instant.
    Since(DateTime<Utc>),
}

impl ActivityWindow {
    /// Whether a bucket of activity starting at `unix_secs` falls inside the window.
    pub fn includes(&self, unix_secs: i64) -> bool {
        match self {
            ActivityWindow::AllTime => true,
            ActivityWindow::Since(since) => unix_secs >= since.timestamp(),
        }
    }
}

impl fmt::Display for ActivityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityWindow::AllTime => write!(f, "all-time"),
            ActivityWindow::Since(since) => write!(f, "since {}", since.format("%Y-%m-%d")),
        }
    }
}

/// A named bucket with an inclusive lower bound on total additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub min_additions: u64,
}

impl Tier {
    pub fn new(name: impl Into<String>, min_additions: u64) -> Self {
        Self {
            name: name.into(),
            min_additions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    #[error("at least one tier is required")]
    Empty,
    #[error("tier names must not be empty")]
    BlankName,
    #[error("duplicate tier name {0:?}")]
    DuplicateName(String),
    #[error("tiers {first:?} and {second:?} share threshold {min_additions}")]
    DuplicateThreshold {
        first: String,
        second: String,
        min_additions: u64,
    },
    #[error("lowest tier {name:?} must start at 0 additions, starts at {min_additions}")]
    NoFloor { name: String, min_additions: u64 },
}

/// Ordered (threshold, name) pairs, held highest threshold first.
///
/// Invariants: non-empty, unique names, unique thresholds, lowest threshold is `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self, TierError> {
        if tiers.is_empty() {
            return Err(TierError::Empty);
        }
        if tiers.iter().any(|t| t.name.trim().is_empty()) {
            return Err(TierError::BlankName);
        }
        for (i, tier) in tiers.iter().enumerate() {
            if tiers[..i].iter().any(|t| t.name == tier.name) {
                return Err(TierError::DuplicateName(tier.name.clone()));
            }
        }

        tiers.sort_by(|a, b| b.min_additions.cmp(&a.min_additions));
        for pair in tiers.windows(2) {
            if pair[0].min_additions == pair[1].min_additions {
                return Err(TierError::DuplicateThreshold {
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                    min_additions: pair[0].min_additions,
                });
            }
        }
        if let Some(floor) = tiers.last() {
            if floor.min_additions != 0 {
                return Err(TierError::NoFloor {
                    name: floor.name.clone(),
                    min_additions: floor.min_additions,
                });
            }
        }

        let table = TierTable { tiers };
        table.trace_loaded();
        Ok(table)
    }

    /// Tiers, highest threshold first.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// The highest tier whose threshold is `<=` `additions`.
    pub fn tier_for(&self, additions: u64) -> Option<&Tier> {
        self.tiers.iter().find(|t| additions >= t.min_additions)
    }

    pub fn trace_loaded(&self) {
        info!(tiers = self.tiers.len(), "Loaded tier table");
        debug!(tiers = ?self.tiers, "Tier table (full debug)");
    }
}

impl Default for TierTable {
    fn default() -> Self {
        TierTable {
            tiers: vec![
                Tier::new("core", 100),
                Tier::new("frequent", 10),
                Tier::new("occasional", 0),
            ],
        }
    }
}

impl TryFrom<Vec<Tier>> for TierTable {
    type Error = TierError;

    fn try_from(value: Vec<Tier>) -> Result<Self, Self::Error> {
        TierTable::new(value)
    }
}

impl From<TierTable> for Vec<Tier> {
    fn from(value: TierTable) -> Self {
        value.tiers
    }
}

/// Ordering of contributors inside one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithinTierOrder {
    /// Additions descending, then author identifier ascending.
    #[default]
    Contribution,
    /// Author identifier ascending.
    Name,
}

impl FromStr for WithinTierOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contribution" | "contributions" => Ok(WithinTierOrder::Contribution),
            "name" | "author" => Ok(WithinTierOrder::Name),
            other => Err(format!("unknown order {other:?}, expected contribution or name")),
        }
    }
}
