#![doc = "contrib-tiers-core: core logic library for contrib-tiers."]

//! This crate contains the data model, the contribution source capability and the
//! aggregation/classification pipeline. It has no CLI concerns.
//!
//! # Usage
//! Build a [`config::TierTable`], pick a [`contract::ContributionSource`]
//! ([`github::GithubStatsClient`], [`snapshot::SnapshotSource`] or a mock) and call
//! [`aggregate::contributor_tiers`]. Render the result with [`render::render`].

pub mod aggregate;
pub mod config;
pub mod contract;
pub mod github;
pub mod render;
pub mod snapshot;
