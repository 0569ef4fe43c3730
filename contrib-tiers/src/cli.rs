/// # contrib-tiers CLI Interface (Module)
///
/// This module implements the CLI for contrib-tiers: argument parsing, merging flags with the
/// config file and environment, choosing a contribution source, and printing the report.
///
/// All domain logic (aggregation, tier classification, GitHub access, rendering) lives in
/// [`contrib-tiers-core`]. This module is glue only.
///
/// ## Precedence
/// CLI flag, then environment (`CONTRIB_TIERS_REPO`, `GITHUB_TOKEN`), then config file, then
/// built-in defaults.
///
/// ## How To Use
/// - From a shell: `contrib-tiers --repo owner/name --format markdown`
/// - Programmatically / in tests: call [`run`] or [`report`] with a constructed [`Cli`].
///
/// [`contrib-tiers-core`]: ../../contrib_tiers_core/
use crate::load_config::{load_config, CliConfig, DEFAULT_CONFIG_FILE};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use contrib_tiers_core::aggregate::contributor_tiers;
use contrib_tiers_core::config::{ActivityWindow, RepoId, TierTable, WithinTierOrder};
use contrib_tiers_core::contract::ContributionSource;
use contrib_tiers_core::github::{GithubConfig, GithubStatsClient};
use contrib_tiers_core::render::{render, OutputFormat};
use contrib_tiers_core::snapshot::SnapshotSource;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI for contrib-tiers: group a repository's contributors into activity tiers.
#[derive(Parser, Debug, Default)]
#[clap(
    name = "contrib-tiers",
    version,
    about = "Group a repository's contributors into activity tiers for README and release notes"
)]
pub struct Cli {
    /// Path to the YAML config file (defaults to ./contrib-tiers.yaml when present)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Repository as OWNER/NAME
    #[clap(long, env = "CONTRIB_TIERS_REPO")]
    pub repo: Option<RepoId>,

    /// Only count activity on or after this date (YYYY-MM-DD)
    #[clap(long)]
    pub since: Option<NaiveDate>,

    /// Output format: text, markdown or json
    #[clap(long)]
    pub format: Option<OutputFormat>,

    /// Order within a tier: contribution or name
    #[clap(long)]
    pub order: Option<WithinTierOrder>,

    /// Read contribution records from a JSON snapshot instead of the GitHub API
    #[clap(long)]
    pub snapshot: Option<PathBuf>,
}

/// Fully merged settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub repo: RepoId,
    pub window: ActivityWindow,
    pub order: WithinTierOrder,
    pub format: OutputFormat,
    pub tiers: TierTable,
    pub github: GithubConfig,
    pub snapshot: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: Cli, config: CliConfig) -> Result<Self> {
        let repo = cli.repo.or(config.repo).context(
            "no repository given: pass --repo OWNER/NAME, set CONTRIB_TIERS_REPO or add `repo:` to the config file",
        )?;

        let window = match cli.since.or(config.since) {
            Some(date) => ActivityWindow::Since(date.and_time(NaiveTime::MIN).and_utc()),
            None => ActivityWindow::AllTime,
        };

        let defaults = GithubConfig::default();
        let github = GithubConfig {
            base_url: config.github.base_url.unwrap_or(defaults.base_url),
            token: config.github_token,
            max_polls: config.github.max_polls.unwrap_or(defaults.max_polls),
            poll_interval: config
                .github
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        };

        Ok(Settings {
            repo,
            window,
            order: cli.order.or(config.order).unwrap_or_default(),
            format: cli.format.or(config.format).unwrap_or_default(),
            tiers: config.tiers.unwrap_or_default(),
            github,
            snapshot: cli.snapshot,
        })
    }

    fn source(&self) -> Result<Box<dyn ContributionSource>> {
        Ok(match &self.snapshot {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using snapshot contribution source");
                Box::new(SnapshotSource::new(path.clone()))
            }
            None => {
                tracing::info!(base_url = %self.github.base_url, "Using GitHub contribution source");
                Box::new(
                    GithubStatsClient::new(self.github.clone())
                        .context("failed to construct GitHub client")?,
                )
            }
        })
    }
}

fn load_cli_config(explicit: Option<&Path>) -> Result<CliConfig> {
    match explicit {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            tracing::info!(path = DEFAULT_CONFIG_FILE, "Using config file from working directory");
            load_config(DEFAULT_CONFIG_FILE)
        }
        None => Ok(CliConfig::default().with_env_secrets()),
    }
}

/// Build the rendered report without printing it.
pub async fn report(cli: Cli) -> Result<String> {
    let config = load_cli_config(cli.config.as_deref())?;
    let settings = Settings::resolve(cli, config)?;
    tracing::info!(
        repo = %settings.repo,
        window = %settings.window,
        format = ?settings.format,
        order = ?settings.order,
        "Resolved settings"
    );

    let source = settings.source()?;
    let tiers = contributor_tiers(
        source.as_ref(),
        &settings.repo,
        &settings.window,
        &settings.tiers,
        settings.order,
    )
    .await
    .with_context(|| format!("failed to fetch contributions for {}", settings.repo))?;

    render(&tiers, &settings.repo, &settings.window, settings.format)
        .context("failed to render report")
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!(command = "report", "Starting contributor report");
    match report(cli).await {
        Ok(output) => {
            print!("{output}");
            tracing::info!(command = "report", "Report complete");
            Ok(())
        }
        Err(e) => {
            tracing::error!(command = "report", error = %e, "Report failed");
            Err(e)
        }
    }
}
