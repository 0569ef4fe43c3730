/// `load_config` module: Loads a static YAML config and injects secrets from the environment.
///
/// This is the only place where user-supplied YAML is parsed and mapped onto the strongly-typed
/// settings of `contrib-tiers-core` (repository id, tier table, output format, GitHub settings).
///
/// # Responsibilities
/// - Parse the YAML file into typed sections; tier tables are validated while parsing
/// - Inject the GitHub token from `GITHUB_TOKEN` (or `GH_TOKEN`); tokens never live in the file
/// - Fail with a diagnostic naming the file when it cannot be read or parsed
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use chrono::NaiveDate;
use contrib_tiers_core::config::{RepoId, TierTable, WithinTierOrder};
use contrib_tiers_core::render::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "contrib-tiers.yaml";

const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub repo: Option<RepoId>,
    #[serde(default)]
    pub since: Option<NaiveDate>,
    #[serde(default)]
    pub order: Option<WithinTierOrder>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub tiers: Option<TierTable>,
    #[serde(skip)]
    pub github_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GithubSection {
    pub base_url: Option<String>,
    pub max_polls: Option<u32>,
    pub poll_interval_ms: Option<u64>,
}

impl CliConfig {
    /// Fill secret fields from the process environment.
    pub fn with_env_secrets(mut self) -> Self {
        self.github_token = TOKEN_VARS.iter().find_map(|var| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| {
                    info!(var, "GitHub token found in env");
                    v
                })
        });
        if self.github_token.is_none() {
            info!("No GitHub token in env; using unauthenticated requests");
        }
        self
    }
}

/// Loads a static YAML config file (no secrets) and injects required env vars for secrets.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid config with every section defaulted.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default().with_env_secrets());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path_ref));
        }
    };

    info!(
        repo = ?config.repo.as_ref().map(|r| r.to_string()),
        custom_tiers = config.tiers.is_some(),
        "Config loaded"
    );
    Ok(config.with_env_secrets())
}
