//! Formatting of a [`TierReport`] for terminals, READMEs and machines.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::aggregate::TierReport;
use crate::config::{ActivityWindow, RepoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown format {other:?}, expected text, markdown or json"
            )),
        }
    }
}

pub fn render(
    report: &TierReport,
    repo: &RepoId,
    window: &ActivityWindow,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(report, repo, window)),
        OutputFormat::Markdown => Ok(render_markdown(report)),
        OutputFormat::Json => render_json(report, repo, window),
    }
}

fn render_text(report: &TierReport, repo: &RepoId, window: &ActivityWindow) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Contributors to {repo} ({window})");
    if report.is_empty() {
        let _ = writeln!(out, "No contributors found.");
        return out;
    }

    let width = report
        .tiers
        .iter()
        .flat_map(|g| g.contributors.iter())
        .map(|c| c.author.chars().count())
        .max()
        .unwrap_or(0);

    for group in &report.tiers {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} (>= {} additions)", group.tier, group.min_additions);
        for c in &group.contributors {
            let _ = writeln!(
                out,
                "  {:<width$}  +{} -{}",
                c.author,
                c.additions,
                c.deletions,
                width = width
            );
        }
    }
    out
}

fn render_markdown(report: &TierReport) -> String {
    let mut out = String::from("## Contributors\n");
    if report.is_empty() {
        out.push_str("\n_No contributors found._\n");
        return out;
    }
    for group in &report.tiers {
        let _ = writeln!(out, "\n### {}\n", capitalize(&group.tier));
        for author in group.authors() {
            let _ = writeln!(out, "- @{author}");
        }
    }
    out
}

fn render_json(
    report: &TierReport,
    repo: &RepoId,
    window: &ActivityWindow,
) -> Result<String, serde_json::Error> {
    let tiers: Vec<_> = report
        .tiers
        .iter()
        .map(|g| {
            json!({
                "tier": g.tier,
                "min_additions": g.min_additions,
                "authors": g.authors(),
            })
        })
        .collect();
    let mut out = serde_json::to_string_pretty(&json!({
        "repo": repo.to_string(),
        "window": window.to_string(),
        "tiers": tiers,
    }))?;
    out.push('\n');
    Ok(out)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, classify};
    use crate::config::{TierTable, WithinTierOrder};
    use crate::contract::ContributionRecord;

    fn sample() -> TierReport {
        let records = vec![
            ContributionRecord::new("alice", 120, 3),
            ContributionRecord::new("bob", 45, 0),
            ContributionRecord::new("carol", 9, 9),
        ];
        classify(
            aggregate(&records),
            &TierTable::default(),
            WithinTierOrder::Contribution,
        )
    }

    fn repo() -> RepoId {
        "owasp/scsvs".parse().unwrap()
    }

    #[test]
    fn text_lists_tiers_in_order() {
        let out = render(&sample(), &repo(), &ActivityWindow::AllTime, OutputFormat::Text).unwrap();
        let core = out.find("core (>= 100 additions)").unwrap();
        let frequent = out.find("frequent (>= 10 additions)").unwrap();
        let occasional = out.find("occasional (>= 0 additions)").unwrap();
        assert!(core < frequent && frequent < occasional);
        assert!(out.contains("  alice  +120 -3"));
        assert!(out.starts_with("Contributors to owasp/scsvs (all-time)"));
    }

    #[test]
    fn text_reports_empty() {
        let out = render(
            &TierReport::default(),
            &repo(),
            &ActivityWindow::AllTime,
            OutputFormat::Text,
        )
        .unwrap();
        assert!(out.contains("No contributors found."));
    }

    #[test]
    fn markdown_has_sections_and_mentions() {
        let out = render(&sample(), &repo(), &ActivityWindow::AllTime, OutputFormat::Markdown)
            .unwrap();
        assert!(out.starts_with("## Contributors\n"));
        assert!(out.contains("### Core\n\n- @alice\n"));
        assert!(out.contains("### Frequent\n\n- @bob\n"));
        assert!(out.contains("### Occasional\n\n- @carol\n"));
    }

    #[test]
    fn json_keeps_tier_order() {
        let out = render(&sample(), &repo(), &ActivityWindow::AllTime, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["repo"], "owasp/scsvs");
        let tiers = value["tiers"].as_array().unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0]["tier"], "core");
        assert_eq!(tiers[0]["authors"][0], "alice");
        assert_eq!(tiers[2]["tier"], "occasional");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("MD".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
