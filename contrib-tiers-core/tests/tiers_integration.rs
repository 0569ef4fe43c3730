use contrib_tiers_core::aggregate::contributor_tiers;
use contrib_tiers_core::config::{ActivityWindow, RepoId, Tier, TierTable, WithinTierOrder};
use contrib_tiers_core::contract::{ContributionRecord, FetchError, MockContributionSource};

fn repo() -> RepoId {
    "owasp/scsvs".parse().expect("valid repo id")
}

fn records() -> Vec<ContributionRecord> {
    vec![
        ContributionRecord::new("A", 120, 10),
        ContributionRecord::new("B", 45, 2),
        ContributionRecord::new("C", 9, 0),
    ]
}

#[tokio::test]
async fn test_contributor_tiers_reference_scenario() {
    let mut source = MockContributionSource::new();
    source
        .expect_fetch()
        .times(1)
        .withf(|repo, window| repo.to_string() == "owasp/scsvs" && matches!(window, ActivityWindow::AllTime))
        .returning(|_, _| Ok(records()));

    let report = contributor_tiers(
        &source,
        &repo(),
        &ActivityWindow::AllTime,
        &TierTable::default(),
        WithinTierOrder::Contribution,
    )
    .await
    .expect("classification should succeed");

    let map = report.authors_by_tier();
    assert_eq!(map.len(), 3);
    assert_eq!(map["core"], ["A"]);
    assert_eq!(map["frequent"], ["B"]);
    assert_eq!(map["occasional"], ["C"]);
}

#[tokio::test]
async fn test_contributor_tiers_empty_source_is_not_an_error() {
    let mut source = MockContributionSource::new();
    source.expect_fetch().returning(|_, _| Ok(vec![]));

    let report = contributor_tiers(
        &source,
        &repo(),
        &ActivityWindow::AllTime,
        &TierTable::default(),
        WithinTierOrder::Contribution,
    )
    .await
    .expect("empty input should yield an empty report");

    assert!(report.is_empty());
    assert!(report.authors_by_tier().is_empty());
}

#[tokio::test]
async fn test_contributor_tiers_propagates_fetch_error() {
    let mut source = MockContributionSource::new();
    source
        .expect_fetch()
        .returning(|_, _| Err(FetchError::Transport("connection refused".into())));

    let err = contributor_tiers(
        &source,
        &repo(),
        &ActivityWindow::AllTime,
        &TierTable::default(),
        WithinTierOrder::Contribution,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_contributor_tiers_is_idempotent() {
    let mut source = MockContributionSource::new();
    source.expect_fetch().times(2).returning(|_, _| {
        let mut r = records();
        r.push(ContributionRecord::new("D", 45, 0));
        r.push(ContributionRecord::new("A", 5, 0));
        Ok(r)
    });
    let table = TierTable::default();

    let first = contributor_tiers(&source, &repo(), &ActivityWindow::AllTime, &table, WithinTierOrder::Contribution)
        .await
        .unwrap();
    let second = contributor_tiers(&source, &repo(), &ActivityWindow::AllTime, &table, WithinTierOrder::Contribution)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.group("core").unwrap().contributors[0].additions, 125);
    assert_eq!(first.group("frequent").unwrap().authors(), ["B", "D"]);
}

#[tokio::test]
async fn test_contributor_tiers_boundary_with_custom_table() {
    let mut source = MockContributionSource::new();
    source.expect_fetch().returning(|_, _| {
        Ok(vec![
            ContributionRecord::new("exactly", 50, 0),
            ContributionRecord::new("just_below", 49, 0),
            ContributionRecord::new("nobody", 0, 0),
        ])
    });
    let table = TierTable::new(vec![Tier::new("frequent", 50), Tier::new("occasional", 0)])
        .expect("valid table");

    let report = contributor_tiers(&source, &repo(), &ActivityWindow::AllTime, &table, WithinTierOrder::Name)
        .await
        .unwrap();

    assert_eq!(report.group("frequent").unwrap().authors(), ["exactly"]);
    assert_eq!(report.group("occasional").unwrap().authors(), ["just_below"]);
    assert_eq!(report.contributor_count(), 2, "zero-contribution author must be excluded");
}
