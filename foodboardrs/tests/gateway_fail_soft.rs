//! Dashboard behaviour against a scripted backend: query order, fail-soft
//! handling and warning collection.

mod common;

use foodboard::presentation::{present, TextSurface};
use foodboard::{Dashboard, FilterDimension, FilterSelection, Gateway, TableResult};
use serde_json::json;

use common::{recording, RecordingConnection};

#[tokio::test]
async fn render_runs_queries_in_catalog_order() {
    let (conn, backend) = recording(RecordingConnection::default());
    let dashboard = Dashboard::new(Gateway::new(backend), Default::default());

    let view = dashboard.render(&FilterSelection::default()).await;
    assert_eq!(view.sections.len(), 9);
    assert!(view.warnings.is_empty());

    let statements = conn.statements();
    assert_eq!(statements.len(), 14);
    assert_eq!(statements[0], "SELECT COUNT(*) AS c FROM providers");
    assert_eq!(statements[3], "SELECT COUNT(*) AS c FROM claims");
    assert!(statements[4].starts_with("SELECT City, COUNT(*) AS provider_count"));
    assert_eq!(statements[7], "SELECT COUNT(*) AS total FROM claims");
    assert!(statements[8].starts_with("SELECT Status, (COUNT(*) * 100.0) /"));
    assert!(statements[13].contains("SUM(f.Quantity)"));
}

#[tokio::test]
async fn selection_params_reach_the_backend() {
    let (conn, backend) = recording(RecordingConnection::default());
    let dashboard = Dashboard::new(Gateway::new(backend), Default::default());

    let selection = FilterSelection::default()
        .with(FilterDimension::City, "Austin")
        .with(FilterDimension::Status, "Pending");
    dashboard.render(&selection).await;

    let calls = conn.calls.lock().unwrap();
    let (sql, params) = &calls[4];
    assert!(sql.contains("WHERE City = ? GROUP BY"));
    assert_eq!(params, &vec![json!("Austin")]);

    // total and percentage share the status parameter
    assert_eq!(calls[7].1, vec![json!("Pending")]);
    assert_eq!(calls[8].1, vec![json!("Pending")]);

    // table-only reports run unparameterised
    for (sql, params) in &calls[11..] {
        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(params.is_empty());
    }
}

#[tokio::test]
async fn every_failure_becomes_an_empty_section() {
    let (conn, backend) = recording(RecordingConnection::failing_on(""));
    let dashboard = Dashboard::new(Gateway::new(backend), Default::default());

    let view = dashboard.render(&FilterSelection::default()).await;
    assert_eq!(conn.statements().len(), 14);
    assert!(view.kpis.iter().all(|k| k.value == 0));
    assert!(view.sections.iter().all(|s| s.result.is_failed()));
    assert!(view.sections.iter().all(|s| s.chart.is_none()));
    assert_eq!(view.warnings.len(), 14);
    assert!(view.warnings[0].to_string().starts_with("Query failed: "));

    // warnings were handed to the view, not left behind
    assert!(dashboard.gateway().drain_warnings().is_empty());

    let mut surface = TextSurface::new(Vec::new());
    present(&view, &mut surface).unwrap();
    let text = String::from_utf8(surface.into_inner()).unwrap();
    assert_eq!(text.matches("(no data)").count(), 9);
    assert!(text.contains(&view.caption));
}

#[tokio::test]
async fn one_broken_report_leaves_the_rest_alone() {
    let (_conn, backend) = recording(RecordingConnection::failing_on("FROM food_listings f"));
    let dashboard = Dashboard::new(Gateway::new(backend), Default::default());

    let view = dashboard.render(&FilterSelection::default()).await;
    let failed: Vec<_> = view
        .sections
        .iter()
        .filter(|s| s.result.is_failed())
        .map(|s| s.id)
        .collect();
    assert_eq!(
        failed,
        [
            "most_claimed_meal_type",
            "top_locations_by_completed_claims",
            "claims_per_food_item"
        ]
    );
    assert_eq!(view.warnings.len(), 3);
    assert!(view.sections[0].chart.is_some());
}

#[tokio::test]
async fn failed_total_falls_back_to_denominator_one() {
    let (conn, backend) = recording(RecordingConnection::failing_on("AS total"));
    let dashboard = Dashboard::new(Gateway::new(backend), Default::default());

    let report = foodboard::reports::find("claims_by_status_percentage").unwrap();
    let section = dashboard
        .run_report(&report, &FilterSelection::default())
        .await;
    assert!(matches!(section.result, TableResult::Rows(_)));

    let statements = conn.statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[1].contains("/ 1 AS percentage"));
    assert_eq!(dashboard.gateway().drain_warnings().len(), 1);
}

#[tokio::test]
async fn failed_option_queries_leave_only_all() {
    let (_conn, backend) = recording(RecordingConnection::failing_on("DISTINCT"));
    let dashboard = Dashboard::new(Gateway::new(backend), Default::default());

    let (options, warnings) = dashboard.filter_options().await;
    assert_eq!(options, foodboard::FilterOptions::default());
    // City resolves two sources, the rest one each
    assert_eq!(warnings.len(), 6);
    assert!(warnings.iter().all(|w| w.sql.contains("DISTINCT")));

    // startup failures do not leak into the first render
    let view = dashboard.render(&FilterSelection::default()).await;
    assert!(view.warnings.is_empty());
}
