#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use foodboard::backends::SqliteConnection;
use foodboard::config::{BackendKind, FoodboardConfig};
use foodboard::executor::value_as_f64;
use foodboard::filters::resolve_locations;
use foodboard::reports::find;
use foodboard::{open_dashboard, Dashboard, FilterDimension, FilterSelection, Gateway, ALL};

use common::{ROWS, SCHEMA};

fn seeded(with_rows: bool) -> anyhow::Result<Dashboard> {
    let conn = rusqlite::Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    if with_rows {
        conn.execute_batch(ROWS)?;
    }
    let gateway = Gateway::new(Arc::new(SqliteConnection::from_connection(conn)));
    Ok(Dashboard::new(gateway, Default::default()))
}

#[tokio::test]
async fn renders_every_report() -> anyhow::Result<()> {
    let dashboard = seeded(true)?;
    let view = dashboard.render(&FilterSelection::default()).await;

    let counts: Vec<i64> = view.kpis.iter().map(|k| k.value).collect();
    assert_eq!(counts, [5, 3, 4, 7]);
    assert!(view.warnings.is_empty());
    assert!(view.sections.iter().all(|s| !s.result.is_empty()));
    Ok(())
}

#[tokio::test]
async fn integer_division_is_avoided() -> anyhow::Result<()> {
    let dashboard = seeded(true)?;
    let report = find("claims_by_status_percentage").unwrap();
    let selection = FilterSelection::default().with(FilterDimension::Status, "Completed");
    let table = dashboard.run_report(&report, &selection).await.result.into_table();
    assert_eq!(value_as_f64(&table.rows[0]["percentage"]), Some(100.0));

    let all = dashboard
        .run_report(&report, &FilterSelection::default())
        .await
        .result
        .into_table();
    let sum: f64 = all
        .column_values(1)
        .into_iter()
        .filter_map(value_as_f64)
        .sum();
    assert!((sum - 100.0).abs() < 1e-6);
    Ok(())
}

#[tokio::test]
async fn empty_store_renders_without_failures() -> anyhow::Result<()> {
    let dashboard = seeded(false)?;
    let view = dashboard.render(&FilterSelection::default()).await;
    assert!(view.kpis.iter().all(|k| k.value == 0));
    assert!(view.sections.iter().all(|s| !s.result.is_failed()));
    assert!(view.sections.iter().all(|s| s.chart.is_none()));
    assert!(view.warnings.is_empty());
    Ok(())
}

#[tokio::test]
async fn locations_merge_both_tables() -> anyhow::Result<()> {
    let dashboard = seeded(true)?;
    assert_eq!(
        resolve_locations(dashboard.gateway()).await,
        [ALL, "Austin", "Boise", "Reno"]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_column_is_reported_not_raised() -> anyhow::Result<()> {
    let dashboard = seeded(true)?;
    let result = dashboard
        .gateway()
        .execute("SELECT Missing FROM claims", &[])
        .await;
    assert!(result.is_failed());
    let warnings = dashboard.gateway().drain_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("Missing"));
    Ok(())
}

#[tokio::test]
async fn concurrent_statements_share_one_connection() -> anyhow::Result<()> {
    let dashboard = seeded(true)?;
    let gateway = dashboard.gateway();

    let sql = "SELECT COUNT(*) AS c FROM claims";
    let (a, b) = tokio::join!(gateway.execute(sql, &[]), gateway.execute(sql, &[]));
    assert_eq!(a.table().first_i64(), Some(7));
    assert_eq!(b.table().first_i64(), Some(7));
    assert!(gateway.drain_warnings().is_empty());
    Ok(())
}

#[tokio::test]
async fn default_config_reads_sqlite_store_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("food_wastage.db");
    {
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch(ROWS)?;
    }

    let mut config = FoodboardConfig::default();
    assert_eq!(config.store.backend, BackendKind::Duckdb);
    config.store.path = db_path;
    let dashboard = open_dashboard(&config)?;
    assert_eq!(dashboard.gateway().backend_name(), "sqlite");

    let view = dashboard.render(&FilterSelection::default()).await;
    let counts: Vec<i64> = view.kpis.iter().map(|k| k.value).collect();
    assert_eq!(counts, [5, 3, 4, 7]);
    assert!(view.warnings.is_empty());
    Ok(())
}
