//! DuckDB backend implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{FoodboardError, Result};
use crate::executor::{duck_value_to_json, json_to_duck_value, ColumnMeta, QueryResult};

use super::BackendConnection;

/// DuckDB store holding one cached connection for its whole lifetime.
#[derive(Clone)]
pub struct DuckDbConnection {
    database_path: PathBuf,
    conn: Arc<Mutex<Option<duckdb::Connection>>>,
}

impl DuckDbConnection {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        tracing::info!(path = %path.display(), "creating DuckDB connection");
        Self {
            database_path: path,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Wrap an already open connection, e.g. an in-memory database seeded by a test.
    pub fn from_connection(conn: duckdb::Connection) -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Open the store read-only; a missing file is an error rather than a new
    /// empty database.
    fn open(&self) -> Result<duckdb::Connection> {
        tracing::debug!(path = %self.database_path.display(), "opening DuckDB connection");
        let config = duckdb::Config::default().access_mode(duckdb::AccessMode::ReadOnly)?;
        duckdb::Connection::open_with_flags(&self.database_path, config)
            .map_err(|e| FoodboardError::Execution(format!("open duckdb: {e}")))
    }
}

fn run_statement(
    conn: &duckdb::Connection,
    sql: &str,
    params: &[Value],
) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let bound: Vec<duckdb::types::Value> = params.iter().map(json_to_duck_value).collect();
    let mut rows_iter = stmt.query(duckdb::params_from_iter(bound))?;
    let stmt_ref = rows_iter
        .as_ref()
        .ok_or_else(|| FoodboardError::Execution("statement missing".to_string()))?;
    let mut column_names = Vec::new();
    for idx in 0..stmt_ref.column_count() {
        let name = stmt_ref
            .column_name(idx)
            .map_err(|e| FoodboardError::Execution(e.to_string()))?;
        column_names.push(name.to_string());
    }
    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut map = serde_json::Map::new();
        for (idx, name) in column_names.iter().enumerate() {
            let value = duck_value_to_json(row.get_ref(idx)?.to_owned());
            map.insert(name.clone(), value);
        }
        rows.push(map);
    }

    let columns = column_names
        .into_iter()
        .map(|name| ColumnMeta { name })
        .collect();
    Ok(QueryResult { columns, rows })
}

#[async_trait]
impl BackendConnection for DuckDbConnection {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let sql = sql.to_string();
        let params = params.to_vec();
        // held until the statement finishes; concurrent callers queue here
        let mut guard = self.conn.clone().lock_owned().await;
        if guard.is_none() {
            *guard = Some(self.open()?);
        } else {
            tracing::trace!("reusing cached DuckDB connection");
        }
        tokio::task::spawn_blocking(move || -> Result<QueryResult> {
            let conn = guard
                .as_ref()
                .ok_or_else(|| FoodboardError::Execution("connection missing".to_string()))?;
            let start = Instant::now();
            let result = run_statement(conn, &sql, &params)?;
            tracing::debug!(
                rows = result.rows.len(),
                columns = result.columns.len(),
                params = params.len(),
                ms = start.elapsed().as_millis(),
                "duckdb execute_sql"
            );
            Ok(result)
        })
        .await
        .map_err(|e| FoodboardError::Execution(format!("task join error: {e}")))?
    }
}
