//! SQLite backend implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{FoodboardError, Result};
use crate::executor::{ColumnMeta, QueryResult};

use super::BackendConnection;

/// SQLite store holding one cached connection for its whole lifetime.
#[derive(Clone)]
pub struct SqliteConnection {
    database_path: PathBuf,
    conn: Arc<Mutex<Option<rusqlite::Connection>>>,
}

impl SqliteConnection {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        tracing::info!(path = %path.display(), "creating SQLite connection");
        Self {
            database_path: path,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Wrap an already open connection, e.g. an in-memory database seeded by a test.
    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    fn open(&self) -> Result<rusqlite::Connection> {
        tracing::debug!(path = %self.database_path.display(), "opening SQLite connection");
        rusqlite::Connection::open_with_flags(
            &self.database_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|e| FoodboardError::Execution(format!("open sqlite: {e}")))
    }
}

fn sqlite_value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}

fn json_to_sqlite_value(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqliteValue::Integer(i),
            None => SqliteValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqliteValue::Text(s.clone()),
        other => SqliteValue::Text(other.to_string()),
    }
}

fn run_statement(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[Value],
) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let column_names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let bound: Vec<SqliteValue> = params.iter().map(json_to_sqlite_value).collect();
    let mut rows_iter = stmt.query(rusqlite::params_from_iter(bound))?;
    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut map = serde_json::Map::new();
        for (idx, name) in column_names.iter().enumerate() {
            map.insert(name.clone(), sqlite_value_to_json(row.get_ref(idx)?));
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
impl BackendConnection for SqliteConnection {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let sql = sql.to_string();
        let params = params.to_vec();
        // held until the statement finishes; concurrent callers queue here
        let mut guard = self.conn.clone().lock_owned().await;
        if guard.is_none() {
            *guard = Some(self.open()?);
        } else {
            tracing::trace!("reusing cached SQLite connection");
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
                "sqlite execute_sql"
            );
            Ok(result)
        })
        .await
        .map_err(|e| FoodboardError::Execution(format!("task join error: {e}")))?
    }
}
