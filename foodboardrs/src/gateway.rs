//! Fail-soft access to the store.
//!
//! The gateway is the only place where query errors are caught. A failure is
//! logged, kept as a [`QueryWarning`] for the presentation layer, and turned
//! into [`TableResult::Failed`]; callers never see an `Err`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::backends::BackendConnection;
use crate::executor::QueryResult;

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum TableResult {
    Rows(QueryResult),
    Failed { reason: String },
}

impl TableResult {
    /// True for failures and for successful queries that matched nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            TableResult::Rows(result) => result.is_empty(),
            TableResult::Failed { .. } => true,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TableResult::Failed { .. })
    }

    /// The table to display: the rows, or zero rows and no columns on failure.
    pub fn table(&self) -> QueryResult {
        match self {
            TableResult::Rows(result) => result.clone(),
            TableResult::Failed { .. } => QueryResult::empty(),
        }
    }

    pub fn into_table(self) -> QueryResult {
        match self {
            TableResult::Rows(result) => result,
            TableResult::Failed { .. } => QueryResult::empty(),
        }
    }
}

/// A query failure surfaced to the user as a non-blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWarning {
    pub sql: String,
    pub message: String,
}

impl std::fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Query failed: {}", self.message)
    }
}

pub struct Gateway {
    backend: Arc<dyn BackendConnection>,
    warnings: Mutex<Vec<QueryWarning>>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn BackendConnection>) -> Self {
        Self {
            backend,
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Engine behind this gateway, as reported by the backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Run one statement; errors become [`TableResult::Failed`] plus a warning.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> TableResult {
        match self.backend.execute_sql(sql, params).await {
            Ok(result) => TableResult::Rows(result),
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    backend = self.backend_name(),
                    sql = sql,
                    error = %message,
                    "query failed"
                );
                self.lock_warnings().push(QueryWarning {
                    sql: sql.to_string(),
                    message: message.clone(),
                });
                TableResult::Failed { reason: message }
            }
        }
    }

    /// Warnings recorded since the last drain, oldest first.
    pub fn drain_warnings(&self) -> Vec<QueryWarning> {
        std::mem::take(&mut *self.lock_warnings())
    }

    fn lock_warnings(&self) -> MutexGuard<'_, Vec<QueryWarning>> {
        self.warnings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
