//! Database backend implementations.
//!
//! Each backend is implemented in its own file and gated behind a feature flag.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{BackendKind, StoreConfig};
use crate::error::{FoodboardError, Result};
use crate::executor::QueryResult;

/// Unified interface for the embedded stores.
///
/// Implementations own a single lazily opened connection and run one
/// statement at a time. `params` bind positionally to `?` placeholders.
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Short engine name used in log fields.
    fn name(&self) -> &'static str;
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;
}

const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Open the backend selected by `config`.
///
/// An existing file carrying the SQLite header is always opened with the SQLite
/// backend, whatever `store.backend` says.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn BackendConnection>> {
    let kind = match sniff_backend(&config.path) {
        Some(found) if found != config.backend => {
            tracing::info!(
                path = %config.path.display(),
                configured = ?config.backend,
                detected = ?found,
                "store file format overrides configured backend"
            );
            found
        }
        _ => config.backend,
    };
    match kind {
        #[cfg(feature = "duckdb")]
        BackendKind::Duckdb => Ok(Arc::new(DuckDbConnection::new(&config.path))),
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Ok(Arc::new(SqliteConnection::new(&config.path))),
        #[allow(unreachable_patterns)]
        other => Err(FoodboardError::Config(format!(
            "backend {other:?} is not compiled in"
        ))),
    }
}

/// Engine implied by the file header, if the file exists and is recognised.
fn sniff_backend(path: &Path) -> Option<BackendKind> {
    let mut header = [0u8; 16];
    let mut file = File::open(path).ok()?;
    file.read_exact(&mut header).ok()?;
    (&header == SQLITE_MAGIC).then_some(BackendKind::Sqlite)
}

// Feature-gated backend implementations
#[cfg(feature = "duckdb")]
mod duckdb;
#[cfg(feature = "duckdb")]
pub use duckdb::DuckDbConnection;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
