#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use foodboard::error::{FoodboardError, Result};
use foodboard::executor::{ColumnMeta, QueryResult};
use foodboard::BackendConnection;
use serde_json::Value;

pub const SCHEMA: &str = "
    CREATE TABLE providers (
        Provider_ID INTEGER PRIMARY KEY,
        Name VARCHAR,
        Type VARCHAR,
        City VARCHAR
    );
    CREATE TABLE receivers (
        Receiver_ID INTEGER PRIMARY KEY,
        Name VARCHAR
    );
    CREATE TABLE food_listings (
        Food_ID INTEGER PRIMARY KEY,
        Food_Name VARCHAR,
        Quantity INTEGER,
        Provider_ID INTEGER,
        Location VARCHAR,
        Food_Type VARCHAR,
        Meal_Type VARCHAR
    );
    CREATE TABLE claims (
        Claim_ID INTEGER PRIMARY KEY,
        Food_ID INTEGER,
        Receiver_ID INTEGER,
        Status VARCHAR
    );
";

pub const ROWS: &str = "
    INSERT INTO providers VALUES
        (1, 'Green Grocer', 'Grocery Store', 'Austin'),
        (2, 'Taco Hub', 'Restaurant', 'Austin'),
        (3, 'Bread Co', 'Restaurant', 'Austin'),
        (4, 'Reno Market', 'Supermarket', 'Reno'),
        (5, 'Nameless', 'Restaurant', NULL);
    INSERT INTO receivers VALUES
        (1, 'Food Bank'),
        (2, 'Shelter'),
        (3, 'Kitchen');
    INSERT INTO food_listings VALUES
        (1, 'Rice', 10, 1, 'Reno', 'Vegetarian', 'Lunch'),
        (2, 'Soup', 5, 2, 'Boise', 'Vegan', 'Dinner'),
        (3, 'Bread', 20, 3, 'Reno', 'Vegetarian', 'Breakfast'),
        (4, 'Chicken', 8, 4, 'Boise', 'Non-Vegetarian', 'Dinner');
    INSERT INTO claims VALUES
        (1, 1, 1, 'Completed'),
        (2, 1, 2, 'Pending'),
        (3, 2, 1, 'Completed'),
        (4, 3, 3, 'Cancelled'),
        (5, 4, 1, 'Completed'),
        (6, 3, 2, 'Completed'),
        (7, 4, 2, 'Pending');
";

#[cfg(feature = "duckdb")]
pub fn bootstrap_duckdb(db_path: &std::path::Path, with_rows: bool) -> anyhow::Result<()> {
    let conn = duckdb::Connection::open(db_path)?;
    conn.execute_batch(SCHEMA)?;
    if with_rows {
        conn.execute_batch(ROWS)?;
    }
    Ok(())
}

/// Records every statement and answers with one two-column row, or fails any
/// statement containing `fail_on`.
#[derive(Default)]
pub struct RecordingConnection {
    pub calls: Mutex<Vec<(String, Vec<Value>)>>,
    pub fail_on: Option<String>,
}

impl RecordingConnection {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

#[async_trait]
impl BackendConnection for RecordingConnection {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        if let Some(needle) = &self.fail_on {
            if sql.contains(needle.as_str()) {
                return Err(FoodboardError::Execution(format!(
                    "no such column: {needle}"
                )));
            }
        }
        let row = serde_json::json!({"label": "x", "n": 3});
        Ok(QueryResult {
            columns: vec![
                ColumnMeta {
                    name: "label".to_string(),
                },
                ColumnMeta {
                    name: "n".to_string(),
                },
            ],
            rows: vec![row.as_object().cloned().unwrap()],
        })
    }
}

pub fn recording(
    conn: RecordingConnection,
) -> (Arc<RecordingConnection>, Arc<dyn BackendConnection>) {
    let conn = Arc::new(conn);
    let backend: Arc<dyn BackendConnection> = conn.clone();
    (conn, backend)
}
