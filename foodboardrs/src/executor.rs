#[cfg(feature = "duckdb")]
use duckdb::types::Value as DuckValue;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
}

/// Rows returned by a backend, keyed by output column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Map<String, Value>>,
}

impl QueryResult {
    /// Zero rows and no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of the column at `idx`, in row order. Missing cells are `Null`.
    pub fn column_values(&self, idx: usize) -> Vec<&Value> {
        let Some(column) = self.columns.get(idx) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|row| row.get(&column.name).unwrap_or(&Value::Null))
            .collect()
    }

    /// First cell of the first row as an integer, for `COUNT(*)` style queries.
    pub fn first_i64(&self) -> Option<i64> {
        let column = self.columns.first()?;
        let value = self.rows.first()?.get(&column.name)?;
        value_as_f64(value).map(|v| v as i64)
    }
}

/// Numeric view of a cell. Decimal and 128-bit values that backends hand back
/// as strings are parsed.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Display form of a cell; `None` for SQL NULL.
pub fn value_as_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Cells the four food tables and their aggregates produce: integer ids and
/// quantities, `COUNT`/`SUM` results, percentages, and text.
#[cfg(feature = "duckdb")]
pub(crate) fn duck_value_to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Int(i) => Value::from(i),
        DuckValue::BigInt(i) => Value::from(i),
        // SUM over INTEGER widens to HUGEINT
        DuckValue::HugeInt(i) => match i64::try_from(i) {
            Ok(small) => Value::from(small),
            Err(_) => Value::String(i.to_string()),
        },
        DuckValue::Double(f) => Value::from(f),
        DuckValue::Decimal(d) => {
            let text = d.to_string();
            match text.parse::<f64>() {
                Ok(f) => Value::from(f),
                Err(_) => Value::String(text),
            }
        }
        DuckValue::Text(s) => Value::String(s),
        other => Value::String(format!("{other:?}")),
    }
}

/// Bound parameters travel as JSON scalars; map them onto DuckDB values.
#[cfg(feature = "duckdb")]
pub(crate) fn json_to_duck_value(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DuckValue::BigInt(i),
            None => DuckValue::Double(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => DuckValue::Text(s.clone()),
        other => DuckValue::Text(other.to_string()),
    }
}
