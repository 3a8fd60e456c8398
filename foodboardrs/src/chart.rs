//! Bar chart specifications handed to the presentation surface.

use serde::Serialize;
use serde_json::{json, Value};

use crate::executor::{value_as_f64, value_as_label, QueryResult};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v6.json";

/// Axis labels and title a report wants for its chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartHint {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub title: &'static str,
    /// Degrees; category labels are right-aligned when rotated.
    pub x_tick_rotation: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub x_tick_rotation: i32,
}

impl BarChart {
    /// Categories come from the first column, bar heights from the second.
    ///
    /// Returns `None` for an empty table, which callers treat as "no chart".
    /// NULL categories are shown as `"None"`; non-numeric heights count as 0.
    pub fn from_table(hint: &ChartHint, table: &QueryResult) -> Option<Self> {
        if table.is_empty() || table.columns.len() < 2 {
            return None;
        }
        let categories = table
            .column_values(0)
            .into_iter()
            .map(|v| value_as_label(v).unwrap_or_else(|| "None".to_string()))
            .collect();
        let values = table
            .column_values(1)
            .into_iter()
            .map(|v| value_as_f64(v).unwrap_or(0.0))
            .collect();
        Some(Self {
            categories,
            values,
            x_label: hint.x_label.to_string(),
            y_label: hint.y_label.to_string(),
            title: hint.title.to_string(),
            x_tick_rotation: hint.x_tick_rotation,
        })
    }

    /// Vega-Lite bar mark with inline data; category order is kept as given.
    pub fn to_vega_lite(&self) -> Value {
        let values: Vec<Value> = self
            .categories
            .iter()
            .zip(&self.values)
            .map(|(category, value)| json!({ "category": category, "value": value }))
            .collect();
        let mut x_axis = json!({ "title": self.x_label, "labelAngle": -self.x_tick_rotation });
        if self.x_tick_rotation != 0 {
            x_axis["labelAlign"] = json!("right");
        }
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": self.title,
            "data": { "values": values },
            "mark": "bar",
            "encoding": {
                "x": {
                    "field": "category",
                    "type": "nominal",
                    "sort": null,
                    "axis": x_axis,
                },
                "y": {
                    "field": "value",
                    "type": "quantitative",
                    "axis": { "title": self.y_label },
                },
            },
        })
    }
}
