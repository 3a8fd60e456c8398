//! Sidebar filter dimensions, their option lists, and the user's selection.

use std::collections::BTreeSet;

use crate::error::{FoodboardError, Result};
use crate::executor::value_as_label;
use crate::gateway::{Gateway, TableResult};
use crate::predicate::ALL;

/// The five selectable dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterDimension {
    City,
    ProviderType,
    FoodType,
    MealType,
    Status,
}

impl FilterDimension {
    pub const ALL_DIMENSIONS: [FilterDimension; 5] = [
        FilterDimension::City,
        FilterDimension::ProviderType,
        FilterDimension::FoodType,
        FilterDimension::MealType,
        FilterDimension::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::City => "City / Location",
            FilterDimension::ProviderType => "Provider Type",
            FilterDimension::FoodType => "Food Type",
            FilterDimension::MealType => "Meal Type",
            FilterDimension::Status => "Claim Status",
        }
    }

    /// `(table, column)` pairs whose distinct values make up the options.
    pub fn sources(self) -> &'static [(&'static str, &'static str)] {
        match self {
            FilterDimension::City => &[("providers", "City"), ("food_listings", "Location")],
            FilterDimension::ProviderType => &[("providers", "Type")],
            FilterDimension::FoodType => &[("food_listings", "Food_Type")],
            FilterDimension::MealType => &[("food_listings", "Meal_Type")],
            FilterDimension::Status => &[("claims", "Status")],
        }
    }
}

/// Current value of every dimension; each starts at `"All"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub city: String,
    pub provider_type: String,
    pub food_type: String,
    pub meal_type: String,
    pub status: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            city: ALL.to_string(),
            provider_type: ALL.to_string(),
            food_type: ALL.to_string(),
            meal_type: ALL.to_string(),
            status: ALL.to_string(),
        }
    }
}

impl FilterSelection {
    pub fn get(&self, dimension: FilterDimension) -> &str {
        match dimension {
            FilterDimension::City => &self.city,
            FilterDimension::ProviderType => &self.provider_type,
            FilterDimension::FoodType => &self.food_type,
            FilterDimension::MealType => &self.meal_type,
            FilterDimension::Status => &self.status,
        }
    }

    pub fn set(&mut self, dimension: FilterDimension, value: impl Into<String>) {
        let value = value.into();
        match dimension {
            FilterDimension::City => self.city = value,
            FilterDimension::ProviderType => self.provider_type = value,
            FilterDimension::FoodType => self.food_type = value,
            FilterDimension::MealType => self.meal_type = value,
            FilterDimension::Status => self.status = value,
        }
    }

    pub fn with(mut self, dimension: FilterDimension, value: impl Into<String>) -> Self {
        self.set(dimension, value);
        self
    }

    /// Reset every value not offered by `options` back to `"All"`.
    pub fn sanitize(&mut self, options: &FilterOptions) {
        for dimension in FilterDimension::ALL_DIMENSIONS {
            let current = self.get(dimension);
            if !options.get(dimension).iter().any(|o| o == current) {
                tracing::debug!(
                    dimension = dimension.label(),
                    value = current,
                    "selection not among options, resetting"
                );
                self.set(dimension, ALL);
            }
        }
    }
}

/// Option lists for every dimension, each beginning with `"All"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub city: Vec<String>,
    pub provider_type: Vec<String>,
    pub food_type: Vec<String>,
    pub meal_type: Vec<String>,
    pub status: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        let only_all = vec![ALL.to_string()];
        Self {
            city: only_all.clone(),
            provider_type: only_all.clone(),
            food_type: only_all.clone(),
            meal_type: only_all.clone(),
            status: only_all,
        }
    }
}

impl FilterOptions {
    /// Resolve every dimension, one query per source column.
    pub async fn load(gateway: &Gateway) -> Self {
        let mut options = Self::default();
        for dimension in FilterDimension::ALL_DIMENSIONS {
            let values = resolve_dimension(gateway, dimension).await;
            *options.get_mut(dimension) = values;
        }
        options
    }

    pub fn get(&self, dimension: FilterDimension) -> &[String] {
        match dimension {
            FilterDimension::City => &self.city,
            FilterDimension::ProviderType => &self.provider_type,
            FilterDimension::FoodType => &self.food_type,
            FilterDimension::MealType => &self.meal_type,
            FilterDimension::Status => &self.status,
        }
    }

    fn get_mut(&mut self, dimension: FilterDimension) -> &mut Vec<String> {
        match dimension {
            FilterDimension::City => &mut self.city,
            FilterDimension::ProviderType => &mut self.provider_type,
            FilterDimension::FoodType => &mut self.food_type,
            FilterDimension::MealType => &mut self.meal_type,
            FilterDimension::Status => &mut self.status,
        }
    }
}

/// Options for one dimension. Multi-source dimensions are merged as a sorted set.
pub async fn resolve_dimension(gateway: &Gateway, dimension: FilterDimension) -> Vec<String> {
    match dimension.sources() {
        [(table, column)] => resolve(gateway, table, column).await,
        sources => {
            let mut merged = BTreeSet::new();
            for (table, column) in sources {
                merged.extend(
                    resolve(gateway, table, column)
                        .await
                        .into_iter()
                        .filter(|v| v != ALL),
                );
            }
            std::iter::once(ALL.to_string()).chain(merged).collect()
        }
    }
}

/// City options: the union of provider cities and listing locations.
pub async fn resolve_locations(gateway: &Gateway) -> Vec<String> {
    resolve_dimension(gateway, FilterDimension::City).await
}

/// `"All"` followed by the distinct non-null values of `table.column`.
///
/// Any failure, including an identifier that is not a plain SQL name, yields
/// just `["All"]`.
pub async fn resolve(gateway: &Gateway, table: &str, column: &str) -> Vec<String> {
    let mut options = vec![ALL.to_string()];
    let sql = match distinct_values_sql(table, column) {
        Ok(sql) => sql,
        Err(e) => {
            tracing::warn!(table, column, error = %e, "refusing to resolve options");
            return options;
        }
    };
    match gateway.execute(&sql, &[]).await {
        TableResult::Rows(result) => {
            options.extend(result.column_values(0).into_iter().filter_map(value_as_label));
        }
        TableResult::Failed { .. } => {}
    }
    options
}

fn distinct_values_sql(table: &str, column: &str) -> Result<String> {
    for name in [table, column] {
        if !is_identifier(name) {
            return Err(FoodboardError::Sql(format!("not a plain identifier: {name:?}")));
        }
    }
    Ok(format!(
        "SELECT DISTINCT {column} AS v FROM {table} WHERE {column} IS NOT NULL ORDER BY v"
    ))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_guard() {
        assert!(is_identifier("food_listings"));
        assert!(is_identifier("Meal_Type"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1col"));
        assert!(!is_identifier("City; DROP TABLE providers"));
    }

    #[test]
    fn distinct_values_sql_rejects_injection() {
        assert_eq!(
            distinct_values_sql("claims", "Status").unwrap(),
            "SELECT DISTINCT Status AS v FROM claims WHERE Status IS NOT NULL ORDER BY v"
        );
        let err = distinct_values_sql("claims", "Status FROM x --").unwrap_err();
        assert!(matches!(err, FoodboardError::Sql(_)));
    }

    #[test]
    fn sanitize_resets_unknown_values() {
        let mut options = FilterOptions::default();
        options.city = vec![ALL.to_string(), "Reno".to_string()];
        let mut selection = FilterSelection::default()
            .with(FilterDimension::City, "Reno")
            .with(FilterDimension::Status, "Lost");
        selection.sanitize(&options);
        assert_eq!(selection.city, "Reno");
        assert_eq!(selection.status, ALL);
    }
}
