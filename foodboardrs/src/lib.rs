pub mod backends;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod executor;
pub mod filters;
pub mod gateway;
pub mod logging;
pub mod predicate;
pub mod presentation;
pub mod reports;
pub mod sql_ast;

use crate::config::FoodboardConfig;
use crate::error::Result;

/// Open the configured store and build a dashboard over it.
///
/// The store itself is not touched until the first query runs.
pub fn open_dashboard(config: &FoodboardConfig) -> Result<Dashboard> {
    let backend = backends::connect(&config.store)?;
    Ok(Dashboard::new(Gateway::new(backend), config.dashboard.clone()))
}

pub use backends::BackendConnection;
pub use dashboard::{Dashboard, DashboardView};
pub use error::FoodboardError;
pub use executor::QueryResult;
pub use filters::{FilterDimension, FilterOptions, FilterSelection};
pub use gateway::{Gateway, TableResult};
pub use predicate::{compose, Condition, Predicate, ALL};
pub use reports::{catalog, ReportDefinition};
