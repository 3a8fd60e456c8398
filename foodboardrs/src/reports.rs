//! The fixed report catalog.
//!
//! Every report is a grouped aggregate over one table or a two-table join. The
//! user's selections only ever add `column = ?` constraints; everything else
//! about a report is static.

use serde_json::{json, Value};

use crate::chart::ChartHint;
use crate::filters::{FilterDimension, FilterSelection};
use crate::predicate::{Condition, Predicate};
use crate::sql_ast::{
    Aggregation, Join, SelectItem, SelectQuery, SqlBinaryOperator, SqlExpr, SqlRenderer, TableRef,
};

/// A filter dimension wired to the column it constrains in one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterBinding {
    pub dimension: FilterDimension,
    /// Fragment with a single `?`, e.g. `f.Location = ?`.
    pub fragment: &'static str,
}

const fn bind(dimension: FilterDimension, fragment: &'static str) -> FilterBinding {
    FilterBinding {
        dimension,
        fragment,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregationShape {
    /// `COUNT(*)` per category.
    Count,
    /// `COUNT(expr)` per category, typically across a join.
    CountOf(SqlExpr),
    /// `SUM(expr)` per category.
    SumOf(SqlExpr),
    /// `COUNT(*) * 100.0 / total`, where `total` is a separate filtered count.
    PercentageOfTotal,
}

/// SQL text plus positional parameters, ready for the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub from: TableRef,
    pub joins: Vec<Join>,
    /// Conditions that always apply, independent of the sidebar.
    pub fixed_filters: Vec<SqlExpr>,
    pub category: SqlExpr,
    pub shape: AggregationShape,
    pub measure_alias: &'static str,
    /// Order by the measure, descending.
    pub ordered: bool,
    pub limit: Option<u64>,
    pub filters: Vec<FilterBinding>,
    /// `None` means the report is shown as a table only.
    pub chart: Option<ChartHint>,
}

impl ReportDefinition {
    pub fn applies(&self, dimension: FilterDimension) -> bool {
        self.filters.iter().any(|f| f.dimension == dimension)
    }

    pub fn needs_total(&self) -> bool {
        matches!(self.shape, AggregationShape::PercentageOfTotal)
    }

    /// Conditions for this report's bindings, in binding order.
    pub fn predicate(&self, selection: &FilterSelection) -> Predicate {
        Predicate::compose(
            self.filters
                .iter()
                .map(|f| Condition::from_selection(f.fragment, selection.get(f.dimension))),
        )
    }

    /// `SELECT COUNT(*) AS total` over the same source and filters.
    ///
    /// Only percentage reports have one.
    pub fn total_query(&self, selection: &FilterSelection) -> Option<BoundQuery> {
        if !self.needs_total() {
            return None;
        }
        let query = SelectQuery {
            select: vec![SelectItem {
                expr: SqlExpr::count_star(),
                alias: Some("total".to_string()),
            }],
            from: self.from.clone(),
            joins: self.joins.clone(),
            filters: self.fixed_filters.clone(),
            ..Default::default()
        };
        Some(self.bind(&query, selection))
    }

    /// The report query. `total` feeds percentage reports; zero or a missing
    /// total is replaced by 1 so the division is always defined.
    pub fn build(&self, selection: &FilterSelection, total: Option<i64>) -> BoundQuery {
        self.bind(&self.select_query(total), selection)
    }

    pub fn select_query(&self, total: Option<i64>) -> SelectQuery {
        let measure = match &self.shape {
            AggregationShape::Count => SqlExpr::count_star(),
            AggregationShape::CountOf(expr) => SqlExpr::Aggregate {
                agg: Aggregation::Count,
                expr: Some(Box::new(expr.clone())),
            },
            AggregationShape::SumOf(expr) => SqlExpr::Aggregate {
                agg: Aggregation::Sum,
                expr: Some(Box::new(expr.clone())),
            },
            AggregationShape::PercentageOfTotal => SqlExpr::BinaryOp {
                op: SqlBinaryOperator::Divide,
                left: Box::new(SqlExpr::BinaryOp {
                    op: SqlBinaryOperator::Multiply,
                    left: Box::new(SqlExpr::count_star()),
                    right: Box::new(SqlExpr::Literal(json!(100.0))),
                }),
                right: Box::new(SqlExpr::Literal(json!(total.unwrap_or(0).max(1)))),
            },
        };

        let order_by = if self.ordered {
            vec![SqlExpr::column(self.measure_alias)]
        } else {
            Vec::new()
        };

        SelectQuery {
            select: vec![
                SelectItem {
                    expr: self.category.clone(),
                    alias: None,
                },
                SelectItem {
                    expr: measure,
                    alias: Some(self.measure_alias.to_string()),
                },
            ],
            from: self.from.clone(),
            joins: self.joins.clone(),
            filters: self.fixed_filters.clone(),
            group_by: vec![self.category.clone()],
            order_by,
            limit: self.limit,
        }
    }

    fn bind(&self, query: &SelectQuery, selection: &FilterSelection) -> BoundQuery {
        let predicate = self.predicate(selection);
        BoundQuery {
            sql: SqlRenderer::new().render_select(query, &predicate),
            params: predicate.into_params(),
        }
    }
}

/// One KPI tile: a label and an unfiltered row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiDefinition {
    pub label: &'static str,
    pub table: &'static str,
}

pub const KPIS: [KpiDefinition; 4] = [
    KpiDefinition {
        label: "Providers",
        table: "providers",
    },
    KpiDefinition {
        label: "Receivers",
        table: "receivers",
    },
    KpiDefinition {
        label: "Food Listings",
        table: "food_listings",
    },
    KpiDefinition {
        label: "Claims",
        table: "claims",
    },
];

impl KpiDefinition {
    pub fn sql(&self) -> String {
        format!("SELECT COUNT(*) AS c FROM {}", self.table)
    }
}

fn listings_join_claims() -> Join {
    Join {
        table: TableRef::aliased("claims", "c"),
        on: vec![SqlExpr::eq(
            SqlExpr::qualified("f", "Food_ID"),
            SqlExpr::qualified("c", "Food_ID"),
        )],
    }
}

fn claim_count() -> AggregationShape {
    AggregationShape::CountOf(SqlExpr::qualified("c", "Claim_ID"))
}

/// All reports in render order.
pub fn catalog() -> Vec<ReportDefinition> {
    use FilterDimension::*;

    vec![
        ReportDefinition {
            id: "top_cities_by_providers",
            title: "Top Cities by Number of Providers",
            from: TableRef::new("providers"),
            joins: vec![],
            fixed_filters: vec![],
            category: SqlExpr::column("City"),
            shape: AggregationShape::Count,
            measure_alias: "provider_count",
            ordered: true,
            limit: Some(10),
            filters: vec![bind(City, "City = ?"), bind(ProviderType, "Type = ?")],
            chart: Some(ChartHint {
                x_label: "City",
                y_label: "Providers",
                title: "Top Cities by Providers",
                x_tick_rotation: 45,
            }),
        },
        ReportDefinition {
            id: "provider_type_contributions",
            title: "Provider Type Contributions",
            from: TableRef::new("providers"),
            joins: vec![],
            fixed_filters: vec![],
            category: SqlExpr::column("Type"),
            shape: AggregationShape::Count,
            measure_alias: "count",
            ordered: true,
            limit: None,
            filters: vec![bind(City, "City = ?")],
            chart: Some(ChartHint {
                x_label: "Provider Type",
                y_label: "Count",
                title: "Provider Type Contributions",
                x_tick_rotation: 45,
            }),
        },
        ReportDefinition {
            id: "most_common_food_types",
            title: "Most Common Food Types",
            from: TableRef::new("food_listings"),
            joins: vec![],
            fixed_filters: vec![],
            category: SqlExpr::column("Food_Type"),
            shape: AggregationShape::Count,
            measure_alias: "type_count",
            ordered: true,
            limit: None,
            filters: vec![bind(City, "Location = ?"), bind(MealType, "Meal_Type = ?")],
            chart: Some(ChartHint {
                x_label: "Food Type",
                y_label: "Count",
                title: "Most Common Food Types",
                x_tick_rotation: 45,
            }),
        },
        ReportDefinition {
            id: "claims_by_status_percentage",
            title: "Percentage of Claims by Status",
            from: TableRef::new("claims"),
            joins: vec![],
            fixed_filters: vec![],
            category: SqlExpr::column("Status"),
            shape: AggregationShape::PercentageOfTotal,
            measure_alias: "percentage",
            ordered: false,
            limit: None,
            filters: vec![bind(Status, "Status = ?")],
            chart: Some(ChartHint {
                x_label: "Status",
                y_label: "Percentage",
                title: "Claims by Status (%)",
                x_tick_rotation: 0,
            }),
        },
        ReportDefinition {
            id: "most_claimed_meal_type",
            title: "Most Claimed Meal Type",
            from: TableRef::aliased("food_listings", "f"),
            joins: vec![listings_join_claims()],
            fixed_filters: vec![],
            category: SqlExpr::qualified("f", "Meal_Type"),
            shape: claim_count(),
            measure_alias: "claims_count",
            ordered: true,
            limit: None,
            filters: vec![bind(MealType, "f.Meal_Type = ?")],
            chart: Some(ChartHint {
                x_label: "Meal Type",
                y_label: "Claims",
                title: "Most Claimed Meal Type",
                x_tick_rotation: 0,
            }),
        },
        ReportDefinition {
            id: "top_locations_by_completed_claims",
            title: "Top 5 Locations by Completed Claims",
            from: TableRef::aliased("food_listings", "f"),
            joins: vec![listings_join_claims()],
            fixed_filters: vec![SqlExpr::eq(
                SqlExpr::qualified("c", "Status"),
                SqlExpr::Literal(json!("Completed")),
            )],
            category: SqlExpr::qualified("f", "Location"),
            shape: claim_count(),
            measure_alias: "completed_claims",
            ordered: true,
            limit: Some(5),
            filters: vec![bind(City, "f.Location = ?")],
            chart: Some(ChartHint {
                x_label: "Location",
                y_label: "Completed Claims",
                title: "Top 5 Locations by Completed Claims",
                x_tick_rotation: 0,
            }),
        },
        ReportDefinition {
            id: "receivers_with_most_claims",
            title: "Receivers with Most Claims",
            from: TableRef::aliased("receivers", "r"),
            joins: vec![Join {
                table: TableRef::aliased("claims", "c"),
                on: vec![SqlExpr::eq(
                    SqlExpr::qualified("r", "Receiver_ID"),
                    SqlExpr::qualified("c", "Receiver_ID"),
                )],
            }],
            fixed_filters: vec![],
            category: SqlExpr::qualified("r", "Name"),
            shape: claim_count(),
            measure_alias: "claims_count",
            ordered: true,
            limit: Some(10),
            filters: vec![],
            chart: None,
        },
        ReportDefinition {
            id: "claims_per_food_item",
            title: "Claims per Food Item",
            from: TableRef::aliased("food_listings", "f"),
            joins: vec![listings_join_claims()],
            fixed_filters: vec![],
            category: SqlExpr::qualified("f", "Food_Name"),
            shape: claim_count(),
            measure_alias: "claims_count",
            ordered: true,
            limit: Some(15),
            filters: vec![],
            chart: None,
        },
        ReportDefinition {
            id: "total_quantity_by_provider",
            title: "Total Quantity Donated by Provider",
            from: TableRef::aliased("providers", "p"),
            joins: vec![Join {
                table: TableRef::aliased("food_listings", "f"),
                on: vec![SqlExpr::eq(
                    SqlExpr::qualified("p", "Provider_ID"),
                    SqlExpr::qualified("f", "Provider_ID"),
                )],
            }],
            fixed_filters: vec![],
            category: SqlExpr::qualified("p", "Name"),
            shape: AggregationShape::SumOf(SqlExpr::qualified("f", "Quantity")),
            measure_alias: "total_donated",
            ordered: true,
            limit: Some(15),
            filters: vec![],
            chart: None,
        },
    ]
}

/// Look up a catalog entry by id.
pub fn find(id: &str) -> Option<ReportDefinition> {
    catalog().into_iter().find(|r| r.id == id)
}
