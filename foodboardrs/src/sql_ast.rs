use serde_json::Value;

use crate::predicate::{extend_where, Predicate};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column {
        table: Option<String>,
        name: String,
    },
    Literal(Value),
    /// `expr: None` renders as `*`.
    Aggregate {
        agg: Aggregation,
        expr: Option<Box<SqlExpr>>,
    },
    BinaryOp {
        op: SqlBinaryOperator,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
}

impl SqlExpr {
    pub fn column(name: &str) -> Self {
        SqlExpr::Column {
            table: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(table: &str, name: &str) -> Self {
        SqlExpr::Column {
            table: Some(table.to_string()),
            name: name.to_string(),
        }
    }

    pub fn count_star() -> Self {
        SqlExpr::Aggregate {
            agg: Aggregation::Count,
            expr: None,
        }
    }

    pub fn eq(left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::BinaryOp {
            op: SqlBinaryOperator::Eq,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBinaryOperator {
    Multiply,
    Divide,
    Eq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: SqlExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn aliased(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }
}

/// Inner join; every report only counts rows present on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub on: Vec<SqlExpr>,
}

/// A single `SELECT`. `filters` are fixed conditions baked into the report;
/// user selections arrive separately as a [`Predicate`] at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub select: Vec<SelectItem>,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub filters: Vec<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    /// Sort keys, each descending.
    pub order_by: Vec<SqlExpr>,
    pub limit: Option<u64>,
}

/// Renders the AST with bare identifiers; every name in a query comes from the
/// report catalog, never from user input.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlRenderer;

impl SqlRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_select(&self, query: &SelectQuery, predicate: &Predicate) -> String {
        let select_items: Vec<String> = query
            .select
            .iter()
            .map(|item| {
                let expr_sql = self.render_expr(&item.expr);
                match &item.alias {
                    Some(alias) => format!("{expr_sql} AS {alias}"),
                    None => expr_sql,
                }
            })
            .collect();

        let mut sql = format!(
            "SELECT {} FROM {}",
            select_items.join(", "),
            self.render_table_ref(&query.from)
        );

        for join in &query.joins {
            let on_clause: Vec<String> = join.on.iter().map(|e| self.render_expr(e)).collect();
            sql.push_str(&format!(
                " JOIN {} ON {}",
                self.render_table_ref(&join.table),
                on_clause.join(" AND ")
            ));
        }

        if query.filters.is_empty() {
            sql.push_str(&predicate.where_clause());
        } else {
            let filters: Vec<String> = query.filters.iter().map(|f| self.render_expr(f)).collect();
            let fixed = format!(" WHERE {}", filters.join(" AND "));
            sql.push_str(&extend_where(&fixed, &predicate.where_clause()));
        }

        if !query.group_by.is_empty() {
            let groups: Vec<String> = query.group_by.iter().map(|g| self.render_expr(g)).collect();
            sql.push_str(&format!(" GROUP BY {}", groups.join(", ")));
        }

        if !query.order_by.is_empty() {
            let orders: Vec<String> = query
                .order_by
                .iter()
                .map(|o| format!("{} DESC", self.render_expr(o)))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        sql
    }

    fn render_table_ref(&self, table: &TableRef) -> String {
        match &table.alias {
            Some(alias) => format!("{} {alias}", table.name),
            None => table.name.clone(),
        }
    }

    fn render_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            other => format!("'{}'", other.to_string().replace('\'', "''")),
        }
    }

    fn render_expr(&self, expr: &SqlExpr) -> String {
        match expr {
            SqlExpr::Column { table, name } => match table {
                Some(t) => format!("{t}.{name}"),
                None => name.clone(),
            },
            SqlExpr::Literal(v) => self.render_literal(v),
            SqlExpr::Aggregate { agg, expr } => {
                let inner = match expr {
                    Some(e) => self.render_expr(e),
                    None => "*".to_string(),
                };
                match agg {
                    Aggregation::Count => format!("COUNT({inner})"),
                    Aggregation::Sum => format!("SUM({inner})"),
                }
            }
            SqlExpr::BinaryOp { op, left, right } => {
                let op_sql = match op {
                    SqlBinaryOperator::Multiply => "*",
                    SqlBinaryOperator::Divide => "/",
                    SqlBinaryOperator::Eq => "=",
                };
                format!(
                    "{} {op_sql} {}",
                    self.render_operand(left),
                    self.render_operand(right)
                )
            }
        }
    }

    // Nested binary operations keep their grouping explicit.
    fn render_operand(&self, expr: &SqlExpr) -> String {
        match expr {
            SqlExpr::BinaryOp { .. } => format!("({})", self.render_expr(expr)),
            other => self.render_expr(other),
        }
    }
}
