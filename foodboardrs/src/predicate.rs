//! Composition of optional filter selections into a `WHERE` clause plus the
//! positional parameters bound to its `?` placeholders.

use serde_json::Value;

/// Selection value meaning "no constraint on this dimension".
pub const ALL: &str = "All";

const WHERE_PREFIX: &str = " WHERE ";

/// One optional constraint: a SQL fragment with a single `?` placeholder, the
/// value to bind, and whether the constraint applies at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub fragment: String,
    pub active: bool,
    pub value: Value,
}

impl Condition {
    pub fn new(fragment: impl Into<String>, active: bool, value: impl Into<Value>) -> Self {
        Self {
            fragment: fragment.into(),
            active,
            value: value.into(),
        }
    }

    /// Constraint driven by a filter widget; inactive when `selection` is `"All"`.
    pub fn from_selection(fragment: impl Into<String>, selection: &str) -> Self {
        Self::new(fragment, selection != ALL, selection)
    }
}

/// Fragments that survived composition together with their bound values.
///
/// `params[i]` binds to the placeholder in `fragments[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    fragments: Vec<String>,
    params: Vec<Value>,
}

impl Predicate {
    pub fn compose<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = Condition>,
    {
        let mut predicate = Predicate::default();
        for condition in conditions.into_iter().filter(|c| c.active) {
            predicate.fragments.push(condition.fragment);
            predicate.params.push(condition.value);
        }
        predicate
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }

    /// `" WHERE a AND b"`, or the empty string when nothing is active.
    pub fn where_clause(&self) -> String {
        if self.fragments.is_empty() {
            String::new()
        } else {
            format!("{WHERE_PREFIX}{}", self.fragments.join(" AND "))
        }
    }
}

/// Compose `conditions` into a where clause and its ordered parameters.
pub fn compose<I>(conditions: I) -> (String, Vec<Value>)
where
    I: IntoIterator<Item = Condition>,
{
    let predicate = Predicate::compose(conditions);
    (predicate.where_clause(), predicate.into_params())
}

/// Append a clause produced by [`Predicate::where_clause`] to a query tail
/// that already carries its own `WHERE` keyword.
///
/// The composed clause's leading `WHERE` is dropped and the remainder joined
/// with `AND`. An empty composed clause leaves `existing` unchanged.
pub fn extend_where(existing: &str, composed: &str) -> String {
    let trimmed = composed.trim_start();
    let rest = trimmed
        .strip_prefix("WHERE ")
        .or_else(|| trimmed.strip_prefix("where "))
        .unwrap_or(trimmed)
        .trim();
    if rest.is_empty() {
        existing.to_string()
    } else {
        format!("{existing} AND {rest}")
    }
}
