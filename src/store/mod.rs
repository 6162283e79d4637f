//! Remote tabular store boundary
//!
//! The engine never owns persistence. It talks to a store through the
//! `RemoteStore` trait: filtered selects and row-level writes over named
//! tables, plus a session accessor. Rows are loosely typed JSON objects;
//! `loader::normalize` turns them into models.
//!
//! Two implementations ship with the crate:
//! - `JsonStore`: tables held in memory, optionally persisted to one JSON file
//! - `RetryingStore`: wraps any store with bounded exponential backoff

pub mod file_io;
pub mod json;
pub mod retry;

pub use json::JsonStore;
pub use retry::{RetryPolicy, RetryingStore};

use serde_json::{Map, Value};
use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;

use crate::error::LedgerResult;
use crate::models::UserId;

/// A loosely typed store row
pub type Row = Map<String, Value>;

/// Table names of the external schema
pub mod tables {
    pub const CATEGORIES: &str = "categories";
    pub const BUDGET_LIMITS: &str = "budget_limits";
    pub const TRANSACTIONS: &str = "transactions";
    pub const ACCOUNTS: &str = "accounts";
    pub const INVESTMENTS: &str = "investments";
    pub const CREDIT_CARDS: &str = "credit_cards";
}

/// A row predicate on a single column
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    NotEq(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
    NotNull(String),
    Gte(String, Value),
    Lte(String, Value),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    pub fn not_eq(column: &str, value: impl Into<Value>) -> Self {
        Self::NotEq(column.to_string(), value.into())
    }

    pub fn in_list(column: &str, values: Vec<Value>) -> Self {
        Self::In(column.to_string(), values)
    }

    pub fn is_null(column: &str) -> Self {
        Self::IsNull(column.to_string())
    }

    pub fn not_null(column: &str) -> Self {
        Self::NotNull(column.to_string())
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self::Gte(column.to_string(), value.into())
    }

    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Self::Lte(column.to_string(), value.into())
    }

    /// Evaluate against a row; a missing column behaves like SQL NULL
    pub fn matches(&self, row: &Row) -> bool {
        let field = |column: &str| row.get(column).filter(|v| !v.is_null());
        match self {
            Self::Eq(column, value) => field(column) == Some(value),
            Self::NotEq(column, value) => field(column).is_some_and(|v| v != value),
            Self::In(column, values) => field(column).is_some_and(|v| values.contains(v)),
            Self::IsNull(column) => field(column).is_none(),
            Self::NotNull(column) => field(column).is_some(),
            Self::Gte(column, value) => field(column)
                .and_then(|v| compare_values(v, value))
                .is_some_and(|o| o != CmpOrdering::Less),
            Self::Lte(column, value) => field(column)
                .and_then(|v| compare_values(v, value))
                .is_some_and(|o| o != CmpOrdering::Greater),
        }
    }
}

/// Sort key for a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub descending: bool,
}

/// A select over one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub ordering: Vec<Ordering>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            ordering: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: &str) -> Self {
        self.ordering.push(Ordering {
            column: column.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.ordering.push(Ordering {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

/// The capability the engine consumes from the outside world
///
/// Every call either succeeds or returns an error; implementations that talk
/// to a network surface transient failures as `LedgerError::Store` so that
/// `RetryingStore` can retry them.
pub trait RemoteStore: Send + Sync {
    fn select(&self, query: &Query) -> LedgerResult<Vec<Row>>;

    fn insert(&self, table: &str, rows: Vec<Row>) -> LedgerResult<Vec<Row>>;

    /// Insert or replace rows that agree on every column in `conflict_keys`
    fn upsert(&self, table: &str, rows: Vec<Row>, conflict_keys: &[&str])
        -> LedgerResult<Vec<Row>>;

    /// Merge `patch` into every matching row
    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LedgerResult<Vec<Row>>;

    fn delete(&self, table: &str, filters: &[Filter]) -> LedgerResult<()>;

    /// The signed-in principal, if any
    fn session(&self) -> Option<UserId>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    fn select(&self, query: &Query) -> LedgerResult<Vec<Row>> {
        (**self).select(query)
    }

    fn insert(&self, table: &str, rows: Vec<Row>) -> LedgerResult<Vec<Row>> {
        (**self).insert(table, rows)
    }

    fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        conflict_keys: &[&str],
    ) -> LedgerResult<Vec<Row>> {
        (**self).upsert(table, rows, conflict_keys)
    }

    fn update(&self, table: &str, filters: &[Filter], patch: Row) -> LedgerResult<Vec<Row>> {
        (**self).update(table, filters, patch)
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> LedgerResult<()> {
        (**self).delete(table, filters)
    }

    fn session(&self) -> Option<UserId> {
        (**self).session()
    }
}

/// Order two scalar values; dates compare as their ISO strings
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<CmpOrdering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Serialize a model into a row
pub fn to_row<T: serde::Serialize>(value: &T) -> LedgerResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(crate::error::LedgerError::Json(format!(
            "expected an object row, got {}",
            other
        ))),
    }
}
