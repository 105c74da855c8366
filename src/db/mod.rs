//! Structured storage engine.
//!
//! Generic row storage addressed by table name. Rows are JSON objects;
//! filters are parameterized `Where` clauses instead of SQL strings.
//!
//! | Item             | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | [`Database`]     | Storage contract used by every other layer     |
//! | [`Where`]        | Equality / any-of filters, AND-combined        |
//! | [`MemoryDatabase`] | In-process engine with JSON file persistence |

mod memory;

pub use memory::MemoryDatabase;

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// A stored row: column name → value.
pub type Row = serde_json::Map<String, Value>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("unknown table `{0}`")]
    UnknownTable(String),

    #[error("duplicate entry for unique key ({columns}) in `{table}`")]
    Constraint { table: String, columns: String },

    #[error("malformed row in `{table}`: {message}")]
    Malformed { table: String, message: String },

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("storage file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// One column condition inside a [`Where`] clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq(Value),
    /// `column IN (values...)`
    AnyOf(Vec<Value>),
}

impl Condition {
    fn matches(&self, actual: Option<&Value>) -> bool {
        let actual = actual.unwrap_or(&Value::Null);
        match self {
            Self::Eq(expected) => values_match(actual, expected),
            Self::AnyOf(expected) => expected.iter().any(|v| values_match(actual, v)),
        }
    }
}

/// AND-combined column conditions.
///
/// # Example
/// ```ignore
/// let filter = Where::new().eq("profile_id", 1).any_of("clang_id", [0, 1, 2]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    conditions: Vec<(String, Condition)>,
}

impl Where {
    /// Empty filter (matches every row).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((column.into(), Condition::Eq(value.into())));
        self
    }

    pub fn any_of<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions
            .push((column.into(), Condition::AnyOf(values)));
        self
    }

    /// Check a row against every condition.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, condition)| condition.matches(row.get(column)))
    }

    /// Value of the first equality condition on `column`.
    fn eq_value(&self, column: &str) -> Option<&Value> {
        self.conditions.iter().find_map(|(c, condition)| match condition {
            Condition::Eq(value) if c == column => Some(value),
            _ => None,
        })
    }
}

/// Storage contract.
///
/// Query methods report failures as [`DbError`]; callers decide whether a
/// failure is fatal.
pub trait Database: Send + Sync {
    /// Declare a table with its unique keys. Existing tables are kept.
    fn create_table(&self, table: &str, unique: &[&[&str]]) -> Result<(), DbError>;

    /// Insert a row, assigning `id` when absent. Returns the stored row.
    fn insert(&self, table: &str, row: Row) -> Result<Row, DbError>;

    /// Declare an equality index on `column`. Lookups filtering on it
    /// stay fast as the table grows.
    fn create_index(&self, table: &str, column: &str) -> Result<(), DbError>;

    /// Select rows matching `filter`, in insertion order.
    fn select(&self, table: &str, filter: &Where) -> Result<Vec<Row>, DbError>;

    /// Delete rows matching `filter`. Returns the number removed.
    fn delete(&self, table: &str, filter: &Where) -> Result<usize, DbError>;

    /// Remove every row in one step.
    fn truncate(&self, table: &str) -> Result<(), DbError>;

    /// Single-row lookup by key column.
    fn row(&self, table: &str, key_column: &str, key: &Value) -> Result<Option<Row>, DbError> {
        let filter = Where::new().eq(key_column, key.clone());
        Ok(self.select(table, &filter)?.into_iter().next())
    }

    /// Single-row scalar lookup by key column.
    fn value(
        &self,
        table: &str,
        key_column: &str,
        key: &Value,
        column: &str,
    ) -> Result<Option<Value>, DbError> {
        Ok(self
            .row(table, key_column, key)?
            .and_then(|mut row| row.remove(column))
            .filter(|v| !v.is_null()))
    }
}

/// Loose value comparison, the way a SQL engine compares mixed columns.
///
/// Numbers compare numerically, booleans equal `0`/`1`, numeric strings
/// equal their number.
pub fn values_match(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => match (actual, expected) {
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a column as an unsigned integer (numbers, numeric strings, bools).
pub fn column_u64(row: &Row, column: &str) -> Option<u64> {
    match row.get(column)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

/// Read a column as display text. Null and missing columns are `None`.
pub fn column_text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Read a column as a flag (`true`, non-zero numbers, `"1"`).
pub fn column_bool(row: &Row, column: &str) -> bool {
    row.get(column)
        .and_then(as_number)
        .is_some_and(|n| n != 0.0)
}
