//! Row records, row identity and cell value helpers.
//!
//! Rows are opaque business objects. The engine only ever reads them through
//! the [`Record`] trait and shares them as `Rc<R>`, so the rows handed out by
//! [`TableState`](crate::state::TableState) are the very same allocations the
//! caller supplied.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read access to the named fields of a business row.
pub trait Record {
    /// Returns the value stored under `key`, if any.
    fn field(&self, key: &str) -> Option<&Value>;
}

impl Record for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }
}

impl Record for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl Record for HashMap<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Identity of a row, as written to `data-row-id` attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for RowId {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for RowId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// Fields consulted, in order, by [`default_row_id`].
pub const ROW_ID_FIELDS: [&str; 3] = ["id", "local_id", "code"];

/// Default row identity: `id`, then `local_id`, then `code`, then the index.
///
/// Null and empty-string fields are skipped.
pub fn default_row_id(row: &dyn Record, index: usize) -> RowId {
    ROW_ID_FIELDS
        .iter()
        .filter_map(|key| row.field(key))
        .map(value_text)
        .find(|text| !text.is_empty())
        .map_or_else(|| RowId::from(index), RowId::new)
}

/// Plain-text form of a cell value.
///
/// Arrays join their elements with `", "`; objects and null render empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Object(_) => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Returns true for values that count as "no value": missing, null, blank
/// strings and empty arrays.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Reads a value as a number.
///
/// Strings are trimmed and accept a decimal comma. Booleans, anything
/// unparsable and non-finite results (`NaN`, `inf`) yield `None`.
pub fn value_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    n.filter(|n| n.is_finite())
}
