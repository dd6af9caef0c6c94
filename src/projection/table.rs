//! Dynamic tabulation of iterations.
//!
//! The column schema is two fixed columns followed by one column per
//! parameter key of the *first* iteration, in that iteration's order. Keys
//! that only appear on later iterations get no column; keys missing from a
//! later iteration render as [`CellValue::Missing`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::timestamp::format_timestamp;
use crate::model::Iteration;

/// Column key for the chain identifier.
pub const CHAIN_ID_COLUMN: &str = "chainId";
/// Column key for the formatted timestamp.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Prefix of parameter column keys.
pub const PARAM_COLUMN_PREFIX: &str = "param-";

/// A display column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Value of one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Pre-formatted display text.
    Text(String),
    /// A parameter value as received.
    Raw(Value),
    /// The iteration has no value for this column.
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Raw(Value::String(s)) => f.write_str(s),
            CellValue::Raw(value) => write!(f, "{}", value),
            CellValue::Missing => Ok(()),
        }
    }
}

/// One row per iteration, keyed by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub key: String,
    pub column_values: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn get(&self, column_key: &str) -> Option<&CellValue> {
        self.column_values.get(column_key)
    }
}

/// Columns and rows ready for a table widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IterationTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

/// Parameter keys of the first iteration, in order.
///
/// Keys that are array indices come first in ascending numeric order, the
/// rest follow in producer order. This is JavaScript's own-property order.
pub fn parameter_keys(iterations: &[Iteration]) -> Vec<String> {
    let Some(first) = iterations.first() else {
        return Vec::new();
    };
    let mut indices: Vec<(u32, &String)> = Vec::new();
    let mut named: Vec<&String> = Vec::new();
    for key in first.parameters.keys() {
        match array_index(key) {
            Some(index) => indices.push((index, key)),
            None => named.push(key),
        }
    }
    indices.sort_by_key(|(index, _)| *index);
    indices
        .into_iter()
        .map(|(_, key)| key)
        .chain(named)
        .cloned()
        .collect()
}

/// `key` as an array index: canonical decimal below `u32::MAX`.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|index| *index < u32::MAX)
}

pub fn param_column_key(parameter: &str) -> String {
    format!("{}{}", PARAM_COLUMN_PREFIX, parameter)
}

pub fn columns_for(parameter_keys: &[String]) -> Vec<Column> {
    let mut columns = Vec::with_capacity(parameter_keys.len() + 2);
    columns.push(Column::new(CHAIN_ID_COLUMN, "Chain"));
    columns.push(Column::new(TIMESTAMP_COLUMN, "Timestamp"));
    columns.extend(
        parameter_keys
            .iter()
            .map(|pk| Column::new(param_column_key(pk), pk.as_str())),
    );
    columns
}

pub fn rows_for(iterations: &[Iteration], parameter_keys: &[String]) -> Vec<Row> {
    iterations
        .iter()
        .enumerate()
        .map(|(ii, it)| {
            let mut column_values = BTreeMap::new();
            column_values.insert(
                TIMESTAMP_COLUMN.to_string(),
                CellValue::Text(format_timestamp(it.timestamp)),
            );
            column_values.insert(
                CHAIN_ID_COLUMN.to_string(),
                CellValue::Text(it.chain_id.to_string()),
            );
            for pk in parameter_keys {
                let value = it
                    .parameters
                    .get(pk)
                    .cloned()
                    .map(CellValue::Raw)
                    .unwrap_or(CellValue::Missing);
                column_values.insert(param_column_key(pk), value);
            }
            Row {
                key: ii.to_string(),
                column_values,
            }
        })
        .collect()
}

/// Build the column schema and rows for a sequence of iterations.
pub fn tabulate(iterations: &[Iteration]) -> IterationTable {
    let keys = parameter_keys(iterations);
    IterationTable {
        columns: columns_for(&keys),
        rows: rows_for(iterations, &keys),
    }
}

/// Memoizing wrapper around [`tabulate`].
///
/// The table is rebuilt only when handed a different iteration slice
/// (by `Arc` identity).
#[derive(Debug, Default)]
pub struct TableProjector {
    cache: Option<(Arc<[Iteration]>, Arc<IterationTable>)>,
}

impl TableProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabulate(&mut self, iterations: &Arc<[Iteration]>) -> Arc<IterationTable> {
        if let Some((cached, table)) = &self.cache {
            if Arc::ptr_eq(cached, iterations) {
                return Arc::clone(table);
            }
        }

        let table = Arc::new(tabulate(iterations));
        debug!(
            rows = table.rows.len(),
            columns = table.columns.len(),
            "Rebuilt iteration table"
        );
        self.cache = Some((Arc::clone(iterations), Arc::clone(&table)));
        table
    }

    pub fn reset(&mut self) {
        self.cache = None;
    }
}
