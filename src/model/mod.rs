//! Aggregation model: samples from all log lines folded into one table.

pub mod value;

pub use value::Extrema;

use crate::log::{Entry, Record};
use std::collections::HashMap;
use std::fmt;

/// Header of the timestamp column, also its minimum width.
pub const TIMESTAMP_HEADER: &str = "timestamp";

/// Identity of one reported series: a parameter of a cgroup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub cgroup: String,
    pub param: String,
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cgroup, self.param)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: ColumnKey,
    /// Widest of cgroup name, parameter name and every stored value.
    pub width: usize,
}

/// All samples sharing one timestamp. Cells are keyed by column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub timestamp: String,
    cells: HashMap<usize, String>,
}

impl Row {
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(&column).map(String::as_str)
    }
}

/// Timestamp-indexed sparse table with columns in first-seen order.
#[derive(Debug, Clone)]
pub struct Table {
    rows: Vec<Row>,
    row_index: HashMap<String, usize>,
    columns: Vec<Column>,
    column_index: HashMap<ColumnKey, usize>,
    timestamp_width: usize,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            row_index: HashMap::new(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            timestamp_width: TIMESTAMP_HEADER.len(),
        }
    }
}

impl Table {
    /// Store one sample. Creates the row and the column on first sight;
    /// a repeated (timestamp, column) overwrites the earlier value.
    pub fn insert(&mut self, timestamp: &str, entry: Entry) {
        let Entry {
            cgroup,
            param,
            value,
        } = entry;

        let width = text_width(&cgroup)
            .max(text_width(&param))
            .max(text_width(&value));
        let key = ColumnKey { cgroup, param };
        let column = match self.column_index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.columns.len();
                self.column_index.insert(key.clone(), idx);
                self.columns.push(Column { key, width: 0 });
                idx
            }
        };
        let col = &mut self.columns[column];
        col.width = col.width.max(width);

        let row = match self.row_index.get(timestamp) {
            Some(&idx) => idx,
            None => {
                let idx = self.rows.len();
                self.row_index.insert(timestamp.to_string(), idx);
                self.rows.push(Row {
                    timestamp: timestamp.to_string(),
                    cells: HashMap::new(),
                });
                idx
            }
        };
        self.rows[row].cells.insert(column, value);

        self.timestamp_width = self.timestamp_width.max(text_width(timestamp));
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in first-seen order, or lexically by timestamp when `sorted`.
    pub fn rows(&self, sorted: bool) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.iter().collect();
        if sorted {
            rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }
        rows
    }

    pub fn timestamp_width(&self) -> usize {
        self.timestamp_width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Folds decoded records into a [`Table`].
#[derive(Debug, Default)]
pub struct Aggregator {
    table: Table,
    records: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, record: Record) {
        let Record { timestamp, entries } = record;
        self.records += 1;
        for entry in entries {
            self.table.insert(&timestamp, entry);
        }
    }

    /// Number of records ingested so far, including ones without entries.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(self) -> Table {
        self.table
    }
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}
