use serde::Serialize;

use crate::error::SectionError;
use crate::report::{display, GroupedBlock, Row, PLACEHOLDER};

/// Header + body of display strings, ready for any host.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableView {
    pub title: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Per column: every non-empty cell has a numeric raw side (hosts right-align these).
    pub numeric: Vec<bool>,
}

impl TableView {
    /// Columns come from the first row's keys, in order. Cells a later row lacks
    /// read as the placeholder.
    pub fn from_rows(rows: &[Row]) -> Result<Self, SectionError> {
        let first = rows.first().ok_or(SectionError::EmptyTable)?;
        let columns: Vec<String> = first.columns().map(str::to_string).collect();

        let body = rows
            .iter()
            .map(|row| columns.iter().map(|c| display(row.get(c))).collect())
            .collect();

        let numeric = columns
            .iter()
            .map(|c| {
                let mut cells = rows.iter().filter_map(|r| r.get(c)).filter(|v| !v.raw().is_null()).peekable();
                cells.peek().is_some() && cells.all(|v| v.raw().as_f64().is_some())
            })
            .collect();

        Ok(Self { title: None, columns, rows: body, numeric })
    }

    /// Single-row table.
    pub fn from_row(row: &Row) -> Result<Self, SectionError> {
        Self::from_rows(std::slice::from_ref(row))
    }

    /// Two-column key/value table over a grouped block, in block order.
    pub fn key_values(block: &GroupedBlock, key_header: &str, value_header: &str) -> Result<Self, SectionError> {
        if block.is_empty() {
            return Err(SectionError::EmptyTable);
        }
        Ok(Self {
            title: None,
            columns: vec![key_header.to_string(), value_header.to_string()],
            rows: block.entries().iter().map(|(k, v)| vec![k.clone(), v.display()]).collect(),
            numeric: vec![false, true],
        })
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display text at (row, column name).
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(idx)).map(String::as_str)
    }
}

/// Placeholder-aware check used by hosts when styling cells.
pub fn is_placeholder(cell: &str) -> bool {
    cell == PLACEHOLDER
}
