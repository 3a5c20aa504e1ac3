//! Typed, order-preserving view over the report document produced by the
//! analytics engine. The document is read once and never mutated.

pub mod loader;
pub mod value;

use serde_json::Value as Json;

use crate::error::{ReportError, SectionError};

pub use value::{display, number, raw, Raw, Value, ValueBox, PLACEHOLDER};

// ─── Section keys ───

pub const CORE_PERFORMANCE: &str = "Core Performance Metrics";
pub const BACKTEST_CONFIG: &str = "Backtest Configuration & Assumptions";
pub const TRADE_DISTRIBUTION: &str = "Trade Distribution & Payoff Geometry";
pub const R_MULTIPLE_DISTRIBUTION: &str = "R-multiple distribution";
pub const CONDITIONAL_EXPECTANCY: &str = "Conditional Expectancy Analysis";
pub const ENTRY_TAG_PERFORMANCE: &str = "Performance by Entry Tag";
pub const EXIT_LOGIC: &str = "Exit Logic Diagnostics";
pub const CONDITIONAL_ENTRY_TAG: &str = "Conditional Entry Tag Performance";
pub const CAPITAL_EXPOSURE: &str = "Capital & Exposure Analysis";
pub const DRAWDOWN_STRUCTURE: &str = "Drawdown Structure & Failure Modes";
pub const FAILURE_MODES: &str = "Failure modes";
pub const EQUITY: &str = "__equity__";

// ─── Rows ───

/// One table row: ordered column → value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self { cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn cells(&self) -> &[(String, Value)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn from_json(map: &serde_json::Map<String, Json>) -> Self {
        Self { cells: map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect() }
    }
}

/// Ordered rows sharing the first row's column schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowsBlock {
    pub rows: Vec<Row>,
    /// Sibling metadata of `rows` (`sorted_by`, `context`, ...).
    pub meta: Vec<(String, Value)>,
}

impl RowsBlock {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, meta: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Column names of the first row, in order.
    pub fn schema(&self) -> Vec<&str> {
        self.rows.first().map(|r| r.columns().collect()).unwrap_or_default()
    }
}

// ─── Grouped values ───

/// Flat key → value mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedBlock {
    entries: Vec<(String, Value)>,
}

impl GroupedBlock {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self { entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole group as a single row, keys as columns.
    pub fn as_row(&self) -> Row {
        Row { cells: self.entries.clone() }
    }
}

// ─── Equity series ───

/// Unvalidated series columns as they appear in the document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesColumns {
    pub time: Vec<Value>,
    pub equity: Vec<Value>,
    pub drawdown: Option<Vec<Value>>,
}

/// Index-aligned equity curve.
#[derive(Clone, Debug, PartialEq)]
pub struct EquitySeries {
    pub time: Vec<String>,
    pub equity: Vec<f64>,
    pub drawdown: Vec<f64>,
}

impl EquitySeries {
    pub fn new(time: Vec<String>, equity: Vec<f64>, drawdown: Vec<f64>) -> Result<Self, SectionError> {
        if time.len() != equity.len() || time.len() != drawdown.len() {
            return Err(SectionError::SeriesLength {
                time: time.len(),
                equity: equity.len(),
                drawdown: drawdown.len(),
            });
        }
        Ok(Self { time, equity, drawdown })
    }

    /// Validates column lengths. A missing drawdown column reads as zeros.
    pub fn from_columns(cols: &SeriesColumns) -> Result<Self, SectionError> {
        let time: Vec<String> = cols.time.iter().map(Value::display).collect();
        let equity: Vec<f64> = cols.equity.iter().map(Value::number).collect();
        let drawdown = match &cols.drawdown {
            Some(d) => d.iter().map(Value::number).collect(),
            None => vec![0.0; time.len()],
        };
        Self::new(time, equity, drawdown)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Starting balance.
    pub fn initial(&self) -> Option<f64> {
        self.equity.first().copied()
    }
}

// ─── Payload ───

/// One section (or sub-section) of the document.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionPayload {
    Rows(RowsBlock),
    Group(GroupedBlock),
    Nested(Vec<(String, SectionPayload)>),
    Series(SeriesColumns),
    Leaf(Value),
}

impl SectionPayload {
    pub fn from_json(v: &Json) -> Self {
        match v {
            Json::Object(map) => {
                if let Some(Json::Array(rows)) = map.get("rows") {
                    let meta = map
                        .iter()
                        .filter(|(k, v)| k.as_str() != "rows" && is_leaf(v))
                        .map(|(k, v)| (k.clone(), Value::from_json(v)))
                        .collect();
                    return SectionPayload::Rows(RowsBlock { rows: rows_from_json(rows), meta });
                }
                if let (Some(Json::Array(time)), Some(Json::Array(equity))) = (map.get("time"), map.get("equity")) {
                    let drawdown = match map.get("drawdown") {
                        Some(Json::Array(d)) => Some(d.iter().map(Value::from_json).collect()),
                        _ => None,
                    };
                    return SectionPayload::Series(SeriesColumns {
                        time: time.iter().map(Value::from_json).collect(),
                        equity: equity.iter().map(Value::from_json).collect(),
                        drawdown,
                    });
                }
                if value::is_box(map) {
                    return SectionPayload::Leaf(Value::from_json(v));
                }
                if map.values().all(is_leaf) {
                    return SectionPayload::Group(GroupedBlock {
                        entries: map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect(),
                    });
                }
                SectionPayload::Nested(map.iter().map(|(k, v)| (k.clone(), Self::from_json(v))).collect())
            }
            Json::Array(items) if !items.is_empty() && items.iter().all(Json::is_object) => {
                SectionPayload::Rows(RowsBlock::new(rows_from_json(items)))
            }
            other => SectionPayload::Leaf(Value::from_json(other)),
        }
    }

    /// Child payload by key. Groups expose their values as leaves.
    pub fn get(&self, key: &str) -> Option<&SectionPayload> {
        match self {
            SectionPayload::Nested(children) => children.iter().find(|(k, _)| k == key).map(|(_, p)| p),
            _ => None,
        }
    }

    /// Named children of a nested payload, in document order.
    pub fn children(&self) -> &[(String, SectionPayload)] {
        match self {
            SectionPayload::Nested(children) => children,
            _ => &[],
        }
    }

    pub fn as_rows(&self) -> Option<&RowsBlock> {
        match self {
            SectionPayload::Rows(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupedBlock> {
        match self {
            SectionPayload::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SectionPayload::Rows(r) => r.is_empty(),
            SectionPayload::Group(g) => g.is_empty(),
            SectionPayload::Nested(c) => c.is_empty(),
            SectionPayload::Series(s) => s.time.is_empty(),
            SectionPayload::Leaf(v) => matches!(v, Value::Null),
        }
    }
}

fn is_leaf(v: &Json) -> bool {
    match v {
        Json::Object(map) => value::is_box(map),
        Json::Array(_) => false,
        _ => true,
    }
}

fn rows_from_json(items: &[Json]) -> Vec<Row> {
    items.iter().filter_map(Json::as_object).map(Row::from_json).collect()
}

// ─── Document ───

/// The whole report: section name → payload, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportDocument {
    sections: Vec<(String, SectionPayload)>,
}

impl ReportDocument {
    pub fn from_json(root: &Json) -> Result<Self, ReportError> {
        let map = match root {
            Json::Object(map) => map,
            Json::Array(_) => return Err(ReportError::NotAnObject("array")),
            Json::String(_) => return Err(ReportError::NotAnObject("string")),
            Json::Number(_) => return Err(ReportError::NotAnObject("number")),
            Json::Bool(_) => return Err(ReportError::NotAnObject("bool")),
            Json::Null => return Err(ReportError::NotAnObject("null")),
        };
        Ok(Self {
            sections: map.iter().map(|(k, v)| (k.clone(), SectionPayload::from_json(v))).collect(),
        })
    }

    pub fn from_sections<K: Into<String>>(sections: impl IntoIterator<Item = (K, SectionPayload)>) -> Self {
        Self { sections: sections.into_iter().map(|(k, p)| (k.into(), p)).collect() }
    }

    pub fn section(&self, key: &str) -> Option<&SectionPayload> {
        self.sections.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    /// Payload at a key path, e.g. `[TRADE_DISTRIBUTION, R_MULTIPLE_DISTRIBUTION]`.
    pub fn lookup(&self, path: &[&str]) -> Option<&SectionPayload> {
        let (first, rest) = path.split_first()?;
        rest.iter().try_fold(self.section(first)?, |p, key| p.get(key))
    }

    /// Non-empty rows at a key path.
    pub fn rows(&self, path: &[&str]) -> Option<&RowsBlock> {
        self.lookup(path).and_then(SectionPayload::as_rows).filter(|r| !r.is_empty())
    }

    /// The equity curve. `Ok(None)` when the document carries none.
    pub fn equity(&self) -> Result<Option<EquitySeries>, SectionError> {
        match self.section(EQUITY) {
            Some(SectionPayload::Series(cols)) => EquitySeries::from_columns(cols).map(Some),
            Some(SectionPayload::Leaf(Value::Null)) | None => Ok(None),
            Some(_) => Err(SectionError::Shape {
                key: EQUITY.to_string(),
                detail: "expected time/equity/drawdown arrays".to_string(),
            }),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
