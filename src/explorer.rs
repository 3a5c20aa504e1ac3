//! Conditional entry-tag explorer: filter / sort / classify the per-context
//! breakdown of one entry tag and lay it out as bar charts.
//!
//! State is `{selected tag, metric, min trades, sort direction}`. Every control
//! change is followed by a full re-render of the explorer's two mounts.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::chart::{self, Figure};
use crate::error::SectionError;
use crate::report::{display, number, ReportDocument, RowsBlock, CONDITIONAL_ENTRY_TAG, ENTRY_TAG_PERFORMANCE};
use crate::sections::RenderOutcome;
use crate::view::{Element, MountId, MountSet, TableView};

/// Tags are compared by display text everywhere, so boxed tags with equal
/// display text but different raw values collapse into one tag.
pub const TAG_COLUMN: &str = "Entry tag";
pub const CONTEXT_COLUMN: &str = "Context";
pub const TRADES_COLUMN: &str = "Trades";

/// Metric columns the explorer can rank by, in cycle order.
pub const METRICS: [&str; 3] = ["Expectancy (USD)", "Win rate", "Total PnL"];

/// Diagnostics block the report engine emits next to the context tables.
pub const CONTEXT_ISSUES: &str = "__context_issues__";

// ─── State ───

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Initial control values.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerDefaults {
    pub metric: String,
    pub min_trades: u32,
    pub sort: SortDirection,
    pub min_trades_step: u32,
}

impl Default for ExplorerDefaults {
    fn default() -> Self {
        Self {
            metric: METRICS[0].to_string(),
            min_trades: 0,
            sort: SortDirection::Desc,
            min_trades_step: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExplorerState {
    pub selected_tag: String,
    pub metric: String,
    pub min_trades: u32,
    pub sort: SortDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    NextTag,
    PrevTag,
    SelectTag(String),
    NextMetric,
    PrevMetric,
    RaiseMinTrades,
    LowerMinTrades,
    SetMinTrades(u32),
    ToggleSort,
}

// ─── Computed view ───

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextClass {
    TimeBased,
    Categorical,
}

/// Time-based when the context name mentions "hour" or "weekday", any case.
pub fn classify(context: &str) -> ContextClass {
    let lower = context.to_lowercase();
    if lower.contains("hour") || lower.contains("weekday") {
        ContextClass::TimeBased
    } else {
        ContextClass::Categorical
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextChart {
    pub name: String,
    pub class: ContextClass,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl ContextChart {
    pub fn figure(&self, metric: &str) -> Figure {
        let height = match self.class {
            ContextClass::TimeBased => 14,
            ContextClass::Categorical => 10,
        };
        chart::diverging_bar(&self.name, self.categories.clone(), self.values.clone())
            .y_title(metric)
            .height(height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExplorerView {
    pub summary: Option<TableView>,
    /// Categorical contexts in encounter order, then at most one time-based context.
    pub charts: Vec<ContextChart>,
    pub issues: Option<TableView>,
}

// ─── Explorer ───

#[derive(Clone, Debug)]
pub struct ConditionalExplorer {
    tags: Vec<String>,
    state: ExplorerState,
    step: u32,
}

impl ConditionalExplorer {
    /// `None` when the document lacks either the per-tag table or the
    /// conditional breakdown. Tags are deduplicated on display text.
    pub fn new(doc: &ReportDocument, defaults: &ExplorerDefaults) -> Option<Self> {
        let base = doc.rows(&[ENTRY_TAG_PERFORMANCE])?;
        doc.section(CONDITIONAL_ENTRY_TAG).filter(|s| !s.is_empty())?;

        let mut tags: Vec<String> = Vec::new();
        for row in &base.rows {
            let tag = display(row.get(TAG_COLUMN));
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        let selected_tag = tags.first()?.clone();

        Some(Self {
            tags,
            state: ExplorerState {
                selected_tag,
                metric: defaults.metric.clone(),
                min_trades: defaults.min_trades,
                sort: defaults.sort,
            },
            step: defaults.min_trades_step.max(1),
        })
    }

    pub fn state(&self) -> &ExplorerState {
        &self.state
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Apply one control. Returns whether the state changed.
    pub fn apply(&mut self, control: Control) -> bool {
        let before = self.state.clone();
        match control {
            Control::NextTag => self.state.selected_tag = self.cycle_tag(1),
            Control::PrevTag => self.state.selected_tag = self.cycle_tag(self.tags.len().saturating_sub(1)),
            Control::SelectTag(tag) => {
                if self.tags.contains(&tag) {
                    self.state.selected_tag = tag;
                }
            }
            Control::NextMetric => self.state.metric = cycle_metric(&self.state.metric, 1),
            Control::PrevMetric => self.state.metric = cycle_metric(&self.state.metric, METRICS.len() - 1),
            Control::RaiseMinTrades => self.state.min_trades = self.state.min_trades.saturating_add(self.step),
            Control::LowerMinTrades => self.state.min_trades = self.state.min_trades.saturating_sub(self.step),
            Control::SetMinTrades(n) => self.state.min_trades = n,
            Control::ToggleSort => self.state.sort = self.state.sort.toggle(),
        }
        self.state != before
    }

    fn cycle_tag(&self, offset: usize) -> String {
        if self.tags.is_empty() {
            return self.state.selected_tag.clone();
        }
        let idx = self.tags.iter().position(|t| *t == self.state.selected_tag).unwrap_or(0);
        self.tags[(idx + offset) % self.tags.len()].clone()
    }

    /// Filter, sort and classify every context block for the current state.
    pub fn compute(&self, doc: &ReportDocument) -> ExplorerView {
        let state = &self.state;

        let summary = doc
            .rows(&[ENTRY_TAG_PERFORMANCE])
            .and_then(|base| base.rows.iter().find(|r| display(r.get(TAG_COLUMN)) == state.selected_tag))
            .and_then(|row| TableView::from_row(row).ok());

        let mut categorical = Vec::new();
        let mut time_based = Vec::new();
        let mut issues = None;

        let contexts = doc.section(CONDITIONAL_ENTRY_TAG).map(|s| s.children()).unwrap_or(&[]);
        for (name, payload) in contexts {
            let Some(block) = payload.as_rows() else { continue };
            if name == CONTEXT_ISSUES {
                issues = TableView::from_rows(&block.rows).ok().map(|t| t.titled("Context issues"));
                continue;
            }
            let Some(chart) = context_chart(name, block, state) else {
                debug!(context = %name, tag = %state.selected_tag, "context has no rows after filtering");
                continue;
            };
            match chart.class {
                ContextClass::Categorical => categorical.push(chart),
                ContextClass::TimeBased => time_based.push(chart),
            }
        }

        // single slot for time dimensions: only the first one is shown
        let mut charts = categorical;
        if let Some(first_time) = time_based.into_iter().next() {
            charts.push(first_time);
        }

        ExplorerView { summary, charts, issues }
    }

    /// Clear and rebuild the summary and grid mounts. No-op unless both are present.
    pub fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains_all(&[MountId::EntryTagSummary, MountId::ConditionalEntryGrid]) {
            return Ok(RenderOutcome::Skipped("explorer mounts absent"));
        }
        let view = self.compute(doc);

        let mut summary = Vec::new();
        if let Some(table) = view.summary {
            summary.push(Element::Table(table.titled(format!("{}: {}", TAG_COLUMN, self.state.selected_tag))));
        }
        if let Some(issues) = view.issues {
            summary.push(Element::Table(issues));
        }
        mounts.replace(MountId::EntryTagSummary, summary);

        let grid = view.charts.iter().map(|c| Element::Figure(c.figure(&self.state.metric))).collect();
        mounts.replace(MountId::ConditionalEntryGrid, grid);

        Ok(RenderOutcome::Rendered)
    }
}

fn cycle_metric(current: &str, offset: usize) -> String {
    let idx = METRICS.iter().position(|m| *m == current);
    match idx {
        Some(i) => METRICS[(i + offset) % METRICS.len()].to_string(),
        // a custom metric from config steps onto the fixed list
        None => METRICS[0].to_string(),
    }
}

fn context_chart(name: &str, block: &RowsBlock, state: &ExplorerState) -> Option<ContextChart> {
    let min_trades = state.min_trades as f64;
    let mut rows: Vec<_> = block
        .rows
        .iter()
        .filter(|r| display(r.get(TAG_COLUMN)) == state.selected_tag && number(r.get(TRADES_COLUMN)) >= min_trades)
        .collect();
    if rows.is_empty() {
        return None;
    }

    // stable: ties keep their input order in both directions
    rows.sort_by(|a, b| {
        let va = number(a.get(&state.metric));
        let vb = number(b.get(&state.metric));
        let ord = va.partial_cmp(&vb).unwrap_or(Ordering::Equal);
        match state.sort {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    Some(ContextChart {
        name: name.to_string(),
        class: classify(name),
        categories: rows.iter().map(|r| display(r.get(CONTEXT_COLUMN))).collect(),
        values: rows.iter().map(|r| number(r.get(&state.metric))).collect(),
    })
}
