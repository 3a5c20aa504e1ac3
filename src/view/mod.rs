//! Mounts: named element containers the section renderers rebuild and the
//! hosts (terminal UI, text dump, JSON export) draw.

pub mod kpi;
pub mod table;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::chart::Figure;

pub use kpi::KpiCard;
pub use table::TableView;

// ─── Mount ids ───

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MountId {
    #[serde(rename = "kpi-table")]
    KpiTable,
    #[serde(rename = "backtest-info-table")]
    BacktestInfo,
    #[serde(rename = "trade-r-count")]
    TradeRCount,
    #[serde(rename = "trade-r-share")]
    TradeRShare,
    #[serde(rename = "trade-r-duration")]
    TradeRDuration,
    #[serde(rename = "cond-hour")]
    CondHour,
    #[serde(rename = "cond-weekday")]
    CondWeekday,
    #[serde(rename = "cond-context-grid")]
    CondContextGrid,
    #[serde(rename = "equity-drawdown-chart")]
    EquityDrawdown,
    #[serde(rename = "diagnostics")]
    Diagnostics,
    #[serde(rename = "capital-summary")]
    CapitalSummary,
    #[serde(rename = "overtrading-table")]
    OvertradingTable,
    #[serde(rename = "overtrading-chart-pnl")]
    OvertradingPnl,
    #[serde(rename = "overtrading-chart-dd")]
    OvertradingDd,
    #[serde(rename = "drawdown-structure")]
    DrawdownStructure,
    #[serde(rename = "entry-tag-summary")]
    EntryTagSummary,
    #[serde(rename = "conditional-entry-grid")]
    ConditionalEntryGrid,
}

impl MountId {
    pub fn all() -> &'static [MountId] {
        &[
            MountId::KpiTable,
            MountId::BacktestInfo,
            MountId::TradeRCount,
            MountId::TradeRShare,
            MountId::TradeRDuration,
            MountId::CondHour,
            MountId::CondWeekday,
            MountId::CondContextGrid,
            MountId::EquityDrawdown,
            MountId::Diagnostics,
            MountId::CapitalSummary,
            MountId::OvertradingTable,
            MountId::OvertradingPnl,
            MountId::OvertradingDd,
            MountId::DrawdownStructure,
            MountId::EntryTagSummary,
            MountId::ConditionalEntryGrid,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MountId::KpiTable => "Key metrics",
            MountId::BacktestInfo => "Backtest configuration",
            MountId::TradeRCount => "Trades by R bucket",
            MountId::TradeRShare => "Share by R bucket",
            MountId::TradeRDuration => "Duration by R bucket",
            MountId::CondHour => "Expectancy by hour",
            MountId::CondWeekday => "Expectancy by weekday",
            MountId::CondContextGrid => "Expectancy by context",
            MountId::EquityDrawdown => "Equity & drawdown",
            MountId::Diagnostics => "Entry / exit diagnostics",
            MountId::CapitalSummary => "Capital summary",
            MountId::OvertradingTable => "Overtrading diagnostics",
            MountId::OvertradingPnl => "Avg PnL by trades/day",
            MountId::OvertradingDd => "Worst DD by trades/day",
            MountId::DrawdownStructure => "Drawdown structure",
            MountId::EntryTagSummary => "Entry tag summary",
            MountId::ConditionalEntryGrid => "Conditional entry tag performance",
        }
    }
}

// ─── Elements ───

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Heading { text: String },
    Table(TableView),
    Cards { cards: Vec<KpiCard> },
    Figure(Figure),
}

impl Element {
    pub fn heading(text: impl Into<String>) -> Self {
        Element::Heading { text: text.into() }
    }
}

// ─── Mounts ───

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Mount {
    elements: Vec<Element>,
}

impl Mount {
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.elements.iter().filter_map(|e| match e {
            Element::Figure(f) => Some(f),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableView> {
        self.elements.iter().filter_map(|e| match e {
            Element::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// The host's set of mounts. A renderer whose mount is not in the set does nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MountSet {
    mounts: BTreeMap<MountId, Mount>,
}

impl MountSet {
    /// Every known mount, all empty.
    pub fn all() -> Self {
        Self::only(MountId::all())
    }

    pub fn only(ids: &[MountId]) -> Self {
        Self { mounts: ids.iter().map(|id| (*id, Mount::default())).collect() }
    }

    pub fn contains(&self, id: MountId) -> bool {
        self.mounts.contains_key(&id)
    }

    pub fn contains_all(&self, ids: &[MountId]) -> bool {
        ids.iter().all(|id| self.contains(*id))
    }

    pub fn get(&self, id: MountId) -> Option<&Mount> {
        self.mounts.get(&id)
    }

    pub fn get_mut(&mut self, id: MountId) -> Option<&mut Mount> {
        self.mounts.get_mut(&id)
    }

    /// Clear the mount and fill it with `elements`. False when the mount is absent.
    pub fn replace(&mut self, id: MountId, elements: Vec<Element>) -> bool {
        match self.mounts.get_mut(&id) {
            Some(mount) => {
                mount.elements = elements;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, id: MountId) {
        if let Some(mount) = self.mounts.get_mut(&id) {
            mount.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MountId, &Mount)> {
        self.mounts.iter().map(|(id, m)| (*id, m))
    }

    /// Elements of a mount, empty when the mount is absent.
    pub fn elements(&self, id: MountId) -> &[Element] {
        self.mounts.get(&id).map(Mount::elements).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_clears_previous_content() {
        let mut mounts = MountSet::all();
        assert!(mounts.replace(MountId::KpiTable, vec![Element::heading("a"), Element::heading("b")]));
        assert!(mounts.replace(MountId::KpiTable, vec![Element::heading("c")]));
        assert_eq!(mounts.elements(MountId::KpiTable), &[Element::heading("c")]);
    }

    #[test]
    fn test_absent_mount() {
        let mut mounts = MountSet::only(&[MountId::KpiTable]);
        assert!(!mounts.replace(MountId::Diagnostics, vec![Element::heading("x")]));
        assert!(mounts.elements(MountId::Diagnostics).is_empty());
        assert!(!mounts.contains_all(&[MountId::KpiTable, MountId::Diagnostics]));
    }

    #[test]
    fn test_serializes_with_dom_ids() {
        let mut mounts = MountSet::only(&[MountId::KpiTable]);
        mounts.replace(MountId::KpiTable, vec![Element::heading("Metrics")]);
        let json = serde_json::to_value(&mounts).unwrap();
        assert_eq!(json["kpi-table"][0]["type"], "heading");
        assert_eq!(json["kpi-table"][0]["text"], "Metrics");
    }
}
