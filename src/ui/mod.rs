//! Interactive terminal host: tabs over the mount set, explorer controls on
//! the keyboard.

pub mod figure;
pub mod render;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, warn};

use crate::explorer::{ConditionalExplorer, Control, ExplorerDefaults};
use crate::report::ReportDocument;
use crate::sections::{DispatchReport, SectionDispatcher};
use crate::view::{Element, MountId, MountSet};

// ─── Tabs ───

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Distribution,
    Equity,
    Diagnostics,
    Capital,
    Explorer,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Distribution, Tab::Equity, Tab::Diagnostics, Tab::Capital, Tab::Explorer]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Distribution => "Distribution",
            Tab::Equity => "Equity",
            Tab::Diagnostics => "Diagnostics",
            Tab::Capital => "Capital",
            Tab::Explorer => "Explorer",
        }
    }

    /// Mounts shown on this tab, top to bottom.
    pub fn mounts(&self) -> &'static [MountId] {
        match self {
            Tab::Overview => &[MountId::KpiTable, MountId::BacktestInfo],
            Tab::Distribution => &[
                MountId::TradeRCount,
                MountId::TradeRShare,
                MountId::TradeRDuration,
                MountId::CondHour,
                MountId::CondWeekday,
                MountId::CondContextGrid,
            ],
            Tab::Equity => &[MountId::EquityDrawdown, MountId::DrawdownStructure],
            Tab::Diagnostics => &[MountId::Diagnostics],
            Tab::Capital => &[
                MountId::CapitalSummary,
                MountId::OvertradingTable,
                MountId::OvertradingPnl,
                MountId::OvertradingDd,
            ],
            Tab::Explorer => &[MountId::EntryTagSummary, MountId::ConditionalEntryGrid],
        }
    }

    pub fn next(&self) -> Tab {
        let tabs = Self::all();
        let idx = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }

    pub fn prev(&self) -> Tab {
        let tabs = Self::all();
        let idx = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(idx + tabs.len() - 1) % tabs.len()]
    }
}

// ─── App ───

/// One line of the body: a mount banner or one of its elements.
#[derive(Clone, Copy, Debug)]
pub enum Item<'a> {
    Mount { id: MountId, empty: bool },
    Element(&'a Element),
}

pub struct App {
    pub doc: ReportDocument,
    /// Where the report was loaded from, for the header.
    pub source: String,
    pub mounts: MountSet,
    pub explorer: Option<ConditionalExplorer>,
    pub dispatch: DispatchReport,
    pub tab: Tab,
    /// First visible item of the current tab.
    pub scroll: usize,
}

impl App {
    /// Render every section once, then keep an explorer for re-renders.
    pub fn new(doc: ReportDocument, source: impl Into<String>, defaults: &ExplorerDefaults) -> Self {
        let mut mounts = MountSet::all();
        let dispatch = SectionDispatcher::standard(defaults).dispatch(&doc, &mut mounts);
        let explorer = ConditionalExplorer::new(&doc, defaults);
        Self {
            doc,
            source: source.into(),
            mounts,
            explorer,
            dispatch,
            tab: Tab::Overview,
            scroll: 0,
        }
    }

    /// Apply an explorer control and rebuild its mounts when the state moved.
    pub fn control(&mut self, control: Control) {
        let Some(explorer) = self.explorer.as_mut() else {
            debug!("explorer control ignored, no conditional data");
            return;
        };
        if !explorer.apply(control) {
            return;
        }
        if let Err(e) = explorer.render(&self.doc, &mut self.mounts) {
            warn!(error = %e, "explorer re-render failed");
        }
    }

    pub fn items(&self) -> Vec<Item<'_>> {
        let mut items = Vec::new();
        for id in self.tab.mounts() {
            let elements = self.mounts.elements(*id);
            items.push(Item::Mount { id: *id, empty: elements.is_empty() });
            items.extend(elements.iter().map(Item::Element));
        }
        items
    }

    fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        let last = self.items().len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(last);
    }
}

// ─── Keys ───

/// Returns true when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,

        // Tab switching
        KeyCode::Tab => app.set_tab(app.tab.next()),
        KeyCode::BackTab => app.set_tab(app.tab.prev()),
        KeyCode::Char(c @ '1'..='6') => {
            let idx = c as usize - '1' as usize;
            app.set_tab(Tab::all()[idx]);
        }

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_by(-1),
        KeyCode::PageDown => app.scroll_by(5),
        KeyCode::PageUp => app.scroll_by(-5),
        KeyCode::Home => app.scroll = 0,
        KeyCode::End => app.scroll = app.items().len().saturating_sub(1),

        // Explorer controls
        KeyCode::Char(c) if app.tab == Tab::Explorer => {
            let control = match c {
                't' => Control::NextTag,
                'T' => Control::PrevTag,
                'm' => Control::NextMetric,
                'M' => Control::PrevMetric,
                '+' | '=' => Control::RaiseMinTrades,
                '-' => Control::LowerMinTrades,
                '0' => Control::SetMinTrades(0),
                's' => Control::ToggleSort,
                _ => return false,
            };
            app.control(control);
        }
        _ => {}
    }
    false
}
