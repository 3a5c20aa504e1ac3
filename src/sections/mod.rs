pub mod backtest_config;
pub mod capital_exposure;
pub mod conditional_entry_tag;
pub mod conditional_expectancy;
pub mod diagnostics;
pub mod drawdown_structure;
pub mod equity_drawdown;
pub mod kpi;
pub mod trade_distribution;

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SectionError;
use crate::explorer::ExplorerDefaults;
use crate::report::ReportDocument;
use crate::view::{MountId, MountSet};

pub(crate) const MOUNT_ABSENT: &str = "mount absent";
pub(crate) const NO_DATA: &str = "section absent or empty";

/// What a renderer did with the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// Absent data or absent mount: nothing was touched.
    Skipped(&'static str),
}

/// Section renderer: reads one part of the document, rebuilds its own mounts.
/// Every call clears those mounts first, so calling twice never appends.
pub trait SectionRenderer {
    /// Report key the renderer reads.
    fn key(&self) -> &'static str;
    /// Mounts the renderer owns.
    fn mounts(&self) -> &'static [MountId];
    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError>;
}

// ─── Dispatch report ───

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SectionStatus {
    Rendered,
    Skipped(&'static str),
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub sections: Vec<(&'static str, SectionStatus)>,
}

impl DispatchReport {
    pub fn status(&self, key: &str) -> Option<&SectionStatus> {
        self.sections.iter().find(|(k, _)| *k == key).map(|(_, s)| s)
    }

    pub fn rendered(&self) -> usize {
        self.sections.iter().filter(|(_, s)| *s == SectionStatus::Rendered).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.sections.iter().filter_map(|(k, s)| match s {
            SectionStatus::Failed(msg) => Some((*k, msg.as_str())),
            _ => None,
        })
    }
}

// ─── Dispatcher ───

pub struct SectionDispatcher {
    renderers: Vec<Box<dyn SectionRenderer>>,
}

impl SectionDispatcher {
    /// The dashboard's fixed registry, in invocation order.
    pub fn standard(defaults: &ExplorerDefaults) -> Self {
        Self::with_renderers(vec![
            Box::new(kpi::KpiSection),
            Box::new(backtest_config::BacktestConfigSection),
            Box::new(trade_distribution::TradeDistributionSection),
            Box::new(conditional_expectancy::ConditionalExpectancySection),
            Box::new(equity_drawdown::EquityDrawdownSection),
            Box::new(diagnostics::DiagnosticsSection),
            Box::new(capital_exposure::CapitalExposureSection),
            Box::new(drawdown_structure::DrawdownStructureSection),
            Box::new(conditional_entry_tag::ConditionalEntryTagSection::new(defaults.clone())),
        ])
    }

    pub fn with_renderers(renderers: Vec<Box<dyn SectionRenderer>>) -> Self {
        Self { renderers }
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.key()).collect()
    }

    /// Run every renderer. Each runs behind its own fault boundary: an error or
    /// panic is logged, the section's mounts are cleared, and the rest still run.
    pub fn dispatch(&self, doc: &ReportDocument, mounts: &mut MountSet) -> DispatchReport {
        let mut report = DispatchReport::default();
        for renderer in &self.renderers {
            let key = renderer.key();
            let result = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(doc, mounts)))
                .unwrap_or_else(|payload| Err(SectionError::Panicked(panic_message(payload.as_ref()))));

            let status = match result {
                Ok(RenderOutcome::Rendered) => SectionStatus::Rendered,
                Ok(RenderOutcome::Skipped(reason)) => {
                    debug!(section = key, reason, "section skipped");
                    SectionStatus::Skipped(reason)
                }
                Err(e) => {
                    warn!(section = key, error = %e, "section failed, clearing its mounts");
                    for id in renderer.mounts() {
                        mounts.clear(*id);
                    }
                    SectionStatus::Failed(e.to_string())
                }
            };
            report.sections.push((key, status));
        }
        info!(
            rendered = report.rendered(),
            failed = report.failed().count(),
            total = report.sections.len(),
            "dispatch complete"
        );
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CONDITIONAL_EXPECTANCY, CORE_PERFORMANCE, DRAWDOWN_STRUCTURE, EQUITY};
    use crate::test_helpers::{sample_json, sample_report};
    use crate::view::Element;

    struct Exploding;

    impl SectionRenderer for Exploding {
        fn key(&self) -> &'static str {
            "exploding"
        }
        fn mounts(&self) -> &'static [MountId] {
            &[MountId::Diagnostics]
        }
        fn render(&self, _doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
            mounts.replace(MountId::Diagnostics, vec![Element::heading("half-built")]);
            panic!("boom");
        }
    }

    struct Failing;

    impl SectionRenderer for Failing {
        fn key(&self) -> &'static str {
            "failing"
        }
        fn mounts(&self) -> &'static [MountId] {
            &[MountId::CapitalSummary]
        }
        fn render(&self, _doc: &ReportDocument, _mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
            Err(SectionError::EmptyTable)
        }
    }

    #[test]
    fn test_standard_registry_order() {
        let d = SectionDispatcher::standard(&ExplorerDefaults::default());
        assert_eq!(d.keys().len(), 9);
        assert_eq!(d.keys()[0], CORE_PERFORMANCE);
        assert_eq!(d.keys()[7], DRAWDOWN_STRUCTURE);
    }

    #[test]
    fn test_full_dispatch_renders_every_section() {
        let doc = sample_report();
        let mut mounts = MountSet::all();
        let report = SectionDispatcher::standard(&ExplorerDefaults::default()).dispatch(&doc, &mut mounts);
        assert_eq!(report.failed().count(), 0, "{:?}", report);
        assert_eq!(report.rendered(), 9, "{:?}", report);
        for (id, mount) in mounts.iter() {
            assert!(!mount.is_empty(), "{:?} left empty", id);
        }
    }

    #[test]
    fn test_failure_is_isolated() {
        let doc = sample_report();
        let mut mounts = MountSet::all();
        let d = SectionDispatcher::with_renderers(vec![
            Box::new(Exploding),
            Box::new(Failing),
            Box::new(kpi::KpiSection),
        ]);
        let report = d.dispatch(&doc, &mut mounts);
        assert!(matches!(report.status("exploding"), Some(SectionStatus::Failed(m)) if m.contains("boom")));
        assert!(matches!(report.status("failing"), Some(SectionStatus::Failed(_))));
        assert_eq!(report.status(CORE_PERFORMANCE), Some(&SectionStatus::Rendered));
        // the panicking section leaves nothing half-built behind
        assert!(mounts.elements(MountId::Diagnostics).is_empty());
        assert!(!mounts.elements(MountId::KpiTable).is_empty());
    }

    #[test]
    fn test_missing_mounts_and_sections_are_skipped() {
        let doc = sample_report();
        let mut mounts = MountSet::only(&[MountId::KpiTable]);
        let report = SectionDispatcher::standard(&ExplorerDefaults::default()).dispatch(&doc, &mut mounts);
        assert_eq!(report.rendered(), 1);
        assert_eq!(report.failed().count(), 0);

        let empty = ReportDocument::default();
        let mut mounts = MountSet::all();
        let report = SectionDispatcher::standard(&ExplorerDefaults::default()).dispatch(&empty, &mut mounts);
        assert_eq!(report.rendered(), 0);
        assert_eq!(report.failed().count(), 0);
        assert!(mounts.iter().all(|(_, m)| m.is_empty()));
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let doc = sample_report();
        let d = SectionDispatcher::standard(&ExplorerDefaults::default());
        let mut once = MountSet::all();
        d.dispatch(&doc, &mut once);
        let mut twice = once.clone();
        d.dispatch(&doc, &mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dispatch_refresh_with_different_report() {
        let d = SectionDispatcher::standard(&ExplorerDefaults::default());
        let mut first = MountSet::all();
        d.dispatch(&sample_report(), &mut first);

        let mut json = sample_json();
        json[CORE_PERFORMANCE]["Total return (%)"] = serde_json::json!({"raw": -3.1, "display": "-3.1"});
        json[CONDITIONAL_EXPECTANCY] = serde_json::json!({
            "By hour of day": {"rows": [{"hour": 3, "Expectancy (USD)": 2.0}]}
        });
        json[DRAWDOWN_STRUCTURE]["Failure modes"]["rows"] = serde_json::json!([
            {"Start": "2024-01-03", "Depth": 120.0},
            {"Start": "2024-01-05", "Depth": 80.0}
        ]);
        json[EQUITY]["equity"] = serde_json::json!([1000.0, 1010.0]);
        let doc = ReportDocument::from_json(&json).unwrap();

        let mut mounts = first.clone();
        let report = d.dispatch(&doc, &mut mounts);

        let cards = match mounts.elements(MountId::KpiTable) {
            [Element::Cards { cards }] => cards,
            other => panic!("expected one cards element, got {:?}", other),
        };
        assert!(cards.iter().any(|c| c.value.starts_with("-3.1")));

        assert_eq!(mounts.elements(MountId::CondHour).len(), 1);
        assert_ne!(mounts.elements(MountId::CondHour), first.elements(MountId::CondHour));
        assert!(mounts.elements(MountId::CondWeekday).is_empty());
        assert!(mounts.elements(MountId::CondContextGrid).is_empty());

        assert!(matches!(report.status(EQUITY), Some(SectionStatus::Failed(_))));
        assert!(mounts.elements(MountId::EquityDrawdown).is_empty());

        let dd = mounts.get(MountId::DrawdownStructure).unwrap();
        assert_eq!(dd.tables().last().unwrap().len(), 2);
        assert_eq!(dd.figures().count(), 0);

        for id in [
            MountId::BacktestInfo,
            MountId::TradeRCount,
            MountId::Diagnostics,
            MountId::CapitalSummary,
            MountId::OvertradingPnl,
            MountId::EntryTagSummary,
            MountId::ConditionalEntryGrid,
        ] {
            assert_eq!(mounts.elements(id), first.elements(id), "{:?} changed", id);
        }
    }
}
