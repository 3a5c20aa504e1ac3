use crate::chart::theme::{ACCENT, NEGATIVE};
use crate::chart::{Figure, ScatterTrace, Trace};
use crate::error::SectionError;
use crate::report::{EquitySeries, ReportDocument, EQUITY};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{Element, MountId, MountSet};

/// Equity line with the drawdown underwater area on a second axis.
pub struct EquityDrawdownSection;

impl SectionRenderer for EquityDrawdownSection {
    fn key(&self) -> &'static str {
        EQUITY
    }

    fn mounts(&self) -> &'static [MountId] {
        &[MountId::EquityDrawdown]
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains(MountId::EquityDrawdown) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let Some(series) = doc.equity()?.filter(|s| !s.is_empty()) else {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        };
        mounts.replace(MountId::EquityDrawdown, vec![Element::Figure(equity_figure(&series))]);
        Ok(RenderOutcome::Rendered)
    }
}

pub fn equity_figure(series: &EquitySeries) -> Figure {
    // drawdown is plotted below zero whatever sign the report used
    let underwater: Vec<f64> = series.drawdown.iter().map(|d| -d.abs()).collect();
    Figure::new("Equity & drawdown")
        .trace(Trace::Scatter(ScatterTrace::line("Equity", series.time.clone(), series.equity.clone(), ACCENT)))
        .trace(Trace::Scatter(
            ScatterTrace::line("Drawdown", series.time.clone(), underwater, NEGATIVE)
                .filled()
                .on_secondary_axis(),
        ))
        .x_title("Time")
        .y_title("Equity")
        .y2_title("Drawdown")
        .legend()
        .height(16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_report;
    use serde_json::json;

    #[test]
    fn test_drawdown_plotted_negative_on_secondary_axis() {
        let doc = sample_report();
        let mut mounts = MountSet::all();
        assert_eq!(EquityDrawdownSection.render(&doc, &mut mounts), Ok(RenderOutcome::Rendered));
        let fig = mounts.get(MountId::EquityDrawdown).unwrap().figures().next().unwrap();
        let traces: Vec<_> = fig.scatters().collect();
        assert_eq!(traces.len(), 2);
        assert!(!traces[0].secondary_y);
        assert!(traces[1].secondary_y && traces[1].fill_to_zero);
        assert!(traces[1].y.iter().all(|v| *v <= 0.0));
    }

    #[test]
    fn test_malformed_series_is_error() {
        let doc = ReportDocument::from_json(&json!({
            "__equity__": {"time": ["a"], "equity": [1.0, 2.0]}
        }))
        .unwrap();
        let mut mounts = MountSet::all();
        assert!(matches!(
            EquityDrawdownSection.render(&doc, &mut mounts),
            Err(SectionError::SeriesLength { .. })
        ));
    }

    #[test]
    fn test_missing_series_is_silent() {
        let mut mounts = MountSet::all();
        assert_eq!(
            EquityDrawdownSection.render(&ReportDocument::default(), &mut mounts),
            Ok(RenderOutcome::Skipped(NO_DATA))
        );
        assert!(mounts.elements(MountId::EquityDrawdown).is_empty());
    }
}
