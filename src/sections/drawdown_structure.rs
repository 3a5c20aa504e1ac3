use tracing::warn;

use crate::chart::theme::ACCENT;
use crate::chart::{Figure, ScatterTrace, Trace};
use crate::drawdown::{self, DrawdownAlignment};
use crate::error::SectionError;
use crate::report::{EquitySeries, ReportDocument, Row, SectionPayload, DRAWDOWN_STRUCTURE, FAILURE_MODES};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{Element, MountId, MountSet, TableView};

const SUMMARY: &str = "Summary";

/// Deepest drawdown episodes as a table, anchored on the equity curve.
pub struct DrawdownStructureSection;

impl SectionRenderer for DrawdownStructureSection {
    fn key(&self) -> &'static str {
        DRAWDOWN_STRUCTURE
    }

    fn mounts(&self) -> &'static [MountId] {
        &[MountId::DrawdownStructure]
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains(MountId::DrawdownStructure) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let Some(block) = doc.rows(&[DRAWDOWN_STRUCTURE, FAILURE_MODES]) else {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        };

        let mut elements = Vec::new();
        if let Some(summary) = doc.lookup(&[DRAWDOWN_STRUCTURE, SUMMARY]).and_then(SectionPayload::as_group) {
            if !summary.is_empty() {
                elements.push(Element::Table(TableView::key_values(summary, "Metric", "Value")?.titled(SUMMARY)));
            }
        }

        let top = drawdown::top_events(&block.rows);
        let top_rows: Vec<Row> = top.iter().map(|r| (*r).clone()).collect();
        elements.push(Element::Table(TableView::from_rows(&top_rows)?.titled("Top drawdowns")));

        // the tables stand alone when there is no usable curve to anchor on
        let series = match doc.equity() {
            Ok(series) => series.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(section = DRAWDOWN_STRUCTURE, error = %e, "equity series unusable, drawing tables only");
                None
            }
        };
        if let Some(series) = series {
            let alignment = drawdown::align(&block.rows, &series);
            elements.push(Element::Figure(markers_figure(&series, &alignment)));
        }

        mounts.replace(MountId::DrawdownStructure, elements);
        Ok(RenderOutcome::Rendered)
    }
}

fn markers_figure(series: &EquitySeries, alignment: &DrawdownAlignment<'_>) -> Figure {
    let x = alignment.markers.iter().map(|m| m.time.clone()).collect();
    let y = alignment.markers.iter().map(|m| m.equity).collect();
    let colors = alignment.markers.iter().map(|m| m.kind.color()).collect();
    Figure::new("Equity curve with drawdown events")
        .trace(Trace::Scatter(ScatterTrace::line("Equity", series.time.clone(), series.equity.clone(), ACCENT)))
        .trace(Trace::Scatter(ScatterTrace::markers("Drawdown start", x, y, colors)))
        .x_title("Time")
        .y_title("Equity")
        .legend()
        .height(16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::theme::{NEGATIVE, POSITIVE};
    use crate::test_helpers::sample_report;
    use serde_json::json;

    #[test]
    fn test_table_then_annotated_curve() {
        let doc = sample_report();
        let mut mounts = MountSet::all();
        assert_eq!(DrawdownStructureSection.render(&doc, &mut mounts), Ok(RenderOutcome::Rendered));
        let mount = mounts.get(MountId::DrawdownStructure).unwrap();

        let tables: Vec<_> = mount.tables().collect();
        assert_eq!(tables[0].title.as_deref(), Some("Summary"));
        let top = tables[1];
        assert_eq!(top.len(), 7);
        assert_eq!(top.cell(0, "Depth"), Some("120.00"));

        let fig = mount.figures().next().unwrap();
        let markers = fig.scatters().nth(1).unwrap();
        // one of the eight events has a start outside the curve
        assert!(markers.x.len() < 7);
        assert!(markers.colors.iter().all(|c| *c == POSITIVE || *c == NEGATIVE));
    }

    #[test]
    fn test_matches_worked_example() {
        let doc = ReportDocument::from_json(&json!({
            "Drawdown Structure & Failure Modes": {
                "Failure modes": {"rows": [{"Start": {"display": "2024-01-02"}, "Depth": {"raw": 50}}]}
            },
            "__equity__": {
                "time": ["2024-01-01T00:00:00", "2024-01-02T00:00:00"],
                "equity": [1000, 950],
                "drawdown": [0, 50]
            }
        }))
        .unwrap();
        let mut mounts = MountSet::all();
        DrawdownStructureSection.render(&doc, &mut mounts).unwrap();
        let fig = mounts.get(MountId::DrawdownStructure).unwrap().figures().next().unwrap();
        let markers = fig.scatters().nth(1).unwrap();
        assert_eq!(markers.x, vec!["2024-01-02T00:00:00"]);
        assert_eq!(markers.y, vec![950.0]);
        assert_eq!(markers.colors, vec![NEGATIVE]);
    }

    #[test]
    fn test_malformed_equity_keeps_tables() {
        let doc = ReportDocument::from_json(&json!({
            "Drawdown Structure & Failure Modes": {
                "Failure modes": {"rows": [{"Start": "2024-01-02", "Depth": 50}]}
            },
            "__equity__": {
                "time": ["2024-01-01T00:00:00", "2024-01-02T00:00:00"],
                "equity": [1000],
                "drawdown": [0, 50]
            }
        }))
        .unwrap();
        let mut mounts = MountSet::all();
        assert_eq!(DrawdownStructureSection.render(&doc, &mut mounts), Ok(RenderOutcome::Rendered));
        let mount = mounts.get(MountId::DrawdownStructure).unwrap();
        let top = mount.tables().next().unwrap();
        assert_eq!(top.title.as_deref(), Some("Top drawdowns"));
        assert_eq!(top.cell(0, "Depth"), Some("50"));
        assert_eq!(mount.figures().count(), 0);
    }

    #[test]
    fn test_without_equity_only_table() {
        let doc = ReportDocument::from_json(&json!({
            "Drawdown Structure & Failure Modes": {
                "Failure modes": {"rows": [{"Start": "2024-01-02", "Depth": 5}]}
            }
        }))
        .unwrap();
        let mut mounts = MountSet::all();
        DrawdownStructureSection.render(&doc, &mut mounts).unwrap();
        let mount = mounts.get(MountId::DrawdownStructure).unwrap();
        assert_eq!(mount.tables().count(), 1);
        assert_eq!(mount.figures().count(), 0);
    }
}
