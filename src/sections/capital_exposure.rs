use crate::chart::{self, plot_values};
use crate::error::SectionError;
use crate::report::{display, ReportDocument, SectionPayload, CAPITAL_EXPOSURE};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{Element, MountId, MountSet, TableView};

const SUMMARY: &str = "Summary";
const OVERTRADING: &str = "Overtrading diagnostics";

const MOUNTS: [MountId; 4] = [
    MountId::CapitalSummary,
    MountId::OvertradingTable,
    MountId::OvertradingPnl,
    MountId::OvertradingDd,
];

/// Capital summary and trades-per-day bucket diagnostics. Cells use the
/// display side, charts the raw side.
pub struct CapitalExposureSection;

impl SectionRenderer for CapitalExposureSection {
    fn key(&self) -> &'static str {
        CAPITAL_EXPOSURE
    }

    fn mounts(&self) -> &'static [MountId] {
        &MOUNTS
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains_all(&MOUNTS) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let summary = doc
            .lookup(&[CAPITAL_EXPOSURE, SUMMARY])
            .and_then(SectionPayload::as_group)
            .filter(|g| !g.is_empty());
        let overtrading = doc.rows(&[CAPITAL_EXPOSURE, OVERTRADING]);
        if summary.is_none() && overtrading.is_none() {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        }

        for id in MOUNTS {
            mounts.clear(id);
        }

        if let Some(group) = summary {
            let table = TableView::from_row(&group.as_row())?;
            mounts.replace(MountId::CapitalSummary, vec![Element::Table(table)]);
        }

        let Some(block) = overtrading else {
            return Ok(RenderOutcome::Rendered);
        };
        let rows = &block.rows;
        mounts.replace(MountId::OvertradingTable, vec![Element::Table(TableView::from_rows(rows)?)]);

        let buckets: Vec<String> = rows.iter().map(|r| display(r.get("Trades/day"))).collect();
        let avg_pnl = plot_values(rows.iter().map(|r| r.get("Avg PnL")));
        let worst_dd: Vec<f64> = plot_values(rows.iter().map(|r| r.get("Worst DD"))).into_iter().map(|v| -v.abs()).collect();

        let pnl = chart::diverging_bar("Average PnL by trades/day bucket", buckets.clone(), avg_pnl).y_title("Avg PnL");
        let dd = chart::sequential_bar("Worst drawdown by trades/day bucket", buckets, worst_dd).y_title("Worst DD");
        mounts.replace(MountId::OvertradingPnl, vec![Element::Figure(pnl)]);
        mounts.replace(MountId::OvertradingDd, vec![Element::Figure(dd)]);
        Ok(RenderOutcome::Rendered)
    }
}
