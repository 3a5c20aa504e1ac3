use crate::chart::theme::{ACCENT, MUTED};
use crate::chart::{self, hours_to_hm, plot_values};
use crate::error::SectionError;
use crate::report::{display, ReportDocument, R_MULTIPLE_DISTRIBUTION, TRADE_DISTRIBUTION};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{Element, MountId, MountSet};

const MOUNTS: [MountId; 3] = [MountId::TradeRCount, MountId::TradeRShare, MountId::TradeRDuration];

/// R-multiple buckets: trade count, share and average holding time.
pub struct TradeDistributionSection;

impl SectionRenderer for TradeDistributionSection {
    fn key(&self) -> &'static str {
        TRADE_DISTRIBUTION
    }

    fn mounts(&self) -> &'static [MountId] {
        &MOUNTS
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains_all(&MOUNTS) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let Some(block) = doc.rows(&[TRADE_DISTRIBUTION, R_MULTIPLE_DISTRIBUTION]) else {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        };
        let rows = &block.rows;

        // bucket order is the report's order
        let buckets: Vec<String> = rows.iter().map(|r| display(r.get("Bucket"))).collect();
        let trades = plot_values(rows.iter().map(|r| r.get("Trades")));
        let shares = plot_values(rows.iter().map(|r| r.get("Share (%)")));
        let hours = plot_values(rows.iter().map(|r| r.get("Avg duration")));
        let hover: Vec<String> = hours.iter().map(|h| hours_to_hm(*h)).collect();

        let count = chart::bar("Trades by R bucket", buckets.clone(), trades, ACCENT).y_title("Trades");
        let share = chart::pie("Share (%) by R bucket", buckets.clone(), &shares);
        let duration = chart::duration_bar("Avg trade duration by R", buckets, hours, hover, MUTED).y_title("Duration");

        mounts.replace(MountId::TradeRCount, vec![Element::Figure(count)]);
        mounts.replace(MountId::TradeRShare, vec![Element::Figure(share)]);
        mounts.replace(MountId::TradeRDuration, vec![Element::Figure(duration)]);
        Ok(RenderOutcome::Rendered)
    }
}
