use crate::error::SectionError;
use crate::report::{ReportDocument, BACKTEST_CONFIG};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::kpi::config_table;
use crate::view::{Element, MountId, MountSet};

/// Backtest assumptions as one Section / Metric / Value table.
pub struct BacktestConfigSection;

impl SectionRenderer for BacktestConfigSection {
    fn key(&self) -> &'static str {
        BACKTEST_CONFIG
    }

    fn mounts(&self) -> &'static [MountId] {
        &[MountId::BacktestInfo]
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains(MountId::BacktestInfo) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let Some(section) = doc.section(BACKTEST_CONFIG).filter(|s| !s.is_empty()) else {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        };
        match config_table(section) {
            Ok(table) => {
                mounts.replace(MountId::BacktestInfo, vec![Element::Table(table)]);
                Ok(RenderOutcome::Rendered)
            }
            Err(SectionError::EmptyTable) => Ok(RenderOutcome::Skipped("no configuration entries")),
            Err(e) => Err(e),
        }
    }
}
