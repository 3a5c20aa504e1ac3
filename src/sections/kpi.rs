use crate::error::SectionError;
use crate::report::{ReportDocument, SectionPayload, CORE_PERFORMANCE};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::kpi::kpi_cards;
use crate::view::{Element, MountId, MountSet};

/// Headline metric cards.
pub struct KpiSection;

impl SectionRenderer for KpiSection {
    fn key(&self) -> &'static str {
        CORE_PERFORMANCE
    }

    fn mounts(&self) -> &'static [MountId] {
        &[MountId::KpiTable]
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains(MountId::KpiTable) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let Some(block) = doc.section(CORE_PERFORMANCE).and_then(SectionPayload::as_group) else {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        };
        let cards = kpi_cards(block);
        if cards.is_empty() {
            return Ok(RenderOutcome::Skipped("no headline metrics"));
        }
        mounts.replace(MountId::KpiTable, vec![Element::Cards { cards }]);
        Ok(RenderOutcome::Rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_total_return_card_gets_percent_suffix() {
        let doc = ReportDocument::from_json(&json!({
            "Core Performance Metrics": {"Total return (%)": {"raw": 12.3, "display": "12.3"}}
        }))
        .unwrap();
        let mut mounts = MountSet::all();
        assert_eq!(KpiSection.render(&doc, &mut mounts), Ok(RenderOutcome::Rendered));
        match mounts.elements(MountId::KpiTable) {
            [Element::Cards { cards }] => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].label, "Total return (%)");
                assert_eq!(cards[0].value, "12.3%");
            }
            other => panic!("unexpected elements: {:?}", other),
        }
    }

    #[test]
    fn test_absent_section_or_mount() {
        let mut mounts = MountSet::all();
        assert_eq!(KpiSection.render(&ReportDocument::default(), &mut mounts), Ok(RenderOutcome::Skipped(NO_DATA)));
        let doc = ReportDocument::from_json(&json!({"Core Performance Metrics": {"Total trades": 3}})).unwrap();
        let mut none = MountSet::only(&[]);
        assert_eq!(KpiSection.render(&doc, &mut none), Ok(RenderOutcome::Skipped(MOUNT_ABSENT)));
    }
}
