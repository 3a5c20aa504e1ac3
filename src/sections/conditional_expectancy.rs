use crate::chart::{self, hours, reindex, Figure, WEEKDAYS};
use crate::error::SectionError;
use crate::report::{display, number, ReportDocument, Row, RowsBlock, Value, CONDITIONAL_EXPECTANCY};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{Element, MountId, MountSet};

const BY_HOUR: &str = "By hour of day";
const BY_WEEKDAY: &str = "By day of week";
const CONTEXT_PREFIX: &str = "By context:";
const METRIC: &str = "Expectancy (USD)";

const MOUNTS: [MountId; 3] = [MountId::CondHour, MountId::CondWeekday, MountId::CondContextGrid];

/// Expectancy by hour, by weekday and by each extra context.
/// Each mount is filled independently of the others; all three are cleared
/// first so a block missing from this document leaves its mount empty.
pub struct ConditionalExpectancySection;

impl SectionRenderer for ConditionalExpectancySection {
    fn key(&self) -> &'static str {
        CONDITIONAL_EXPECTANCY
    }

    fn mounts(&self) -> &'static [MountId] {
        &MOUNTS
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !MOUNTS.iter().any(|id| mounts.contains(*id)) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        if doc.section(CONDITIONAL_EXPECTANCY).map_or(true, |s| s.is_empty()) {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        }

        for id in MOUNTS {
            mounts.clear(id);
        }
        let mut rendered = false;

        if let Some(block) = doc.rows(&[CONDITIONAL_EXPECTANCY, BY_HOUR]) {
            let canonical = hours();
            let pairs = keyed(block, "hour", hour_key);
            let fig = expectancy_bar(BY_HOUR, canonical.clone(), reindex(&canonical, &pairs)).height(14);
            rendered |= mounts.replace(MountId::CondHour, vec![Element::Figure(fig)]);
        }

        if let Some(block) = doc.rows(&[CONDITIONAL_EXPECTANCY, BY_WEEKDAY]) {
            let canonical: Vec<String> = WEEKDAYS.iter().map(|d| d.to_string()).collect();
            let pairs = keyed(block, "weekday", Value::display);
            let fig = expectancy_bar(BY_WEEKDAY, canonical.clone(), reindex(&canonical, &pairs)).height(14);
            rendered |= mounts.replace(MountId::CondWeekday, vec![Element::Figure(fig)]);
        }

        let contexts: Vec<Element> = doc
            .section(CONDITIONAL_EXPECTANCY)
            .map(|s| s.children())
            .unwrap_or(&[])
            .iter()
            .filter(|(name, _)| name.starts_with(CONTEXT_PREFIX))
            .filter_map(|(name, payload)| payload.as_rows().filter(|b| !b.is_empty()).map(|b| (name, b)))
            .map(|(name, block)| {
                let categories = block.rows.iter().map(context_label).collect();
                let values = block.rows.iter().map(|r| number(r.get(METRIC))).collect();
                Element::Figure(expectancy_bar(name, categories, values).height(10))
            })
            .collect();
        if !contexts.is_empty() {
            rendered |= mounts.replace(MountId::CondContextGrid, contexts);
        }

        Ok(if rendered { RenderOutcome::Rendered } else { RenderOutcome::Skipped(NO_DATA) })
    }
}

fn expectancy_bar(title: &str, categories: Vec<String>, values: Vec<f64>) -> Figure {
    chart::diverging_bar(title, categories, values).y_title(METRIC)
}

fn keyed(block: &RowsBlock, column: &str, key: fn(&Value) -> String) -> Vec<(String, f64)> {
    block
        .rows
        .iter()
        .map(|r| (r.get(column).map(key).unwrap_or_default(), number(r.get(METRIC))))
        .collect()
}

/// Hours may arrive as numbers or text; integral numbers key as "0".."23".
fn hour_key(v: &Value) -> String {
    match v.raw().as_f64() {
        Some(h) if h.fract() == 0.0 => format!("{}", h as i64),
        _ => v.display(),
    }
}

/// A context row is labelled by its first column.
fn context_label(row: &Row) -> String {
    display(row.cells().first().map(|(_, v)| v))
}
