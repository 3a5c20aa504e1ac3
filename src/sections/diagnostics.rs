use crate::chart::theme::{ACCENT, DARK_TILE};
use crate::chart::{self, plot_values, Figure};
use crate::error::SectionError;
use crate::report::{display, RowsBlock, ReportDocument, ENTRY_TAG_PERFORMANCE, EXIT_LOGIC};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{Element, MountId, MountSet, TableView};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// (report key, panel title, tag column)
const PANELS: [(&str, &str, &str); 2] = [
    (ENTRY_TAG_PERFORMANCE, "ENTRY TAG", "Entry tag"),
    (EXIT_LOGIC, "EXIT TAG", "Exit tag"),
];

/// Entry and exit tag panels: full table plus share, expectancy, duration and
/// signed PnL / drawdown contribution charts.
pub struct DiagnosticsSection;

impl SectionRenderer for DiagnosticsSection {
    fn key(&self) -> &'static str {
        ENTRY_TAG_PERFORMANCE
    }

    fn mounts(&self) -> &'static [MountId] {
        &[MountId::Diagnostics]
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains(MountId::Diagnostics) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        let mut elements = Vec::new();
        for (key, title, tag_column) in PANELS {
            if let Some(block) = doc.rows(&[key]) {
                tag_panel(&mut elements, title, block, tag_column)?;
            }
        }
        if elements.is_empty() {
            return Ok(RenderOutcome::Skipped(NO_DATA));
        }
        mounts.replace(MountId::Diagnostics, elements);
        Ok(RenderOutcome::Rendered)
    }
}

fn tag_panel(out: &mut Vec<Element>, title: &str, block: &RowsBlock, tag_column: &str) -> Result<(), SectionError> {
    let rows = &block.rows;
    let labels: Vec<String> = rows.iter().map(|r| display(r.get(tag_column))).collect();
    let column = |name: &str| plot_values(rows.iter().map(|r| r.get(name)));

    // durations arrive in seconds; the display string is the readable form
    let hours: Vec<f64> = column("Avg duration").iter().map(|s| s / SECONDS_PER_HOUR).collect();
    let hover: Vec<String> = rows.iter().map(|r| display(r.get("Avg duration"))).collect();

    out.push(Element::heading(title));
    out.push(Element::Table(TableView::from_rows(rows)?));
    out.push(tile(chart::pie("Share of occurrences", labels.clone(), &column("Share (%)"))));
    out.push(tile(
        chart::diverging_bar("Expectancy by tag", labels.clone(), column("Expectancy (USD)")).y_title("Expectancy (USD)"),
    ));
    out.push(tile(
        chart::duration_bar("Avg duration by tag", labels.clone(), hours, hover, ACCENT).y_title("Avg duration (hours)"),
    ));
    out.push(tile(chart::signed_contribution(
        "PnL contribution (100% of |total|)",
        labels.clone(),
        &column("Total PnL"),
        "Share of |Total PnL| (%)",
    )));
    out.push(tile(chart::signed_contribution(
        "DD contribution (100% of |total|)",
        labels,
        &column("Max drawdown contribution (USD)"),
        "Share of |DD contribution| (%)",
    )));
    Ok(())
}

fn tile(fig: Figure) -> Element {
    Element::Figure(fig.theme(DARK_TILE).height(12))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_report;
    use serde_json::json;

    #[test]
    fn test_entry_and_exit_panels() {
        let doc = sample_report();
        let mut mounts = MountSet::all();
        assert_eq!(DiagnosticsSection.render(&doc, &mut mounts), Ok(RenderOutcome::Rendered));
        let elements = mounts.elements(MountId::Diagnostics);
        // heading + table + five charts per panel
        assert_eq!(elements.len(), 14);
        assert_eq!(elements[0], Element::heading("ENTRY TAG"));
        assert_eq!(elements[7], Element::heading("EXIT TAG"));
    }

    #[test]
    fn test_durations_in_hours_with_display_hover() {
        let doc = ReportDocument::from_json(&json!({
            "Exit Logic Diagnostics": {"rows": [
                {"Exit tag": "tp", "Avg duration": {"raw": 5400, "display": "1h 30m"}, "Total PnL": 10.0}
            ]}
        }))
        .unwrap();
        let mut mounts = MountSet::all();
        DiagnosticsSection.render(&doc, &mut mounts).unwrap();
        let figs: Vec<_> = mounts.get(MountId::Diagnostics).unwrap().figures().collect();
        let dur = figs[2].bars().next().unwrap();
        assert_eq!(dur.values, vec![1.5]);
        assert_eq!(dur.text, vec!["1h 30m"]);
        assert_eq!(figs[0].layout.theme, DARK_TILE);
    }
}
