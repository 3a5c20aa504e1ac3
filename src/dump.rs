//! Plain-text rendering of the mount set for `--dump`.

use std::fmt::Write;

use crate::chart::{Figure, Trace};
use crate::sections::{DispatchReport, SectionStatus};
use crate::view::{Element, MountId, MountSet, TableView};

const RULE: usize = 84;

/// Whole dump as one string; the binary prints it to stdout.
pub fn render_dump(source: &str, mounts: &MountSet, dispatch: &DispatchReport) -> String {
    let mut out = String::new();
    let title = format!("  BACKTEST DASHBOARD  {}", source);
    let _ = writeln!(out, "\u{2554}{}\u{2557}", "\u{2550}".repeat(RULE - 2));
    let _ = writeln!(out, "\u{2551}{:<w$}\u{2551}", title, w = RULE - 2);
    let _ = writeln!(out, "\u{255a}{}\u{255d}", "\u{2550}".repeat(RULE - 2));
    let _ = writeln!(out);

    section_rule(&mut out, "SECTIONS");
    for (key, status) in &dispatch.sections {
        let status = match status {
            SectionStatus::Rendered => "rendered".to_string(),
            SectionStatus::Skipped(reason) => format!("skipped ({})", reason),
            SectionStatus::Failed(msg) => format!("FAILED: {}", msg),
        };
        let _ = writeln!(out, "  {:<42} {}", key, status);
    }
    let _ = writeln!(out);

    for id in MountId::all() {
        let elements = mounts.elements(*id);
        if elements.is_empty() {
            continue;
        }
        section_rule(&mut out, &id.label().to_uppercase());
        for element in elements {
            write_element(&mut out, element);
        }
        let _ = writeln!(out);
    }
    out
}

fn section_rule(out: &mut String, title: &str) {
    let head = format!("\u{2500}\u{2500}\u{2500} {} ", title);
    let pad = RULE.saturating_sub(head.chars().count());
    let _ = writeln!(out, "{}{}", head, "\u{2500}".repeat(pad));
}

fn write_element(out: &mut String, element: &Element) {
    match element {
        Element::Heading { text } => {
            let _ = writeln!(out, "  == {} ==", text);
        }
        Element::Table(table) => write_table(out, table),
        Element::Cards { cards } => {
            for card in cards {
                let _ = writeln!(out, "  {:<34} {}", card.label, card.value);
            }
        }
        Element::Figure(fig) => write_figure(out, fig),
    }
}

fn write_table(out: &mut String, table: &TableView) {
    if let Some(title) = &table.title {
        let _ = writeln!(out, "  [{}]", title);
    }
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let widest = table.rows.iter().map(|r| r.get(c).map_or(0, |s| s.chars().count())).max().unwrap_or(0);
            widest.max(name.chars().count())
        })
        .collect();

    let header: Vec<String> = table.columns.iter().zip(&widths).map(|(c, w)| format!("{:<w$}", c, w = w)).collect();
    let _ = writeln!(out, "  {}", header.join("  ").trim_end());
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "  {:-<w$}", "", w = total);

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(c, (cell, w))| {
                if table.numeric.get(c).copied().unwrap_or(false) {
                    format!("{:>w$}", cell, w = w)
                } else {
                    format!("{:<w$}", cell, w = w)
                }
            })
            .collect();
        let _ = writeln!(out, "  {}", cells.join("  ").trim_end());
    }
}

fn write_figure(out: &mut String, fig: &Figure) {
    match &fig.layout.y_title {
        Some(y) => {
            let _ = writeln!(out, "  {} ({})", fig.title, y);
        }
        None => {
            let _ = writeln!(out, "  {}", fig.title);
        }
    }
    for trace in &fig.traces {
        match trace {
            Trace::Bar(bar) => {
                let prefix = bar.name.as_deref().map(|n| format!("{}: ", n)).unwrap_or_default();
                for (i, (cat, v)) in bar.categories.iter().zip(&bar.values).enumerate() {
                    match bar.text.get(i) {
                        Some(text) => {
                            let _ = writeln!(out, "    {}{:<20} {:>10.2}  {}", prefix, cat, v, text);
                        }
                        None => {
                            let _ = writeln!(out, "    {}{:<20} {:>10.2}", prefix, cat, v);
                        }
                    }
                }
            }
            Trace::Pie(pie) => {
                for (label, pct) in pie.labels.iter().zip(pie.percentages()) {
                    let _ = writeln!(out, "    {:<20} {:>6.1}%", label, pct);
                }
            }
            Trace::Scatter(scatter) => {
                let min = scatter.y.iter().copied().fold(f64::INFINITY, f64::min);
                let max = scatter.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let span = match (scatter.x.first(), scatter.x.last()) {
                    (Some(a), Some(b)) => format!("{} .. {}", a, b),
                    _ => "empty".to_string(),
                };
                if scatter.y.is_empty() {
                    let _ = writeln!(out, "    {}: no points", scatter.name);
                } else {
                    let _ = writeln!(
                        out,
                        "    {}: {} points, {}, min {:.2}, max {:.2}",
                        scatter.name,
                        scatter.y.len(),
                        span,
                        min,
                        max,
                    );
                }
            }
        }
    }
}
