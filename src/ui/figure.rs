//! Terminal rendition of [`Figure`]s: inline block bars, percent rows for
//! pies and Braille line charts for scatter traces.

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::chart::theme::Rgb;
use crate::chart::{BarMode, BarTrace, Figure, PieTrace, ScatterMode, ScatterTrace, Trace};

use super::render::{BORDER, GRAY, WHITE};

const LABEL_WIDTH: usize = 18;
const VALUE_WIDTH: usize = 10;

pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Rows a figure wants, borders included.
pub fn height(fig: &Figure) -> u16 {
    let content = if let Some(pie) = fig.pie() {
        pie.labels.len()
    } else if fig.scatters().next().is_some() {
        return fig.layout.height.max(8);
    } else {
        let bars: Vec<&BarTrace> = fig.bars().collect();
        let categories = bars.first().map(|b| b.categories.len()).unwrap_or(0);
        match fig.layout.bar_mode {
            BarMode::Stack => categories,
            BarMode::Group => categories * bars.len().max(1),
        }
    };
    let legend = usize::from(fig.layout.show_legend);
    (content + legend + 2).min(u16::MAX as usize) as u16
}

pub fn render_figure(fig: &Figure, area: Rect, buf: &mut Buffer) {
    let mut title = fig.title.clone();
    if let Some(y) = &fig.layout.y_title {
        title = format!("{} ({})", title, y);
    }
    let block = Block::bordered().title(title).border_style(BORDER);

    if fig.traces.is_empty() {
        Widget::render(Paragraph::new(Span::styled("  no data", Style::default().fg(GRAY))).block(block), area, buf);
        return;
    }
    if let Some(pie) = fig.pie() {
        Widget::render(Paragraph::new(pie_lines(pie, area.width)).block(block), area, buf);
        return;
    }
    let scatters: Vec<&ScatterTrace> = fig.scatters().collect();
    if !scatters.is_empty() {
        render_scatter(fig, &scatters, block, area, buf);
        return;
    }
    let mut lines = bar_lines(fig, area.width.saturating_sub(2) as usize);
    if fig.layout.show_legend {
        lines.push(legend_line(fig));
    }
    Widget::render(Paragraph::new(lines).block(block), area, buf);
}

// ─── Bars ───

fn bar_lines(fig: &Figure, width: usize) -> Vec<Line<'static>> {
    let bars: Vec<&BarTrace> = fig.bars().collect();
    let Some(first) = bars.first() else { return Vec::new() };
    let bar_width = width.saturating_sub(LABEL_WIDTH + VALUE_WIDTH + 2).max(4);

    match fig.layout.bar_mode {
        BarMode::Stack => {
            let max_total = (0..first.categories.len())
                .map(|i| bars.iter().map(|b| b.values.get(i).map_or(0.0, |v| v.abs())).sum::<f64>())
                .fold(0.0f64, f64::max);
            let scale = fig.layout.y_range.map(|(_, hi)| hi).filter(|hi| *hi > 0.0).unwrap_or(max_total);
            first
                .categories
                .iter()
                .enumerate()
                .map(|(i, cat)| {
                    let mut spans = vec![label_span(cat)];
                    let mut used = 0;
                    let mut parts = Vec::new();
                    for b in &bars {
                        let v = b.values.get(i).copied().unwrap_or(0.0);
                        let n = cells(v.abs(), scale, bar_width);
                        used += n;
                        spans.push(Span::styled("\u{2588}".repeat(n), Style::default().fg(color(bar_color(b, i)))));
                        if v != 0.0 {
                            parts.push(format!("{:.0}", v));
                        }
                    }
                    spans.push(Span::raw(" ".repeat(bar_width.saturating_sub(used))));
                    spans.push(Span::styled(format!(" {:>w$}", parts.join("/"), w = VALUE_WIDTH), Style::default().fg(WHITE)));
                    Line::from(spans)
                })
                .collect()
        }
        BarMode::Group => {
            let all: Vec<f64> = bars.iter().flat_map(|b| b.values.iter().copied()).collect();
            let max_abs = all.iter().map(|v| v.abs()).filter(|v| v.is_finite()).fold(0.0f64, f64::max);
            let diverging = all.iter().any(|v| *v < 0.0) && all.iter().any(|v| *v > 0.0);
            let mut lines = Vec::new();
            for (i, cat) in first.categories.iter().enumerate() {
                for b in &bars {
                    let v = b.values.get(i).copied().unwrap_or(0.0);
                    let style = Style::default().fg(color(bar_color(b, i)));
                    let bar = signed_bar(v, max_abs, bar_width, diverging);
                    let value = b.text.get(i).cloned().unwrap_or_else(|| format_number(v));
                    lines.push(Line::from(vec![
                        label_span(cat),
                        Span::styled(bar, style),
                        Span::styled(format!(" {:>w$}", value, w = VALUE_WIDTH), Style::default().fg(WHITE)),
                    ]));
                }
            }
            lines
        }
    }
}

fn bar_color(trace: &BarTrace, i: usize) -> Rgb {
    trace.colors.get(i).or_else(|| trace.colors.first()).copied().unwrap_or(crate::chart::theme::ACCENT)
}

fn label_span(label: &str) -> Span<'static> {
    let text: String = label.chars().take(LABEL_WIDTH - 1).collect();
    Span::styled(format!("{:<w$} ", text, w = LABEL_WIDTH - 1), Style::default().fg(GRAY))
}

fn cells(v: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !v.is_finite() {
        return 0;
    }
    ((v / max).min(1.0) * width as f64).round() as usize
}

/// Zero axis in the middle when values have both signs, negatives to its left.
fn signed_bar(v: f64, max_abs: f64, width: usize, diverging: bool) -> String {
    if !diverging {
        let n = cells(v.abs(), max_abs, width);
        return format!("{}{}", "\u{2588}".repeat(n), " ".repeat(width - n));
    }
    let half = width / 2;
    let n = cells(v.abs(), max_abs, half);
    if v < 0.0 {
        format!("{}{}\u{2502}{}", " ".repeat(half - n), "\u{2588}".repeat(n), " ".repeat(half))
    } else {
        format!("{}\u{2502}{}{}", " ".repeat(half), "\u{2588}".repeat(n), " ".repeat(half - n))
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn legend_line(fig: &Figure) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for trace in &fig.traces {
        let (name, rgb) = match trace {
            Trace::Bar(b) => (b.name.clone(), b.colors.first().copied()),
            Trace::Scatter(s) => (Some(s.name.clone()), s.colors.first().copied()),
            Trace::Pie(_) => continue,
        };
        let (Some(name), Some(rgb)) = (name, rgb) else { continue };
        spans.push(Span::styled("\u{25a0} ", Style::default().fg(color(rgb))));
        spans.push(Span::styled(format!("{}  ", name), Style::default().fg(GRAY)));
    }
    Line::from(spans)
}

// ─── Pie ───

fn pie_lines(pie: &PieTrace, width: u16) -> Vec<Line<'static>> {
    let bar_width = (width as usize).saturating_sub(LABEL_WIDTH + 12).max(4);
    pie.labels
        .iter()
        .zip(pie.percentages())
        .enumerate()
        .map(|(i, (label, pct))| {
            let rgb = pie.colors.get(i).copied().unwrap_or(crate::chart::theme::MUTED);
            let n = cells(pct, 100.0, bar_width);
            Line::from(vec![
                label_span(label),
                Span::styled("\u{2588}".repeat(n), Style::default().fg(color(rgb))),
                Span::raw(" ".repeat(bar_width - n)),
                Span::styled(format!(" {:>6.1}%", pct), Style::default().fg(WHITE)),
            ])
        })
        .collect()
}

// ─── Scatter ───

/// Primary-axis traces share one chart; secondary-axis traces get their own
/// strip underneath, on the same x positions.
fn render_scatter(fig: &Figure, scatters: &[&ScatterTrace], block: Block, area: Rect, buf: &mut Buffer) {
    let inner = block.inner(area);
    Widget::render(block, area, buf);

    let primary: Vec<&ScatterTrace> = scatters.iter().copied().filter(|s| !s.secondary_y).collect();
    let secondary: Vec<&ScatterTrace> = scatters.iter().copied().filter(|s| s.secondary_y).collect();

    // x positions come from the first line trace; markers look their times up there
    let axis: &[String] = scatters
        .iter()
        .find(|s| s.mode == ScatterMode::Lines)
        .map(|s| s.x.as_slice())
        .unwrap_or(scatters[0].x.as_slice());

    if secondary.is_empty() {
        render_axis_chart(&primary, axis, fig.layout.y_title.as_deref(), inner, buf);
        return;
    }
    let [top, bottom] = Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(inner);
    render_axis_chart(&primary, axis, fig.layout.y_title.as_deref(), top, buf);
    render_axis_chart(&secondary, axis, fig.layout.y2_title.as_deref(), bottom, buf);
}

fn render_axis_chart(traces: &[&ScatterTrace], axis: &[String], y_title: Option<&str>, area: Rect, buf: &mut Buffer) {
    let mut series: Vec<(String, Color, GraphType, Vec<(f64, f64)>)> = Vec::new();
    for trace in traces {
        match trace.mode {
            ScatterMode::Lines => {
                let data = trace.y.iter().enumerate().map(|(i, y)| (i as f64, *y)).collect();
                series.push((trace.name.clone(), color(trace.color_at(0)), GraphType::Line, data));
            }
            ScatterMode::Markers => {
                // one dataset per color so each marker keeps its own
                let mut by_color: Vec<(Rgb, Vec<(f64, f64)>)> = Vec::new();
                for (i, (x, y)) in trace.x.iter().zip(&trace.y).enumerate() {
                    let Some(pos) = axis.iter().position(|t| t == x) else { continue };
                    let rgb = trace.color_at(i);
                    match by_color.iter_mut().find(|(c, _)| *c == rgb) {
                        Some((_, pts)) => pts.push((pos as f64, *y)),
                        None => by_color.push((rgb, vec![(pos as f64, *y)])),
                    }
                }
                for (rgb, pts) in by_color {
                    series.push((trace.name.clone(), color(rgb), GraphType::Scatter, pts));
                }
            }
        }
    }

    let ys = series.iter().flat_map(|s| s.3.iter().map(|p| p.1)).filter(|y| y.is_finite());
    let (mut y_min, mut y_max) = ys.fold((f64::MAX, f64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if y_min > y_max {
        y_min = 0.0;
        y_max = 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let x_max = axis.len().saturating_sub(1).max(1) as f64;

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(name, c, graph, data)| {
            let marker = if *graph == GraphType::Scatter { symbols::Marker::Dot } else { symbols::Marker::Braille };
            Dataset::default()
                .name(name.clone())
                .marker(marker)
                .graph_type(*graph)
                .style(Style::default().fg(*c))
                .data(data)
        })
        .collect();

    let first = axis.first().cloned().unwrap_or_default();
    let last = axis.last().cloned().unwrap_or_default();
    let chart = Chart::new(datasets)
        .x_axis(Axis::default().bounds([0.0, x_max]).labels::<Vec<Line>>(vec![first.into(), last.into()]).style(BORDER))
        .y_axis(
            Axis::default()
                .title(y_title.unwrap_or_default().to_string())
                .bounds([y_min, y_max])
                .labels::<Vec<Line>>(vec![format!("{:.0}", y_min).into(), format!("{:.0}", y_max).into()])
                .style(BORDER),
        );
    Widget::render(chart, area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{self, theme::ACCENT};

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_signed_bar_splits_at_zero() {
        let neg = signed_bar(-5.0, 10.0, 10, true);
        let pos = signed_bar(10.0, 10.0, 10, true);
        assert_eq!(neg, format!("  {}\u{2502}     ", "\u{2588}".repeat(3)));
        assert!(pos.ends_with("\u{2588}\u{2588}\u{2588}\u{2588}\u{2588}"));
    }

    #[test]
    fn test_bar_height_counts_categories() {
        let fig = chart::bar("t", vec!["a".into(), "b".into(), "c".into()], vec![1.0, 2.0, 3.0], ACCENT);
        assert_eq!(height(&fig), 5);
        let stacked = chart::signed_contribution("t", vec!["a".into(), "b".into()], &[1.0, -1.0], "PnL");
        // stacked: one row per category plus legend
        assert_eq!(height(&stacked), 5);
    }

    #[test]
    fn test_pie_renders_percentages() {
        let fig = chart::pie("Share", vec!["win".into(), "loss".into()], &[3.0, 1.0]);
        let area = Rect::new(0, 0, 60, height(&fig));
        let mut buf = Buffer::empty(area);
        render_figure(&fig, area, &mut buf);
        let out = text(&buf);
        assert!(out.contains("75.0%"));
        assert!(out.contains("25.0%"));
    }

    #[test]
    fn test_scatter_renders_on_small_areas() {
        let fig = Figure::new("Equity")
            .trace(Trace::Scatter(ScatterTrace::line("Equity", vec!["a".into(), "b".into()], vec![1.0, 2.0], ACCENT)))
            .trace(Trace::Scatter(ScatterTrace::line("DD", vec!["a".into(), "b".into()], vec![0.0, -1.0], ACCENT).on_secondary_axis()));
        for (w, h) in [(80, 16), (20, 6)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            render_figure(&fig, area, &mut buf);
        }
    }
}
