use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::view::table::is_placeholder;
use crate::view::{Element, KpiCard, TableView};

use super::figure;
use super::{App, Item, Tab};

// ─── Colors ───

pub(super) const BORDER: Style = Style::new().fg(Color::DarkGray);
const GREEN: Color = Color::Green;
const RED: Color = Color::Red;
const YELLOW: Color = Color::Yellow;
const CYAN: Color = Color::Cyan;
pub(super) const WHITE: Color = Color::White;
pub(super) const GRAY: Color = Color::DarkGray;
const MAGENTA: Color = Color::Magenta;

const MAX_COLUMN: usize = 28;

fn pnl_color(v: f64) -> Color {
    if v > 0.0 { GREEN } else if v < 0.0 { RED } else { WHITE }
}

/// Sign color for a formatted numeric cell; white when it does not parse.
fn cell_color(cell: &str) -> Color {
    let trimmed = cell.trim().trim_end_matches('%').trim_start_matches('$').replace(',', "");
    trimmed.parse::<f64>().map(pnl_color).unwrap_or(WHITE)
}

// ─── Main draw ───

pub fn draw(app: &App, frame: &mut Frame) {
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(10),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(app, header_area, frame.buffer_mut());
    render_tabs(app, tabs_area, frame.buffer_mut());
    render_footer(app, footer_area, frame.buffer_mut());
    render_body(app, body_area, frame.buffer_mut());
}

// ─── Header ───

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let failed = app.dispatch.failed().count();
    let mut text = format!(
        " BACKTEST DASHBOARD | {} | {}/{} sections",
        app.source,
        app.dispatch.rendered(),
        app.dispatch.sections.len(),
    );
    if failed > 0 {
        text.push_str(&format!(" | {} failed", failed));
    }
    if let Some(explorer) = &app.explorer {
        let state = explorer.state();
        text.push_str(&format!(
            " | tag {} | {} | min {} | {}",
            state.selected_tag,
            state.metric,
            state.min_trades,
            state.sort.label(),
        ));
    }
    Paragraph::new(text)
        .style(Style::default().fg(Color::Black).bg(if failed == 0 { GREEN } else { YELLOW }))
        .render(area, buf);
}

// ─── Tabs bar ───

fn render_tabs(app: &App, area: Rect, buf: &mut Buffer) {
    let titles: Vec<Span> = Tab::all().iter().enumerate().map(|(i, t)| {
        let style = if *t == app.tab {
            Style::default().fg(Color::Black).bg(CYAN).bold()
        } else {
            Style::default().fg(WHITE).bg(Color::Reset)
        };
        Span::styled(format!(" {}{} ", i + 1, t.label()), style)
    }).collect();

    let mut line_spans = Vec::new();
    for (i, title) in titles.into_iter().enumerate() {
        if i > 0 {
            line_spans.push(Span::styled("\u{2502}", Style::default().fg(GRAY)));
        }
        line_spans.push(title);
    }

    Paragraph::new(Line::from(line_spans)).render(area, buf);
}

// ─── Footer ───

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let base = " [1-6] Tab  [j/k] Scroll  [PgUp/Dn] Page";
    let extra = match app.tab {
        Tab::Explorer if app.explorer.is_some() => "  [t/T] Tag  [m/M] Metric  [+/-/0] Min trades  [s] Sort",
        _ => "",
    };
    let text = format!("{}{}  [q] Quit", base, extra);
    Paragraph::new(text)
        .style(Style::default().fg(Color::Black).bg(GRAY))
        .render(area, buf);
}

// ─── Body ───

/// Stack the tab's items from the scroll position down until the area is full.
fn render_body(app: &App, area: Rect, buf: &mut Buffer) {
    let items = app.items();
    let mut y = area.y;
    let bottom = area.y + area.height;

    for item in items.iter().skip(app.scroll) {
        if y >= bottom {
            break;
        }
        let wanted = item_height(item);
        let rect = Rect::new(area.x, y, area.width, wanted.min(bottom - y));
        match item {
            Item::Mount { id, empty } => render_mount_banner(id.label(), *empty, rect, buf),
            Item::Element(element) => render_element(element, rect, buf),
        }
        y = y.saturating_add(wanted);
    }
}

fn item_height(item: &Item) -> u16 {
    match item {
        Item::Mount { empty: true, .. } => 2,
        Item::Mount { empty: false, .. } => 1,
        Item::Element(Element::Heading { .. }) => 1,
        Item::Element(Element::Table(t)) => (t.len() + 3).min(u16::MAX as usize) as u16,
        Item::Element(Element::Cards { cards }) => (cards.len() + 2).min(u16::MAX as usize) as u16,
        Item::Element(Element::Figure(f)) => figure::height(f),
    }
}

fn render_mount_banner(label: &str, empty: bool, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![Line::from(vec![
        Span::styled("\u{2500}\u{2500}\u{2500} ", Style::default().fg(GRAY)),
        Span::styled(label.to_string(), Style::default().fg(MAGENTA).bold()),
        Span::styled(" \u{2500}\u{2500}\u{2500}", Style::default().fg(GRAY)),
    ])];
    if empty {
        lines.push(Line::from(Span::styled("  no data", Style::default().fg(GRAY))));
    }
    Paragraph::new(lines).render(area, buf);
}

fn render_element(element: &Element, area: Rect, buf: &mut Buffer) {
    match element {
        Element::Heading { text } => {
            Paragraph::new(Span::styled(format!(" {}", text), Style::default().fg(YELLOW).bold())).render(area, buf);
        }
        Element::Table(table) => render_table(table, area, buf),
        Element::Cards { cards } => render_cards(cards, area, buf),
        Element::Figure(fig) => figure::render_figure(fig, area, buf),
    }
}

fn render_table(table: &TableView, area: Rect, buf: &mut Buffer) {
    let widths: Vec<Constraint> = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let widest = table.rows.iter().map(|r| r.get(c).map_or(0, |s| s.chars().count())).max().unwrap_or(0);
            Constraint::Length(widest.max(name.chars().count()).min(MAX_COLUMN) as u16)
        })
        .collect();

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|cells| {
            Row::new(cells.iter().enumerate().map(|(c, cell)| {
                let numeric = table.numeric.get(c).copied().unwrap_or(false);
                let style = if is_placeholder(cell) {
                    Style::default().fg(GRAY)
                } else if numeric {
                    Style::default().fg(cell_color(cell))
                } else {
                    Style::default().fg(WHITE)
                };
                let text = if numeric { Text::from(cell.as_str()).right_aligned() } else { Text::from(cell.as_str()) };
                Cell::from(text).style(style)
            }))
        })
        .collect();

    let header = Row::new(table.columns.iter().map(|c| Cell::from(c.as_str())))
        .style(Style::default().fg(CYAN).bold());

    Widget::render(
        Table::new(rows, widths).header(header).column_spacing(2)
            .block(Block::bordered().title(table.title.clone().unwrap_or_default()).border_style(BORDER)),
        area, buf,
    );
}

fn render_cards(cards: &[KpiCard], area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = cards.iter().map(|card| kv_line(&card.label, card.value.clone())).collect();
    Widget::render(
        Paragraph::new(lines).block(Block::bordered().title("Performance").border_style(BORDER)),
        area, buf,
    );
}

fn kv_line(label: &str, value: String) -> Line<'static> {
    let color = cell_color(&value);
    Line::from(vec![
        Span::styled(format!("  {:<34}", label), Style::default().fg(GRAY)),
        Span::styled(value, Style::default().fg(color)),
    ])
}
