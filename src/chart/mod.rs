//! Figure construction around the plotting host: every figure is series plus
//! layout data, themed, with values coerced through the raw side of the
//! value model. Hosts (terminal UI, JSON export) only draw what is here.

pub mod theme;

use serde::Serialize;

use crate::report::Value;

use self::theme::{ColorScale, Rgb, Theme, ACCENT, CATEGORICAL, DARK, NEGATIVE, POSITIVE};

/// Floor for symmetric color domains so all-zero inputs keep a usable scale.
pub const EPSILON: f64 = 1e-9;

pub const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Hour-of-day categories "0".."23".
pub fn hours() -> Vec<String> {
    (0..24).map(|h| h.to_string()).collect()
}

// ─── Figure model ───

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    #[default]
    Group,
    Stack,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FigureLayout {
    pub theme: Theme,
    /// Preferred height in terminal rows.
    pub height: u16,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub y2_title: Option<String>,
    pub y_range: Option<(f64, f64)>,
    pub color_domain: Option<(f64, f64)>,
    pub bar_mode: BarMode,
    pub show_legend: bool,
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self {
            theme: DARK,
            height: 12,
            x_title: None,
            y_title: None,
            y2_title: None,
            y_range: None,
            color_domain: None,
            bar_mode: BarMode::Group,
            show_legend: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: Option<String>,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    /// One color per bar.
    pub colors: Vec<Rgb>,
    /// Hover text per bar; empty when the value itself is shown.
    pub text: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    /// Magnitudes; never negative.
    pub values: Vec<f64>,
    pub hole: f64,
    pub colors: Vec<Rgb>,
}

impl PieTrace {
    /// Share of each slice in percent; zeros when every slice is empty.
    pub fn percentages(&self) -> Vec<f64> {
        let total: f64 = self.values.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.values.len()];
        }
        self.values.iter().map(|v| v / total * 100.0).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterMode {
    Lines,
    Markers,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: ScatterMode,
    /// A single entry colors the whole trace; otherwise one per point.
    pub colors: Vec<Rgb>,
    pub fill_to_zero: bool,
    pub secondary_y: bool,
}

impl ScatterTrace {
    pub fn line(name: impl Into<String>, x: Vec<String>, y: Vec<f64>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            mode: ScatterMode::Lines,
            colors: vec![color],
            fill_to_zero: false,
            secondary_y: false,
        }
    }

    pub fn markers(name: impl Into<String>, x: Vec<String>, y: Vec<f64>, colors: Vec<Rgb>) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            mode: ScatterMode::Markers,
            colors,
            fill_to_zero: false,
            secondary_y: false,
        }
    }

    pub fn filled(mut self) -> Self {
        self.fill_to_zero = true;
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.secondary_y = true;
        self
    }

    /// Color of point `i`.
    pub fn color_at(&self, i: usize) -> Rgb {
        match self.colors.len() {
            0 => ACCENT,
            1 => self.colors[0],
            _ => self.colors.get(i).copied().unwrap_or(ACCENT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Bar(BarTrace),
    Pie(PieTrace),
    Scatter(ScatterTrace),
}

/// Series plus layout, ready for a plotting host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub traces: Vec<Trace>,
    pub layout: FigureLayout,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), traces: Vec::new(), layout: FigureLayout::default() }
    }

    pub fn trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.layout.theme = theme;
        self
    }

    pub fn height(mut self, rows: u16) -> Self {
        self.layout.height = rows;
        self
    }

    pub fn x_title(mut self, title: impl Into<String>) -> Self {
        self.layout.x_title = Some(title.into());
        self
    }

    pub fn y_title(mut self, title: impl Into<String>) -> Self {
        self.layout.y_title = Some(title.into());
        self
    }

    pub fn y2_title(mut self, title: impl Into<String>) -> Self {
        self.layout.y2_title = Some(title.into());
        self
    }

    pub fn legend(mut self) -> Self {
        self.layout.show_legend = true;
        self
    }

    pub fn bars(&self) -> impl Iterator<Item = &BarTrace> {
        self.traces.iter().filter_map(|t| match t {
            Trace::Bar(b) => Some(b),
            _ => None,
        })
    }

    pub fn scatters(&self) -> impl Iterator<Item = &ScatterTrace> {
        self.traces.iter().filter_map(|t| match t {
            Trace::Scatter(s) => Some(s),
            _ => None,
        })
    }

    pub fn pie(&self) -> Option<&PieTrace> {
        self.traces.iter().find_map(|t| match t {
            Trace::Pie(p) => Some(p),
            _ => None,
        })
    }
}

// ─── Coercion ───

/// Plot coordinates for a column of cells: raw side, 0 when not numeric.
pub fn plot_values<'a>(cells: impl IntoIterator<Item = Option<&'a Value>>) -> Vec<f64> {
    cells.into_iter().map(crate::report::number).collect()
}

/// Symmetric color domain `[-maxAbs, maxAbs]`, floored at [`EPSILON`].
pub fn symmetric_domain(values: &[f64]) -> (f64, f64) {
    let max_abs = values.iter().map(|v| v.abs()).filter(|v| v.is_finite()).fold(EPSILON, f64::max);
    (-max_abs, max_abs)
}

/// Re-index `(category, value)` pairs onto a canonical category order.
/// Categories absent from the pairs read as 0; unknown categories are dropped.
pub fn reindex(canonical: &[String], pairs: &[(String, f64)]) -> Vec<f64> {
    canonical
        .iter()
        .map(|c| pairs.iter().rev().find(|(k, _)| k == c).map(|(_, v)| *v).unwrap_or(0.0))
        .collect()
}

/// "3h 30m" style label for a fractional hour count.
pub fn hours_to_hm(h: f64) -> String {
    let hours = h.floor();
    let minutes = ((h - hours) * 60.0).round();
    format!("{}h {}m", hours as i64, minutes as i64)
}

// ─── Bar figures ───

/// Uniformly colored bars in the given category order.
pub fn bar(title: &str, categories: Vec<String>, values: Vec<f64>, color: Rgb) -> Figure {
    let colors = vec![color; values.len()];
    Figure::new(title).trace(Trace::Bar(BarTrace { name: None, categories, values, colors, text: Vec::new() }))
}

/// Bars colored on a symmetric domain so zero sits at the scale's center.
pub fn diverging_bar(title: &str, categories: Vec<String>, values: Vec<f64>) -> Figure {
    scaled_bar(title, categories, values, ColorScale::Diverging)
}

/// Bars colored light-to-dark red by magnitude.
pub fn sequential_bar(title: &str, categories: Vec<String>, values: Vec<f64>) -> Figure {
    scaled_bar(title, categories, values, ColorScale::Reds)
}

fn scaled_bar(title: &str, categories: Vec<String>, values: Vec<f64>, scale: ColorScale) -> Figure {
    let domain = symmetric_domain(&values);
    let colors = values.iter().map(|v| scale.color(*v, domain)).collect();
    let mut fig = Figure::new(title).trace(Trace::Bar(BarTrace { name: None, categories, values, colors, text: Vec::new() }));
    fig.layout.color_domain = Some(domain);
    fig
}

/// Bars with per-bar hover text (durations in hours with a readable label).
pub fn duration_bar(title: &str, categories: Vec<String>, hours: Vec<f64>, text: Vec<String>, color: Rgb) -> Figure {
    let colors = vec![color; hours.len()];
    Figure::new(title).trace(Trace::Bar(BarTrace { name: None, categories, values: hours, colors, text }))
}

// ─── Pie ───

/// Donut of magnitudes; signs cannot be shown in a pie.
pub fn pie(title: &str, labels: Vec<String>, values: &[f64]) -> Figure {
    let values: Vec<f64> = values.iter().map(|v| if v.is_finite() { v.abs() } else { 0.0 }).collect();
    let colors = (0..values.len()).map(|i| CATEGORICAL[i % CATEGORICAL.len()]).collect();
    Figure::new(title).trace(Trace::Pie(PieTrace { labels, values, hole: 0.4, colors }))
}

// ─── 100%-stacked signed contribution ───

#[derive(Clone, Debug, PartialEq)]
pub struct SignedShares {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
}

/// Split values into positive and negative shares of `Σ|v|` in percent.
pub fn signed_shares(values: &[f64]) -> SignedShares {
    let total: f64 = values.iter().map(|v| v.abs()).sum();
    let denom = if total == 0.0 { 1.0 } else { total };
    SignedShares {
        positive: values.iter().map(|&v| if v > 0.0 { v / denom * 100.0 } else { 0.0 }).collect(),
        negative: values.iter().map(|&v| if v < 0.0 { -v / denom * 100.0 } else { 0.0 }).collect(),
    }
}

pub fn signed_contribution(title: &str, labels: Vec<String>, values: &[f64], y_title: &str) -> Figure {
    let shares = signed_shares(values);
    let n = labels.len();
    let mut fig = Figure::new(title)
        .trace(Trace::Bar(BarTrace {
            name: Some("Positive".into()),
            categories: labels.clone(),
            values: shares.positive,
            colors: vec![POSITIVE; n],
            text: Vec::new(),
        }))
        .trace(Trace::Bar(BarTrace {
            name: Some("Negative".into()),
            categories: labels,
            values: shares.negative,
            colors: vec![NEGATIVE; n],
            text: Vec::new(),
        }))
        .y_title(y_title)
        .legend();
    fig.layout.bar_mode = BarMode::Stack;
    fig.layout.y_range = Some((0.0, 100.0));
    fig
}
