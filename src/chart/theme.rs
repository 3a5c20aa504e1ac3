use serde::{Serialize, Serializer};

/// 24-bit color, serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ─── Palette ───

pub const ACCENT: Rgb = Rgb(0x58, 0xa6, 0xff);
pub const MUTED: Rgb = Rgb(0x8b, 0x94, 0x9e);
pub const POSITIVE: Rgb = Rgb(0x3f, 0xb9, 0x50);
pub const NEGATIVE: Rgb = Rgb(0xf8, 0x51, 0x49);
pub const GRID: Rgb = Rgb(0x30, 0x36, 0x3d);

/// Categorical colors for pie slices.
pub const CATEGORICAL: [Rgb; 8] = [
    Rgb(0x58, 0xa6, 0xff),
    Rgb(0xf0, 0x88, 0x3e),
    Rgb(0x3f, 0xb9, 0x50),
    Rgb(0xf8, 0x51, 0x49),
    Rgb(0xbc, 0x8c, 0xff),
    Rgb(0xd2, 0x99, 0x22),
    Rgb(0x39, 0xc5, 0xcf),
    Rgb(0xdb, 0x61, 0xa2),
];

// red → neutral → blue
const DIVERGING_STOPS: [Rgb; 5] = [
    Rgb(0xca, 0x00, 0x20),
    Rgb(0xf4, 0xa5, 0x82),
    Rgb(0xf7, 0xf7, 0xf7),
    Rgb(0x92, 0xc5, 0xde),
    Rgb(0x05, 0x71, 0xb0),
];

const REDS_STOPS: [Rgb; 3] = [Rgb(0xfe, 0xe5, 0xd9), Rgb(0xfb, 0x6a, 0x4a), Rgb(0xa5, 0x0f, 0x15)];

// ─── Theme ───

/// Figure padding in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub top: u16,
    pub left: u16,
    pub right: u16,
    pub bottom: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Theme {
    pub paper_bg: Rgb,
    pub plot_bg: Rgb,
    pub font: Rgb,
    pub margin: Margin,
}

pub const DARK: Theme = Theme {
    paper_bg: Rgb(0x16, 0x1b, 0x22),
    plot_bg: Rgb(0x16, 0x1b, 0x22),
    font: Rgb(0xe6, 0xed, 0xf3),
    margin: Margin { top: 0, left: 1, right: 1, bottom: 0 },
};

/// Darker variant used by diagnostics tiles.
pub const DARK_TILE: Theme = Theme {
    paper_bg: Rgb(0x0d, 0x11, 0x17),
    plot_bg: Rgb(0x0d, 0x11, 0x17),
    font: Rgb(0xe6, 0xed, 0xf3),
    margin: Margin { top: 0, left: 1, right: 1, bottom: 0 },
};

// ─── Color scales ───

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// Red for the domain minimum, blue for the maximum.
    Diverging,
    /// Light to dark red by magnitude.
    Reds,
}

impl ColorScale {
    pub fn color(self, v: f64, domain: (f64, f64)) -> Rgb {
        match self {
            ColorScale::Diverging => {
                let span = domain.1 - domain.0;
                let t = if span > 0.0 { (v - domain.0) / span } else { 0.5 };
                sample(&DIVERGING_STOPS, t)
            }
            ColorScale::Reds => {
                let max_abs = domain.0.abs().max(domain.1.abs());
                let t = if max_abs > 0.0 { v.abs() / max_abs } else { 0.0 };
                sample(&REDS_STOPS, t)
            }
        }
    }
}

fn sample(stops: &[Rgb], t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let scaled = t * (stops.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    stops[i].lerp(stops[i + 1], scaled - i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diverging_scale_centered_on_zero() {
        let domain = (-10.0, 10.0);
        assert_eq!(ColorScale::Diverging.color(0.0, domain), Rgb(0xf7, 0xf7, 0xf7));
        assert_eq!(ColorScale::Diverging.color(-10.0, domain), Rgb(0xca, 0x00, 0x20));
        assert_eq!(ColorScale::Diverging.color(10.0, domain), Rgb(0x05, 0x71, 0xb0));
        // out-of-domain values clamp
        assert_eq!(ColorScale::Diverging.color(99.0, domain), Rgb(0x05, 0x71, 0xb0));
    }

    #[test]
    fn test_reds_by_magnitude() {
        let domain = (-4.0, 4.0);
        assert_eq!(ColorScale::Reds.color(-4.0, domain), Rgb(0xa5, 0x0f, 0x15));
        assert_eq!(ColorScale::Reds.color(0.0, domain), Rgb(0xfe, 0xe5, 0xd9));
    }

    #[test]
    fn test_hex() {
        assert_eq!(ACCENT.to_hex(), "#58a6ff");
    }
}
