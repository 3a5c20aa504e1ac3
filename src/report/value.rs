use serde_json::Value as Json;

/// Shown wherever a value is absent.
pub const PLACEHOLDER: &str = "-";

const BOX_KEYS: [&str; 3] = ["raw", "kind", "display"];

// ─── Raw side ───

/// Machine-comparable side of a report value.
#[derive(Clone, Debug, PartialEq)]
pub enum Raw {
    Null,
    Bool(bool),
    /// JSON integer; formats differently from a float with the same value.
    Int(i64),
    Number(f64),
    Text(String),
}

impl Raw {
    pub fn is_null(&self) -> bool {
        matches!(self, Raw::Null)
    }

    /// Numeric reading: numbers as-is, booleans as 0/1, decimal text parsed.
    /// `None` when the value has no finite numeric reading.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Raw::Null => return None,
            Raw::Bool(b) => if *b { 1.0 } else { 0.0 },
            Raw::Int(i) => *i as f64,
            Raw::Number(n) => *n,
            Raw::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    return None;
                }
                t.parse::<f64>().ok()?
            }
        };
        v.is_finite().then_some(v)
    }

    fn from_json(v: &Json) -> Raw {
        match v {
            Json::Null => Raw::Null,
            Json::Bool(b) => Raw::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Raw::Int(i),
                None => n.as_f64().map(Raw::Number).unwrap_or(Raw::Null),
            },
            Json::String(s) => Raw::Text(s.clone()),
            other => Raw::Text(other.to_string()),
        }
    }
}

// ─── Boxed value ───

/// Dual representation of one reported metric.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueBox {
    pub raw: Raw,
    pub kind: Option<String>,
    pub display: Option<String>,
}

impl ValueBox {
    pub fn new(raw: Raw, display: impl Into<String>) -> Self {
        Self { raw, kind: None, display: Some(display.into()) }
    }

    /// Display text, formatted from `raw` and `kind` when the box carries none.
    pub fn display_text(&self) -> String {
        match &self.display {
            Some(d) => d.clone(),
            None => format_value(&self.raw, self.kind.as_deref().unwrap_or("auto")),
        }
    }
}

// ─── Value ───

/// A report cell: either a bare primitive or a raw/display box.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Boxed(ValueBox),
}

impl Value {
    pub fn boxed(raw: f64, display: impl Into<String>) -> Self {
        Value::Boxed(ValueBox::new(Raw::Number(raw), display))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn from_json(v: &Json) -> Value {
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            Json::String(s) => Value::Text(s.clone()),
            Json::Object(map) if is_box(map) => Value::Boxed(ValueBox {
                raw: map.get("raw").map(Raw::from_json).unwrap_or(Raw::Null),
                kind: map.get("kind").and_then(Json::as_str).map(str::to_string),
                display: map.get("display").and_then(|d| match d {
                    Json::Null => None,
                    Json::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                }),
            }),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn raw(&self) -> Raw {
        match self {
            Value::Null => Raw::Null,
            Value::Bool(b) => Raw::Bool(*b),
            Value::Number(n) => Raw::Number(*n),
            Value::Text(s) => Raw::Text(s.clone()),
            Value::Boxed(b) => b.raw.clone(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Value::Null => PLACEHOLDER.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => js_number(*n),
            Value::Text(s) => s.clone(),
            Value::Boxed(b) => b.display_text(),
        }
    }

    /// Numeric coercion with a 0 fallback.
    pub fn number(&self) -> f64 {
        self.raw().as_f64().unwrap_or(0.0)
    }
}

/// True when a JSON object is a raw/kind/display box rather than a mapping.
pub(crate) fn is_box(map: &serde_json::Map<String, Json>) -> bool {
    !map.is_empty()
        && map.keys().all(|k| BOX_KEYS.contains(&k.as_str()))
        && map.values().all(|v| !v.is_object())
}

// ─── Accessors over possibly-absent cells ───

/// `raw()` of a cell that may be missing.
pub fn raw(v: Option<&Value>) -> Raw {
    v.map(Value::raw).unwrap_or(Raw::Null)
}

/// `display()` of a cell that may be missing.
pub fn display(v: Option<&Value>) -> String {
    v.map(Value::display).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Numeric reading of a cell that may be missing, 0 when absent or non-numeric.
pub fn number(v: Option<&Value>) -> f64 {
    v.map(Value::number).unwrap_or(0.0)
}

// ─── Formatting ───

/// String form of a number the way a browser prints it: integral values
/// without a fractional part.
pub fn js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Display text for a raw value with a formatting kind
/// (`pct`, `money`, `int`, `num`, `auto`, `sig4`).
///
/// Integers under `auto`/`int` print grouped with no decimals; every other
/// number goes through the float rules, and an unknown kind (or `int` on a
/// float) prints the number as-is, keeping a `.0` on integral floats.
pub fn format_value(raw: &Raw, kind: &str) -> String {
    let x = match raw {
        Raw::Null => return PLACEHOLDER.to_string(),
        Raw::Text(s) => return s.clone(),
        Raw::Bool(b) => return b.to_string(),
        Raw::Int(i) if kind == "auto" || kind == "int" => return group_thousands(&i.to_string()),
        Raw::Int(i) => *i as f64,
        Raw::Number(n) => *n,
    };
    if !x.is_finite() {
        return js_number(x);
    }
    match kind {
        "pct" => format!("{}%", group_thousands(&format!("{:.2}", x * 100.0))),
        "money" => group_thousands(&format!("{:.2}", x)),
        "auto" | "num" => group_thousands(&format!("{:.4}", x)),
        "sig4" => significant(x, 4),
        _ => match raw {
            Raw::Int(i) => i.to_string(),
            _ => float_repr(x),
        },
    }
}

/// Plain float text; integral values keep one decimal ("3.0").
fn float_repr(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

fn group_thousands(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

fn significant(x: f64, digits: i32) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let exp = x.abs().log10().floor() as i32;
    if exp < -4 || exp >= digits {
        return format!("{:.*e}", (digits - 1) as usize, x);
    }
    let decimals = (digits - 1 - exp).max(0) as usize;
    let s = format!("{:.*}", decimals, x);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_of_box_is_boxed_field() {
        let v = Value::from_json(&json!({"raw": 12.3, "display": "12.3"}));
        assert_eq!(v.raw(), Raw::Number(12.3));

        let null_raw = Value::from_json(&json!({"raw": null, "display": "n/a"}));
        assert_eq!(null_raw.raw(), Raw::Null);

        // A box without raw is non-numeric
        let no_raw = Value::from_json(&json!({"display": "2024-01-02"}));
        assert!(no_raw.raw().is_null());
        assert_eq!(no_raw.number(), 0.0);
    }

    #[test]
    fn test_raw_of_primitive_is_itself() {
        assert_eq!(Value::Number(4.0).raw(), Raw::Number(4.0));
        assert_eq!(Value::text("abc").raw(), Raw::Text("abc".into()));
        assert_eq!(raw(None), Raw::Null);
    }

    #[test]
    fn test_display_rules() {
        assert_eq!(display(None), "-");
        assert_eq!(Value::Null.display(), "-");
        assert_eq!(Value::Number(3.0).display(), "3");
        assert_eq!(Value::Number(0.25).display(), "0.25");
        assert_eq!(Value::boxed(0.1234, "12.34%").display(), "12.34%");
    }

    #[test]
    fn test_display_falls_back_to_kind_formatting() {
        let pct = Value::from_json(&json!({"raw": 0.1234, "kind": "pct"}));
        assert_eq!(pct.display(), "12.34%");
        let money = Value::from_json(&json!({"raw": 1234567.891, "kind": "money"}));
        assert_eq!(money.display(), "1,234,567.89");
        let int = Value::from_json(&json!({"raw": 12000, "kind": "int"}));
        assert_eq!(int.display(), "12,000");
        let num = Value::from_json(&json!({"raw": -1.5, "kind": "num"}));
        assert_eq!(num.display(), "-1.5000");
        let sig = Value::from_json(&json!({"raw": 0.000123456, "kind": "sig4"}));
        assert_eq!(sig.display(), "0.0001235");
        let depth = Value::from_json(&json!({"raw": 50}));
        assert_eq!(depth.display(), "50");
    }

    #[test]
    fn test_integer_and_float_raws_format_apart() {
        let int = Value::from_json(&json!({"raw": 1}));
        assert_eq!(int.raw(), Raw::Int(1));
        assert_eq!(int.display(), "1");
        assert_eq!(int.number(), 1.0);

        let float = Value::from_json(&json!({"raw": 1.0}));
        assert_eq!(float.raw(), Raw::Number(1.0));
        assert_eq!(float.display(), "1.0000");

        // "int" on a float prints the float unchanged
        assert_eq!(Value::from_json(&json!({"raw": 2.5, "kind": "int"})).display(), "2.5");
        assert_eq!(Value::from_json(&json!({"raw": 3.0, "kind": "int"})).display(), "3.0");
        assert_eq!(Value::from_json(&json!({"raw": 7, "kind": "pct"})).display(), "700.00%");
        assert_eq!(format_value(&Raw::Int(42), "custom"), "42");
    }

    #[test]
    fn test_number_coercion_falls_back_to_zero() {
        assert_eq!(Value::text("12.5").number(), 12.5);
        assert_eq!(Value::text("abc").number(), 0.0);
        assert_eq!(Value::text("").number(), 0.0);
        assert_eq!(Value::Null.number(), 0.0);
        assert_eq!(Value::Bool(true).number(), 1.0);
        assert_eq!(number(None), 0.0);
    }

    #[test]
    fn test_plain_objects_are_not_boxes() {
        let v = Value::from_json(&json!({"raw": 1, "extra": 2}));
        assert!(matches!(v, Value::Text(_)));
    }
}
