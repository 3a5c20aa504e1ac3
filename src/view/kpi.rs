use serde::Serialize;

use crate::error::SectionError;
use crate::report::{GroupedBlock, SectionPayload, PLACEHOLDER};
use crate::view::TableView;

/// Headline metrics, in card order. Keys missing from the report are skipped.
pub const KPI_KEYS: [&str; 21] = [
    "Backtesting from",
    "Backtesting to",
    "Total trades",
    "Trades/day (avg)",
    "Starting balance",
    "Final balance",
    "Absolute profit",
    "Total return (%)",
    "CAGR (%)",
    "Profit factor",
    "Expectancy (USD)",
    "Win rate (%)",
    "Avg win",
    "Avg loss",
    "Avg win/loss",
    "Max drawdown ($)",
    "Max drawdown (%)",
    "Max daily loss ($)",
    "Max daily loss (%)",
    "Max consecutive wins",
    "Max consecutive losses",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
}

/// Project the metrics block onto [`KPI_KEYS`] order.
pub fn kpi_cards(metrics: &GroupedBlock) -> Vec<KpiCard> {
    KPI_KEYS
        .iter()
        .filter_map(|key| {
            let v = metrics.get(key)?;
            Some(KpiCard { label: key.to_string(), value: with_percent_suffix(key, v.display()) })
        })
        .collect()
}

/// "(%)" metrics are reported as bare numbers; the card carries the unit.
fn with_percent_suffix(label: &str, display: String) -> String {
    if label.ends_with("(%)") && display != PLACEHOLDER && !display.contains('%') {
        format!("{}%", display)
    } else {
        display
    }
}

/// Flatten `group → key → value` into a Section / Metric / Value table.
pub fn config_table(section: &SectionPayload) -> Result<TableView, SectionError> {
    let mut rows = Vec::new();
    for (group, payload) in section.children() {
        match payload {
            SectionPayload::Group(block) => {
                for (k, v) in block.entries() {
                    rows.push(vec![group.clone(), k.clone(), v.display()]);
                }
            }
            SectionPayload::Leaf(v) => rows.push(vec![group.clone(), PLACEHOLDER.to_string(), v.display()]),
            _ => {}
        }
    }
    // A flat section has no groups: one unnamed group holds everything
    if let SectionPayload::Group(block) = section {
        for (k, v) in block.entries() {
            rows.push(vec![PLACEHOLDER.to_string(), k.clone(), v.display()]);
        }
    }
    if rows.is_empty() {
        return Err(SectionError::EmptyTable);
    }
    Ok(TableView {
        title: None,
        columns: vec!["Section".into(), "Metric".into(), "Value".into()],
        rows,
        numeric: vec![false, false, true],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Value;
    use serde_json::json;

    #[test]
    fn test_cards_follow_fixed_order() {
        let block = GroupedBlock::from_pairs([
            ("Win rate (%)", Value::boxed(55.0, "55.00")),
            ("Unlisted", Value::Number(1.0)),
            ("Total trades", Value::boxed(10.0, "10")),
        ]);
        let cards = kpi_cards(&block);
        let labels: Vec<&str> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Total trades", "Win rate (%)"]);
        assert_eq!(cards[1].value, "55.00%");
    }

    #[test]
    fn test_percent_suffix_rules() {
        assert_eq!(with_percent_suffix("Total return (%)", "12.3".into()), "12.3%");
        assert_eq!(with_percent_suffix("Total return (%)", "12.3%".into()), "12.3%");
        assert_eq!(with_percent_suffix("Total return (%)", "-".into()), "-");
        assert_eq!(with_percent_suffix("Max drawdown ($)", "12.3".into()), "12.3");
    }

    #[test]
    fn test_config_table_flattens_groups() {
        let section = SectionPayload::from_json(&json!({
            "Market & Data": {"Symbol": "EURUSD", "Timeframe": "1h"},
            "Execution Model": {"Slippage": {"raw": 0.0001, "display": "1 pip"}}
        }));
        let t = config_table(&section).unwrap();
        assert_eq!(t.columns, vec!["Section", "Metric", "Value"]);
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[2], vec!["Execution Model", "Slippage", "1 pip"]);
    }

    #[test]
    fn test_config_table_empty() {
        let section = SectionPayload::Nested(Vec::new());
        assert_eq!(config_table(&section), Err(SectionError::EmptyTable));
    }
}
