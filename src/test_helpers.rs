// Shared test fixtures for report, section and UI tests.
// Only compiled under #[cfg(test)].

use serde_json::Value as Json;

use crate::report::ReportDocument;

/// A report touching every section the dashboard knows.
///
/// The entry-tag breakdown is laid out so that, for "breakout", the contexts
/// come as session (categorical), hour (time), regime (categorical, max 8
/// trades), weekday (time). "pullback" has no regime rows.
const SAMPLE: &str = r#"{
    "Core Performance Metrics": {
        "Backtesting from": {"raw": null, "display": "2024-01-01"},
        "Total trades": {"raw": 14, "display": "14"},
        "Total return (%)": {"raw": 12.3, "display": "12.3"},
        "Win rate (%)": {"raw": 55.0, "display": "55.00"},
        "Expectancy (USD)": {"raw": 2.68, "display": "2.68"},
        "Max drawdown ($)": {"raw": 120.0, "display": "120.00"}
    },
    "Backtest Configuration & Assumptions": {
        "Market & Data": {"Symbol": "EURUSD", "Timeframe": "1h"},
        "Execution Model": {
            "Slippage": {"raw": 0.0001, "display": "1 pip"},
            "Commission": {"raw": 3.5, "kind": "money"}
        }
    },
    "Trade Distribution & Payoff Geometry": {
        "R-multiple distribution": {"rows": [
            {"Bucket": "<-1R", "Trades": 3, "Share (%)": 21.4, "Avg duration": 1.5},
            {"Bucket": "-1R..0", "Trades": 5, "Share (%)": 35.7, "Avg duration": 2.25},
            {"Bucket": "0..1R", "Trades": 4, "Share (%)": 28.6, "Avg duration": 0.75},
            {"Bucket": ">1R", "Trades": 2, "Share (%)": 14.3, "Avg duration": 4.0}
        ]}
    },
    "Conditional Expectancy Analysis": {
        "By hour of day": {"rows": [
            {"hour": 9, "Trades": 4, "Expectancy (USD)": 12.5},
            {"hour": 14, "Trades": 3, "Expectancy (USD)": {"raw": -4.0, "display": "-4.00"}}
        ]},
        "By day of week": {"rows": [
            {"weekday": "Friday", "Trades": 2, "Expectancy (USD)": -2.0},
            {"weekday": "Monday", "Trades": 5, "Expectancy (USD)": 3.0}
        ]},
        "By context: regime": {"rows": [
            {"regime": "trend", "Trades": 8, "Expectancy (USD)": 6.0},
            {"regime": "range", "Trades": 6, "Expectancy (USD)": -1.0}
        ]}
    },
    "Performance by Entry Tag": {"rows": [
        {
            "Entry tag": "breakout", "Trades": 9,
            "Expectancy (USD)": {"raw": 5.5, "display": "5.50"},
            "Total PnL": {"raw": 49.5, "display": "49.50"},
            "Share (%)": 64.3,
            "Avg duration": {"raw": 7200, "display": "2h 0m"},
            "Max drawdown contribution (USD)": -30.0
        },
        {
            "Entry tag": "pullback", "Trades": 5,
            "Expectancy (USD)": {"raw": -2.4, "display": "-2.40"},
            "Total PnL": {"raw": -12.0, "display": "-12.00"},
            "Share (%)": 35.7,
            "Avg duration": {"raw": 3600, "display": "1h 0m"},
            "Max drawdown contribution (USD)": -45.0
        }
    ]},
    "Exit Logic Diagnostics": {"rows": [
        {
            "Exit tag": "take_profit", "Trades": 8,
            "Expectancy (USD)": 9.0, "Total PnL": 72.0, "Share (%)": 57.1,
            "Avg duration": {"raw": 5400, "display": "1h 30m"},
            "Max drawdown contribution (USD)": 0.0
        },
        {
            "Exit tag": "stop_loss", "Trades": 6,
            "Expectancy (USD)": -5.75, "Total PnL": -34.5, "Share (%)": 42.9,
            "Avg duration": {"raw": 1800, "display": "0h 30m"},
            "Max drawdown contribution (USD)": -75.0
        }
    ]},
    "Conditional Entry Tag Performance": {
        "By session": {"rows": [
            {"Entry tag": "breakout", "Context": "London", "Trades": 12, "Expectancy (USD)": 7.0, "Win rate": 0.66, "Total PnL": 84.0},
            {"Entry tag": "breakout", "Context": "NewYork", "Trades": 10, "Expectancy (USD)": 3.0, "Win rate": 0.5, "Total PnL": 30.0},
            {"Entry tag": "pullback", "Context": "London", "Trades": 4, "Expectancy (USD)": 2.0, "Win rate": 0.5, "Total PnL": 8.0},
            {"Entry tag": "breakout", "Context": "Asia", "Trades": 9, "Expectancy (USD)": -1.5, "Win rate": 0.33, "Total PnL": -13.5}
        ], "sorted_by": "Expectancy (USD)", "context": "session"},
        "By hour": {"rows": [
            {"Entry tag": "breakout", "Context": "9", "Trades": 11, "Expectancy (USD)": 4.0, "Win rate": 0.6, "Total PnL": 44.0},
            {"Entry tag": "breakout", "Context": "14", "Trades": 10, "Expectancy (USD)": -2.0, "Win rate": 0.4, "Total PnL": -20.0},
            {"Entry tag": "pullback", "Context": "9", "Trades": 5, "Expectancy (USD)": 1.0, "Win rate": 0.6, "Total PnL": 5.0}
        ], "sorted_by": "Expectancy (USD)", "context": "hour"},
        "By regime": {"rows": [
            {"Entry tag": "breakout", "Context": "trend", "Trades": 8, "Expectancy (USD)": 6.0, "Win rate": 0.75, "Total PnL": 48.0},
            {"Entry tag": "breakout", "Context": "range", "Trades": 3, "Expectancy (USD)": -3.0, "Win rate": 0.33, "Total PnL": -9.0}
        ], "sorted_by": "Expectancy (USD)", "context": "regime"},
        "By weekday": {"rows": [
            {"Entry tag": "breakout", "Context": "Monday", "Trades": 12, "Expectancy (USD)": 2.0, "Win rate": 0.5, "Total PnL": 24.0},
            {"Entry tag": "pullback", "Context": "Friday", "Trades": 2, "Expectancy (USD)": -6.0, "Win rate": 0.0, "Total PnL": -12.0}
        ], "sorted_by": "Expectancy (USD)", "context": "weekday"}
    },
    "Capital & Exposure Analysis": {
        "Summary": {
            "Max exposure": {"raw": 0.5, "kind": "pct"},
            "Avg exposure": {"raw": 0.21, "kind": "pct"},
            "Time in market (%)": 42.0
        },
        "Overtrading diagnostics": {"rows": [
            {"Trades/day": "1", "Days": 20, "Avg PnL": {"raw": 3.2, "display": "3.20"}, "Worst DD": {"raw": -15.0, "display": "-15.00"}},
            {"Trades/day": "2-3", "Days": 8, "Avg PnL": -1.1, "Worst DD": 40.0}
        ]}
    },
    "Drawdown Structure & Failure Modes": {
        "Summary": {
            "Max drawdown": {"raw": 120.0, "display": "120.00"},
            "Episodes": 8
        },
        "Failure modes": {"rows": [
            {"Start": "2024-01-03", "Depth": {"raw": 120.0, "display": "120.00"}},
            {"Start": "2024-01-05", "Depth": {"raw": 80.0, "display": "80.00"}},
            {"Start": {"display": "2023-12-15"}, "Depth": {"raw": 90.0, "display": "90.00"}},
            {"Start": "2024-01-07T00:00:00", "Depth": {"raw": 30.0, "display": "30.00"}},
            {"Start": "2024-01-02", "Depth": {"raw": 45.0, "display": "45.00"}},
            {"Start": "2024-01-08", "Depth": {"raw": 10.0, "display": "10.00"}},
            {"Start": "2024-01-09", "Depth": {"raw": 60.0, "display": "60.00"}},
            {"Start": "2024-01-10", "Depth": {"raw": 5.0, "display": "5.00"}}
        ]}
    },
    "__equity__": {
        "time": [
            "2024-01-01T00:00:00", "2024-01-02T00:00:00", "2024-01-03T00:00:00", "2024-01-04T00:00:00",
            "2024-01-05T00:00:00", "2024-01-06T00:00:00", "2024-01-07T00:00:00", "2024-01-08T00:00:00",
            "2024-01-09T00:00:00", "2024-01-10T00:00:00"
        ],
        "equity": [1000.0, 1010.0, 985.0, 990.0, 960.0, 975.0, 1005.0, 1020.0, 995.0, 1030.0],
        "drawdown": [0.0, 0.0, 25.0, 20.0, 50.0, 35.0, 5.0, 0.0, 25.0, 0.0]
    }
}"#;

pub fn sample_json() -> Json {
    serde_json::from_str(SAMPLE).expect("sample report is valid JSON")
}

pub fn sample_report() -> ReportDocument {
    ReportDocument::from_json(&sample_json()).expect("sample report is an object")
}
