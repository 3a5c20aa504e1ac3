//! Backtest report dashboard: turns a backtest report document into tables,
//! KPI cards and chart figures, drawn by a terminal UI or exported as JSON.

pub mod chart;
pub mod config;
pub mod drawdown;
pub mod dump;
pub mod error;
pub mod explorer;
pub mod export;
pub mod report;
pub mod sections;
pub mod ui;
pub mod view;

#[cfg(test)]
mod test_helpers;
