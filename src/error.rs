use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a report document or writing an export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid report JSON")]
    Json(#[from] serde_json::Error),

    #[error("report root must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("no report.json in run directory {0}")]
    MissingReport(PathBuf),
}

/// Hard precondition violations inside one section renderer.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SectionError {
    #[error("table renderer called with no rows")]
    EmptyTable,

    #[error("equity series columns differ in length: time={time}, equity={equity}, drawdown={drawdown}")]
    SeriesLength {
        time: usize,
        equity: usize,
        drawdown: usize,
    },

    #[error("unexpected payload shape for {key}: {detail}")]
    Shape { key: String, detail: String },

    #[error("renderer panicked: {0}")]
    Panicked(String),
}
