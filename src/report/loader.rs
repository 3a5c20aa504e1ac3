use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ReportError;
use crate::report::ReportDocument;

/// File name written by the report persistence step inside each run directory.
pub const REPORT_FILE: &str = "report.json";

/// Parse a report from JSON text.
pub fn parse_report(text: &str) -> Result<ReportDocument, ReportError> {
    let root: serde_json::Value = serde_json::from_str(text)?;
    ReportDocument::from_json(&root)
}

/// Load a report from a JSON file, or from a run directory holding `report.json`.
pub fn load_report(path: impl AsRef<Path>) -> Result<ReportDocument, ReportError> {
    let file = resolve_report_path(path.as_ref())?;
    debug!(path = %file.display(), "reading report");
    let text = fs::read_to_string(&file).map_err(|source| ReportError::Io { path: file.clone(), source })?;
    let doc = parse_report(&text)?;
    info!(path = %file.display(), sections = doc.len(), "report loaded");
    Ok(doc)
}

fn resolve_report_path(path: &Path) -> Result<PathBuf, ReportError> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let candidate = path.join(REPORT_FILE);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(ReportError::MissingReport(path.to_path_buf()))
    }
}
