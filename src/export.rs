//! JSON export of every mount and figure, for an external plotting host.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::ReportError;
use crate::sections::DispatchReport;
use crate::view::MountSet;

#[derive(Serialize)]
pub struct Export<'a> {
    pub source: &'a str,
    pub sections: &'a DispatchReport,
    pub mounts: &'a MountSet,
}

pub fn write_export(path: impl AsRef<Path>, export: &Export<'_>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let write_err = |source| ReportError::Write { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    info!(path = %path.display(), mounts = export.mounts.iter().count(), "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ExplorerDefaults;
    use crate::sections::SectionDispatcher;
    use crate::test_helpers::sample_report;
    use serde_json::Value as Json;

    #[test]
    fn test_export_keys_mounts_by_dom_id() {
        let doc = sample_report();
        let mut mounts = MountSet::all();
        let sections = SectionDispatcher::standard(&ExplorerDefaults::default()).dispatch(&doc, &mut mounts);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        write_export(&path, &Export { source: "sample", sections: &sections, mounts: &mounts }).unwrap();

        let json: Json = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["source"], "sample");
        let kpi = &json["mounts"]["kpi-table"][0];
        assert_eq!(kpi["type"], "cards");
        let equity = &json["mounts"]["equity-drawdown-chart"][0];
        assert_eq!(equity["type"], "figure");
        assert_eq!(equity["traces"][0]["type"], "scatter");
        assert_eq!(equity["traces"][0]["colors"][0], "#58a6ff");
    }

    #[test]
    fn test_unwritable_path_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("dash.json");
        let mounts = MountSet::all();
        let sections = DispatchReport::default();
        let err = write_export(&path, &Export { source: "x", sections: &sections, mounts: &mounts }).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
