//! Persisting `ro-crate-metadata.json` next to the project

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::export::{to_json_string, Exporter};
use crate::model::Project;
use crate::vocab::METADATA_DESCRIPTOR_ID;

/// Path of the metadata file inside a project directory
pub fn metadata_path(project_dir: &Path) -> PathBuf {
    project_dir.join(METADATA_DESCRIPTOR_ID)
}

/// Export the whole project and write it, pretty-printed, to
/// `<project dir>/ro-crate-metadata.json`, replacing any earlier copy.
///
/// A read-only existing file is left alone and reported as an error.
pub fn write_ro_crate_file(project: &Project, exporter: &Exporter) -> Result<PathBuf, ExportError> {
    let dir = project
        .folder
        .directory
        .as_deref()
        .ok_or(ExportError::MissingProjectDirectory)?;
    if !dir.is_dir() {
        return Err(ExportError::InvalidPath(dir.to_path_buf()));
    }

    let path = metadata_path(dir);
    if let Ok(existing) = fs::metadata(&path) {
        if existing.permissions().readonly() {
            return Err(ExportError::ReadOnlyFile(path));
        }
    }

    let result = exporter.export_project(project)?;
    let json = to_json_string(&result, true)?;
    fs::write(&path, json)?;

    info!(
        "Wrote {} ({} entities) to {}",
        METADATA_DESCRIPTOR_ID,
        result.stats.total_entities,
        path.display()
    );
    Ok(path)
}
