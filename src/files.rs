//! File entities
//!
//! Every exported file becomes a `File` node typed by its extension, carrying
//! size, dates, MIME type and exactly one license.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::context::ExportContext;
use crate::graph::{reference, set_property};
use crate::id::file_id;
use crate::license::LicenseFallback;
use crate::media::{mime_type, MediaKind};
use crate::model::{FileRecord, Folder};

/// ISO 8601 with millisecond precision, UTC
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A built file node and its media kind
#[derive(Debug, Clone)]
pub struct FileEntity {
    pub entity: Value,
    pub kind: MediaKind,
}

impl FileEntity {
    pub fn id(&self) -> &str {
        self.entity["@id"].as_str().unwrap_or_default()
    }
}

/// Build the node for one file of `folder`; `None` for files without a usable name
pub fn build_file_entity(
    ctx: &mut ExportContext<'_>,
    folder: &Folder,
    file: &FileRecord,
    fallback: LicenseFallback<'_>,
) -> Option<FileEntity> {
    let name = file.file_name()?;
    let extension = file.extension();
    let kind = MediaKind::from_extension(&extension);

    let mut entity = json!({
        "@id": file_id(folder.kind, &folder.file_prefix, name),
        "@type": kind.entity_type(),
        "contentSize": file.size,
        "encodingFormat": mime_type(&extension),
        "name": name
    });
    if let Some(created) = &file.created {
        set_property(&mut entity, "dateCreated", Value::from(format_timestamp(created)));
    }
    if let Some(modified) = &file.modified {
        set_property(&mut entity, "dateModified", Value::from(format_timestamp(modified)));
    }

    let license = ctx.licenses.ensure_file_license(file, fallback);
    set_property(&mut entity, "license", reference(&license));

    Some(FileEntity { entity, kind })
}

/// Build the nodes for every exported file of `folder`, in folder order
pub fn build_folder_files(
    ctx: &mut ExportContext<'_>,
    folder: &Folder,
    fallback: LicenseFallback<'_>,
) -> Vec<FileEntity> {
    folder
        .exported_files()
        .filter_map(|file| build_file_entity(ctx, folder, file, fallback))
        .collect()
}

/// Latest modification date among some files
pub fn latest_modified<'f>(files: impl IntoIterator<Item = &'f FileRecord>) -> Option<DateTime<Utc>> {
    files.into_iter().filter_map(|f| f.modified).max()
}

/// Earliest modification date among some files
pub fn earliest_modified<'f>(files: impl IntoIterator<Item = &'f FileRecord>) -> Option<DateTime<Utc>> {
    files.into_iter().filter_map(|f| f.modified).min()
}
