//! Project document folders
//!
//! `DescriptionDocuments/` and `OtherDocuments/` become Datasets under the
//! root. Description documents additionally describe the collection protocol.

use serde_json::{json, Value};

use crate::context::ExportContext;
use crate::files::{build_folder_files, earliest_modified, format_timestamp};
use crate::graph::{link_containment, reference, set_property};
use crate::id::document_dataset_id;
use crate::license::LicenseFallback;
use crate::model::{DocumentKind, Folder};
use crate::vocab::COLLECTION_PROTOCOL;

pub const DESCRIPTION_PROTOCOL_ID: &str = "#descriptionDocuments";

/// Nodes built for one document folder
#[derive(Debug, Clone)]
pub struct DocumentEntities {
    pub dataset: Value,
    pub files: Vec<Value>,
}

fn dataset_text(kind: DocumentKind) -> (&'static str, &'static str) {
    match kind {
        DocumentKind::Description => (
            "Description Documents",
            "Documents describing the collection methodology and protocols.",
        ),
        DocumentKind::Other => (
            "Other Documents",
            "Additional documents associated with this collection.",
        ),
    }
}

/// Dataset and files of a document folder; `None` when it has nothing to export
pub fn build_document_folder(
    ctx: &mut ExportContext<'_>,
    folder: &Folder,
    kind: DocumentKind,
) -> Option<DocumentEntities> {
    if !folder.has_exported_files() {
        return None;
    }

    let (name, description) = dataset_text(kind);
    let mut dataset = json!({
        "@id": document_dataset_id(kind),
        "@type": "Dataset",
        "name": name,
        "description": description
    });

    let mut files: Vec<Value> = build_folder_files(ctx, folder, LicenseFallback::Collection)
        .into_iter()
        .map(|built| built.entity)
        .collect();
    for file in files.iter_mut() {
        link_containment(&mut dataset, file);
    }
    let license = ctx.licenses.collection_license_reference();
    set_property(&mut dataset, "license", license);

    Some(DocumentEntities { dataset, files })
}

/// The `ldac:CollectionProtocol` describing the description documents
///
/// Linked to `DescriptionDocuments/` with `about`; the caller adds the
/// `subjectOf` back-link on the Dataset.
pub fn collection_protocol(ctx: &ExportContext<'_>, folder: &Folder, author: &Value) -> Value {
    let metadata = &ctx.project.folder.metadata;
    let name = match ctx.project.title() {
        Some(title) => format!("{} collection protocol", title),
        None => "Collection protocol documents".to_string(),
    };
    let description = metadata.text_or(
        "collectionDescription",
        "DescriptionDocuments exported from lameta summarizing how this collection was gathered.",
    );

    let mut protocol = json!({
        "@id": DESCRIPTION_PROTOCOL_ID,
        "@type": COLLECTION_PROTOCOL,
        "name": name,
        "description": description,
        "author": author,
        "about": reference(document_dataset_id(DocumentKind::Description))
    });

    let published = earliest_modified(folder.exported_files()).or(ctx.options.date_published);
    if let Some(published) = published {
        set_property(&mut protocol, "datePublished", Value::from(format_timestamp(&published)));
    }
    protocol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExportOptions;
    use crate::languages::StaticLanguageNames;
    use crate::license::COLLECTION_LICENSE_ID;
    use crate::model::{FileRecord, FolderKind, Project};
    use crate::vocabulary::VocabularyCatalog;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_document_folder() {
        let project = Project::new(Folder::new(FolderKind::Project, "edolo"));
        let catalog = VocabularyCatalog::new();
        let names = StaticLanguageNames::new();
        let options = ExportOptions::default();
        let mut ctx = ExportContext::new(&project, &catalog, &names, &options);

        let folder = Folder::new(FolderKind::DocumentFolder(DocumentKind::Other), "")
            .with_file(FileRecord::new("/p/OtherDocuments/map.pdf"))
            .with_file(FileRecord::new("/p/OtherDocuments/consent form.pdf").with_property("access", "F"));

        let built = build_document_folder(&mut ctx, &folder, DocumentKind::Other).unwrap();
        assert_eq!(built.dataset["@id"], "OtherDocuments/");
        assert_eq!(built.dataset["name"], "Other Documents");
        assert_eq!(
            built.dataset["hasPart"],
            json!([{"@id": "OtherDocuments/map.pdf"}, {"@id": "OtherDocuments/consent%20form.pdf"}])
        );
        assert_eq!(built.files[0]["isPartOf"], json!({"@id": "OtherDocuments/"}));
        assert_eq!(built.files[0]["license"], json!({"@id": COLLECTION_LICENSE_ID}));
        assert_eq!(built.files[1]["license"], json!({"@id": "#license-unknown-f"}));
    }

    #[test]
    fn test_empty_folder_is_skipped() {
        let project = Project::new(Folder::new(FolderKind::Project, "edolo"));
        let catalog = VocabularyCatalog::new();
        let names = StaticLanguageNames::new();
        let options = ExportOptions::default();
        let mut ctx = ExportContext::new(&project, &catalog, &names, &options);

        let folder = Folder::new(FolderKind::DocumentFolder(DocumentKind::Description), "")
            .with_file(FileRecord::new("/p/DescriptionDocuments/ro-crate-metadata.json"));
        assert!(build_document_folder(&mut ctx, &folder, DocumentKind::Description).is_none());
    }

    #[test]
    fn test_collection_protocol() {
        let project = Project::new(
            Folder::new(FolderKind::Project, "edolo")
                .with_property("title", "Edolo")
                .with_property("collectionDescription", "Texts from Huya"),
        );
        let catalog = VocabularyCatalog::new();
        let names = StaticLanguageNames::new();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&project, &catalog, &names, &options);

        let mut early = FileRecord::new("/p/DescriptionDocuments/a.pdf");
        early.modified = Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap());
        let mut late = FileRecord::new("/p/DescriptionDocuments/b.pdf");
        late.modified = Some(Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap());
        let folder = Folder::new(FolderKind::DocumentFolder(DocumentKind::Description), "")
            .with_file(late)
            .with_file(early);

        let author = json!({"@id": "#unknown-contributor"});
        let protocol = collection_protocol(&ctx, &folder, &author);
        assert_eq!(protocol["@type"], COLLECTION_PROTOCOL);
        assert_eq!(protocol["name"], "Edolo collection protocol");
        assert_eq!(protocol["description"], "Texts from Huya");
        assert_eq!(protocol["author"], author);
        assert_eq!(protocol["about"], json!({"@id": "DescriptionDocuments/"}));
        assert_eq!(protocol["datePublished"], "2020-01-02T00:00:00.000Z");
        assert!(protocol.get("hasPart").is_none());
    }
}
