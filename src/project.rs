//! The project root Dataset
//!
//! The root `./` is an LDAC RepositoryCollection. Besides its own fields it
//! carries the agents promoted from plain project strings and the places
//! named by the project country/continent.

use serde_json::{json, Value};

use crate::context::ExportContext;
use crate::fields::apply_fields;
use crate::files::{format_timestamp, latest_modified};
use crate::graph::set_property;
use crate::id::sanitize_for_iri;
use crate::model::{FileRecord, Project};
use crate::resolver::{resolve_contact, resolve_depositor, resolve_publisher, set_contact_properties};
use crate::sessions::ensure_languages;
use crate::vocab::{LDAC_COLLECTION_PROFILE, ROOT_ENTITY_ID};

/// Every exported file of the project, in every folder
pub fn all_project_files(project: &Project) -> impl Iterator<Item = &FileRecord> {
    let documents = project
        .description_folder
        .iter()
        .chain(project.other_docs_folder.iter());
    project
        .folder
        .exported_files()
        .chain(project.sessions.iter().flat_map(|s| s.folder.exported_files()))
        .chain(project.persons.iter().flat_map(|p| p.folder.exported_files()))
        .chain(documents.flat_map(|f| f.exported_files()))
}

/// The place the collection covers: the country, described by its continent,
/// or the continent alone
fn content_location(project: &Project) -> Option<Value> {
    let metadata = &project.folder.metadata;
    let continent = metadata.value("continent");

    if let Some(country) = metadata.value("country") {
        let mut place = json!({
            "@id": format!("#place-country-{}", sanitize_for_iri(country)),
            "@type": "Place",
            "name": country
        });
        if let Some(continent) = continent {
            set_property(&mut place, "description", Value::from(format!("Located in {}", continent)));
        }
        return Some(place);
    }

    continent.map(|continent| {
        json!({
            "@id": format!("#place-continent-{}", sanitize_for_iri(continent)),
            "@type": "Place",
            "name": continent
        })
    })
}

/// Build the root entity of a project crate
///
/// Structural links (`hasPart`, `pcdm:hasMember`, `ldac:hasCollectionProtocol`)
/// are added by the exporter once the children exist.
pub fn build_root(ctx: &mut ExportContext<'_>) -> Value {
    let project = ctx.project;
    let metadata = &project.folder.metadata;

    let mut root = json!({
        "@id": ROOT_ENTITY_ID,
        "@type": ["Dataset", "RepositoryCollection"],
        "conformsTo": {"@id": LDAC_COLLECTION_PROFILE},
        "name": project.title().unwrap_or("No title provided for this project."),
        "description": metadata.text_or(
            "collectionDescription",
            "No description provided for this project."
        )
    });

    let published = ctx
        .options
        .date_published
        .or_else(|| latest_modified(all_project_files(project)));
    if let Some(published) = published {
        set_property(&mut root, "datePublished", Value::from(format_timestamp(&published)));
    }

    let contact = resolve_contact(project);
    set_contact_properties(&mut root, &contact.reference);
    ctx.emit(contact.entity);

    let license = ctx.licenses.collection_license_reference();
    set_property(&mut root, "license", license);

    if let Some(publisher) = resolve_publisher(project) {
        set_property(&mut root, "publisher", publisher.reference.clone());
        set_property(&mut root, "holdingArchive", publisher.reference);
        ctx.emit(publisher.entity);
    }
    if let Some(depositor) = resolve_depositor(project) {
        set_property(&mut root, "ldac:depositor", depositor.reference);
        ctx.emit(depositor.entity);
    }

    if let Some(place) = content_location(project) {
        let place_ref = json!([{"@id": place["@id"].clone()}]);
        set_property(&mut root, "contentLocation", place_ref);
        ctx.emit(place);
    }

    apply_fields(ctx, &project.folder, &mut root);
    ensure_languages(ctx, &mut root);
    root
}
