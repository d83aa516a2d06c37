//! Session entities
//!
//! Inside a project a session is two nodes: the `#session-<id>` CollectionEvent
//! holding the event metadata, and the `Sessions/<id>/` Dataset holding the
//! files, linked by `subjectOf`/`about`. Exported alone, the session becomes
//! the root itself.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::context::ExportContext;
use crate::fields::apply_fields;
use crate::files::{build_folder_files, format_timestamp, latest_modified};
use crate::graph::{
    has_property, link_containment, reference, references_value, set_default, set_property,
};
use crate::id::{place_id, session_directory_id, session_event_id};
use crate::license::LicenseFallback;
use crate::model::Session;
use crate::people::contributor_id;
use crate::resolver::resolve_publisher;
use crate::vocab::{LAMETA_PUBLISHER_ID, LDAC_OBJECT_PROFILE, ROOT_ENTITY_ID};

pub const SESSIONS_DATASET_ID: &str = "Sessions/";

/// Whether a session is exported inside its project or on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// `#session-<id>` event plus `Sessions/<id>/` Dataset
    Embedded,
    /// The session is the crate root `./`
    Standalone,
}

/// Nodes built for one session
#[derive(Debug, Clone)]
pub struct SessionEntities {
    pub event: Value,
    /// `Sessions/<id>/`, only in embedded mode
    pub directory: Option<Value>,
    pub files: Vec<Value>,
}

impl SessionEntities {
    pub fn into_entities(self) -> Vec<Value> {
        let mut entities = vec![self.event];
        entities.extend(self.directory);
        entities.extend(self.files);
        entities
    }
}

/// `ldac:<role>` properties from the session contributions
///
/// One holder of a role gives a bare reference, several give an array.
pub fn add_role_properties(ctx: &ExportContext<'_>, session: &Session, event: &mut Value) {
    let mut roles: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for contribution in &session.contributions {
        let name = contribution.person_reference.trim();
        let role = contribution.role.trim().to_lowercase();
        if name.is_empty() || role.is_empty() {
            continue;
        }
        let id = contributor_id(ctx.project, name);
        let holders = roles.entry(role).or_default();
        if !holders.contains(&id) {
            holders.push(id);
        }
    }

    for (role, holders) in roles {
        set_property(event, &format!("ldac:{}", role), references_value(&holders));
    }
}

/// Fill `inLanguage` and `ldac:subjectLanguage` with `und` when no field did
pub fn ensure_languages(ctx: &mut ExportContext<'_>, entity: &mut Value) {
    let owner = entity["@id"].as_str().unwrap_or(ROOT_ENTITY_ID).to_string();
    if !has_property(entity, "inLanguage") {
        let undetermined = ctx.languages.undetermined(&owner);
        set_property(entity, "inLanguage", undetermined);
    }
    if !has_property(entity, "ldac:subjectLanguage") {
        let undetermined = ctx.languages.undetermined(&owner);
        set_property(entity, "ldac:subjectLanguage", Value::Array(vec![undetermined]));
    }
}

fn session_types(mode: SessionMode) -> Value {
    match mode {
        SessionMode::Embedded => json!(["RepositoryObject", "CollectionEvent"]),
        SessionMode::Standalone => json!(["Dataset", "RepositoryObject", "CollectionEvent"]),
    }
}

/// Build the nodes of one session
pub fn build_session(
    ctx: &mut ExportContext<'_>,
    session: &Session,
    mode: SessionMode,
) -> SessionEntities {
    let folder = &session.folder;
    let metadata = &folder.metadata;
    let prefix = &folder.file_prefix;

    let id = match mode {
        SessionMode::Embedded => session_event_id(prefix),
        SessionMode::Standalone => ROOT_ENTITY_ID.to_string(),
    };
    let mut event = json!({
        "@id": id,
        "@type": session_types(mode),
        "name": metadata.text_or("title", "No title provided for this session.")
    });

    match mode {
        SessionMode::Embedded => {
            set_property(&mut event, "pcdm:memberOf", reference(ROOT_ENTITY_ID));
        }
        SessionMode::Standalone => {
            set_property(&mut event, "conformsTo", reference(LDAC_OBJECT_PROFILE));
        }
    }
    if let Some(date) = metadata.value("date") {
        set_property(&mut event, "startDate", Value::from(date));
    }
    if let Some(keywords) = metadata.value("keyword") {
        set_property(&mut event, "keywords", Value::from(keywords));
    }

    apply_fields(ctx, folder, &mut event);

    set_default(
        &mut event,
        "description",
        Value::from("No description provided for this session."),
    );

    if let Some(location) = metadata.value("location") {
        let location_id = place_id(location);
        set_default(&mut event, "location", reference(&location_id));
        if !ctx.has_satellite(&location_id) {
            ctx.emit(json!({
                "@id": location_id,
                "@type": "Place",
                "name": location
            }));
        }
    }

    ensure_languages(ctx, &mut event);
    add_role_properties(ctx, session, &mut event);

    let license = ctx.licenses.session_license(session);
    set_property(&mut event, "license", license);

    let mut files: Vec<Value> = build_folder_files(ctx, folder, LicenseFallback::Session(session))
        .into_iter()
        .map(|built| {
            let material = built.kind.material_type();
            ctx.use_material_type(material);
            let mut file = built.entity;
            set_property(&mut file, "ldac:materialType", reference(material));
            file
        })
        .collect();

    let directory = match mode {
        SessionMode::Embedded => {
            let directory_id = session_directory_id(prefix);
            let mut directory = json!({
                "@id": directory_id,
                "@type": "Dataset",
                "conformsTo": reference(LDAC_OBJECT_PROFILE),
                "name": format!("Session {}", prefix),
                "description": format!("Files for session {}.", prefix),
                "about": reference(&id)
            });
            for file in files.iter_mut() {
                link_containment(&mut directory, file);
            }
            let collection_license = ctx.licenses.collection_license_reference();
            set_property(&mut directory, "license", collection_license);
            set_property(&mut event, "subjectOf", reference(&directory_id));
            Some(directory)
        }
        SessionMode::Standalone => {
            for file in files.iter_mut() {
                link_containment(&mut event, file);
            }
            add_standalone_publication(ctx, session, &mut event);
            None
        }
    };

    SessionEntities {
        event,
        directory,
        files,
    }
}

/// Publisher and publication date of a session exported as its own crate
fn add_standalone_publication(ctx: &mut ExportContext<'_>, session: &Session, root: &mut Value) {
    match resolve_publisher(ctx.project) {
        Some(publisher) => {
            set_property(root, "publisher", publisher.reference);
            ctx.emit(publisher.entity);
        }
        None => {
            set_property(root, "publisher", reference(LAMETA_PUBLISHER_ID));
            ctx.emit(json!({
                "@id": LAMETA_PUBLISHER_ID,
                "@type": "Organization",
                "name": "LaMeta Project",
                "url": LAMETA_PUBLISHER_ID,
                "description": "A metadata tool for language documentation projects"
            }));
        }
    }

    let published: Option<DateTime<Utc>> = ctx
        .options
        .date_published
        .or_else(|| latest_modified(session.folder.exported_files()));
    if let Some(published) = published {
        set_property(root, "datePublished", Value::from(format_timestamp(&published)));
    }
}

/// The `Sessions/` Dataset holding every session directory, ids sorted
pub fn sessions_dataset(ctx: &mut ExportContext<'_>, directories: &mut [Value]) -> Option<Value> {
    if directories.is_empty() {
        return None;
    }
    directories.sort_by(|a, b| a["@id"].as_str().cmp(&b["@id"].as_str()));

    let mut dataset = json!({
        "@id": SESSIONS_DATASET_ID,
        "@type": "Dataset",
        "name": "Sessions",
        "description": "Directory of sessions in this collection."
    });
    for directory in directories.iter_mut() {
        link_containment(&mut dataset, directory);
    }
    let license = ctx.licenses.collection_license_reference();
    set_property(&mut dataset, "license", license);
    Some(dataset)
}
