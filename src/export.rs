//! Graph assembly
//!
//! Builds the flat `@graph` for a whole project, a single session exported
//! on its own, or a single person, and wraps it with the `@context`.

use log::{debug, warn};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::context::{ExportContext, ExportOptions};
use crate::documents::{build_document_folder, collection_protocol, DESCRIPTION_PROTOCOL_ID};
use crate::error::ExportError;
use crate::files::build_folder_files;
use crate::graph::{
    append_reference, audit, dedupe_has_part, find_structural_collision, has_type,
    link_containment, push_reference, unique_entries,
};
use crate::id::{person_id, session_event_id, validate_prefix};
use crate::languages::LanguageNames;
use crate::license::LicenseFallback;
use crate::model::{DocumentKind, Folder, Person, Project, Session};
use crate::people::{build_people, build_person_export};
use crate::project::build_root;
use crate::resolver::resolve_contact;
use crate::sessions::{build_session, sessions_dataset, SessionMode};
use crate::vocab::{context, metadata_descriptor};
use crate::vocabulary::VocabularyCatalog;

/// What to export
#[derive(Debug, Clone, Copy)]
pub enum ExportTarget<'p> {
    /// The whole project as an LDAC Collection
    Project,
    /// One session as its own crate, the session being the root
    Session(&'p Session),
    /// One person, as a bare list of entries
    Person(&'p Person),
}

/// Result of an export
#[derive(Debug)]
pub struct ExportResult {
    /// `None` for a person export, which has no document wrapper
    pub context: Option<Value>,
    /// The flat @graph
    pub graph: Vec<Value>,
    /// Statistics about the export
    pub stats: ExportStats,
}

/// Statistics from an export
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    /// Number of sessions exported
    pub sessions: usize,
    /// Number of contributors (or the one person) exported
    pub people: usize,
    /// Number of File nodes in the graph
    pub files: usize,
    /// Number of distinct access licenses (the collection license excluded)
    pub licenses: usize,
    /// Number of Language nodes in the graph
    pub languages: usize,
    /// Number of entities in the final graph
    pub total_entities: usize,
}

/// A vocabulary catalog, a language-name lookup and options bundled for reuse
pub struct Exporter {
    catalog: VocabularyCatalog,
    names: Box<dyn LanguageNames>,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(catalog: VocabularyCatalog, names: impl LanguageNames + 'static) -> Self {
        Self {
            catalog,
            names: Box::new(names),
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn export(&self, project: &Project, target: ExportTarget<'_>) -> Result<ExportResult, ExportError> {
        export(project, target, &self.catalog, self.names.as_ref(), &self.options)
    }

    pub fn export_project(&self, project: &Project) -> Result<ExportResult, ExportError> {
        self.export(project, ExportTarget::Project)
    }
}

/// Main export function
///
/// Input problems that would produce colliding identifiers or reference a
/// vocabulary the catalog lacks are rejected before anything is built.
pub fn export(
    project: &Project,
    target: ExportTarget<'_>,
    catalog: &VocabularyCatalog,
    names: &dyn LanguageNames,
    options: &ExportOptions,
) -> Result<ExportResult, ExportError> {
    validate(project, target, catalog, options)?;

    let mut ctx = ExportContext::new(project, catalog, names, options);
    let mut stats = ExportStats::default();

    let (jsonld_context, mut entries) = match target {
        ExportTarget::Project => {
            stats.sessions = project.sessions.len();
            (Some(context()), export_project(&mut ctx, &mut stats))
        }
        ExportTarget::Session(session) => {
            stats.sessions = 1;
            (Some(context()), export_session(&mut ctx, session, &mut stats))
        }
        ExportTarget::Person(person) => {
            stats.people = 1;
            (None, build_person_export(&mut ctx, person))
        }
    };
    entries.extend(ctx.into_support_entities());

    if let Some(id) = find_structural_collision(&entries) {
        return Err(ExportError::DuplicateId(id));
    }
    let mut graph = unique_entries(entries);
    dedupe_has_part(&mut graph);

    if jsonld_context.is_some() {
        for violation in audit(&graph) {
            warn!("RO-Crate structure check: {}", violation);
        }
    }

    stats.files = count_typed(&graph, "File");
    stats.licenses = graph
        .iter()
        .filter_map(|e| e["@id"].as_str())
        .filter(|id| id.starts_with("#license-"))
        .count();
    stats.languages = count_typed(&graph, "Language");
    stats.total_entities = graph.len();
    debug!("RO-Crate export finished: {:?}", stats);

    Ok(ExportResult {
        context: jsonld_context,
        graph,
        stats,
    })
}

fn count_typed(graph: &[Value], type_name: &str) -> usize {
    graph.iter().filter(|e| has_type(e, type_name)).count()
}

fn validate(
    project: &Project,
    target: ExportTarget<'_>,
    catalog: &VocabularyCatalog,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let mut folders: Vec<&Folder> = Vec::new();
    match target {
        ExportTarget::Project => {
            check_prefixes(project.sessions.iter().map(|s| &s.folder), "Session", session_event_id)?;
            check_prefixes(project.persons.iter().map(|p| &p.folder), "Person", person_id)?;
            folders.push(&project.folder);
            folders.extend(project.sessions.iter().map(|s| &s.folder));
        }
        ExportTarget::Session(session) => {
            check_prefixes(std::iter::once(&session.folder), "Session", session_event_id)?;
            folders.push(&session.folder);
        }
        ExportTarget::Person(person) => {
            check_prefixes(std::iter::once(&person.folder), "Person", person_id)?;
        }
    }

    if options.strict_vocabularies {
        for folder in folders {
            for field in &folder.known_fields {
                let Some(vocabulary) = field.vocabulary.as_deref() else {
                    continue;
                };
                if !field.omit_export && !catalog.contains(vocabulary) {
                    return Err(ExportError::UnknownVocabulary {
                        field: field.key.clone(),
                        vocabulary: vocabulary.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_prefixes<'f>(
    folders: impl Iterator<Item = &'f Folder>,
    role: &str,
    derive_id: fn(&str) -> String,
) -> Result<(), ExportError> {
    let mut seen = BTreeSet::new();
    for folder in folders {
        validate_prefix(&folder.file_prefix)
            .map_err(|e| ExportError::InvalidStructure(format!("{} '{}': {}", role, folder.file_prefix, e)))?;
        let id = derive_id(&folder.file_prefix);
        if !seen.insert(id.clone()) {
            return Err(ExportError::DuplicateId(id));
        }
    }
    Ok(())
}

fn export_project(ctx: &mut ExportContext<'_>, stats: &mut ExportStats) -> Vec<Value> {
    let project = ctx.project;
    let mut root = build_root(ctx);

    let mut project_files: Vec<Value> =
        build_folder_files(ctx, &project.folder, LicenseFallback::Collection)
            .into_iter()
            .map(|built| built.entity)
            .collect();
    for file in project_files.iter_mut() {
        link_containment(&mut root, file);
    }

    let mut events = Vec::new();
    let mut directories = Vec::new();
    let mut session_files = Vec::new();
    for session in &project.sessions {
        let built = build_session(ctx, session, SessionMode::Embedded);
        if let Some(id) = built.event["@id"].as_str() {
            push_reference(&mut root, "pcdm:hasMember", id);
        }
        events.push(built.event);
        directories.extend(built.directory);
        session_files.extend(built.files);
    }
    let sessions_ds = sessions_dataset(ctx, &mut directories).map(|mut dataset| {
        link_containment(&mut root, &mut dataset);
        dataset
    });

    let mut documents = Vec::new();
    if let Some(folder) = &project.description_folder {
        if let Some(mut built) = build_document_folder(ctx, folder, DocumentKind::Description) {
            link_containment(&mut root, &mut built.dataset);
            let contact = resolve_contact(project).reference;
            let protocol = collection_protocol(ctx, folder, &contact);
            push_reference(&mut root, "ldac:hasCollectionProtocol", DESCRIPTION_PROTOCOL_ID);
            append_reference(&mut built.dataset, "subjectOf", DESCRIPTION_PROTOCOL_ID);
            documents.push(built.dataset);
            documents.push(protocol);
            documents.extend(built.files);
        }
    }
    if let Some(folder) = &project.other_docs_folder {
        if let Some(mut built) = build_document_folder(ctx, folder, DocumentKind::Other) {
            link_containment(&mut root, &mut built.dataset);
            documents.push(built.dataset);
            documents.extend(built.files);
        }
    }

    let contributing: Vec<&Session> = project.sessions.iter().collect();
    let mut people = build_people(ctx, &contributing, true);
    stats.people = people.persons.len();
    if let Some(people_ds) = people.datasets.first_mut() {
        link_containment(&mut root, people_ds);
    }

    let mut graph = vec![root, metadata_descriptor()];
    graph.extend(project_files);
    graph.extend(events);
    graph.extend(sessions_ds);
    graph.extend(directories);
    graph.extend(session_files);
    graph.extend(people.into_entities());
    graph.extend(documents);
    graph
}

fn export_session(
    ctx: &mut ExportContext<'_>,
    session: &Session,
    stats: &mut ExportStats,
) -> Vec<Value> {
    let built = build_session(ctx, session, SessionMode::Standalone);
    let people = build_people(ctx, &[session], false);
    stats.people = people.persons.len();

    let mut graph = built.into_entities();
    graph.insert(1, metadata_descriptor());
    graph.extend(people.into_entities());
    graph
}

/// Convert an export result to a JSON-LD document
///
/// A person export has no context and becomes a bare array.
pub fn to_jsonld(result: &ExportResult) -> Value {
    match &result.context {
        Some(context) => json!({
            "@context": context,
            "@graph": result.graph
        }),
        None => Value::Array(result.graph.clone()),
    }
}

/// Serialize an export result to a JSON string
pub fn to_json_string(result: &ExportResult, pretty: bool) -> Result<String, ExportError> {
    let jsonld = to_jsonld(result);
    if pretty {
        Ok(serde_json::to_string_pretty(&jsonld)?)
    } else {
        Ok(serde_json::to_string(&jsonld)?)
    }
}
