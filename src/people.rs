//! Person entities
//!
//! Contributors named in sessions become Person nodes. A contributor with a
//! person folder keeps only the LDAC-safe parts of its metadata; one without
//! becomes a stub. Person files hang off a per-person Dataset under `People/`
//! because a Person cannot carry `hasPart`.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::context::ExportContext;
use crate::fields::apply_language_fields;
use crate::files::build_folder_files;
use crate::graph::{append_reference, extract_id, link_containment, reference, set_property};
use crate::id::{person_files_dataset_id, person_id, unresolved_contributor_id};
use crate::license::LicenseFallback;
use crate::media::MediaKind;
use crate::model::{Person, Project, Session};

pub const PEOPLE_DATASET_ID: &str = "People/";

/// Person fields copied as they are
const LDAC_PERSON_FIELDS: [&str; 2] = ["name", "gender"];

/// Person fields folded into the description
const DESCRIBED_PERSON_FIELDS: [&str; 2] = ["education", "primaryOccupation"];

/// `@id` of a contributor: the person folder when one matches, a stub otherwise
pub fn contributor_id(project: &Project, name: &str) -> String {
    match project.find_person(name) {
        Some(person) => person_id(&person.folder.file_prefix),
        None => unresolved_contributor_id(name.trim()),
    }
}

/// Person node restricted to LDAC-safe properties
///
/// `name` and `gender` are kept, education and occupation are appended to
/// the description, and `ldac:age` is derived from `birthYear` at `date`.
/// Personal and custom fields never appear.
pub fn ldac_person_entity(person: &Person, date: Option<NaiveDate>) -> Value {
    let metadata = &person.folder.metadata;
    let mut entity = json!({
        "@id": person_id(&person.folder.file_prefix),
        "@type": "Person",
        "name": person.name()
    });

    if let Some(age) = date.and_then(|d| person.age_on(d)) {
        set_property(&mut entity, "ldac:age", Value::from(age));
    }

    let mut description: Vec<String> = metadata
        .text("description")
        .map(|d| vec![d.to_string()])
        .unwrap_or_default();

    for field in &person.folder.known_fields {
        if field.is_migrated() || field.pii {
            continue;
        }
        let Some(value) = metadata.value(&field.key) else {
            continue;
        };
        if LDAC_PERSON_FIELDS.contains(&field.key.as_str()) {
            set_property(&mut entity, &field.key, Value::from(value));
        } else if DESCRIBED_PERSON_FIELDS.contains(&field.key.as_str()) {
            description.push(format!("{}: {}.", field.label(), value));
        }
    }

    if !description.is_empty() {
        set_property(&mut entity, "description", Value::from(description.join(" ")));
    }
    entity
}

/// Stub for a contributor with no person folder
pub fn unresolved_person_entity(name: &str) -> Value {
    let name = name.trim();
    json!({
        "@id": unresolved_contributor_id(name),
        "@type": "Person",
        "name": name,
        "description": "No matching Person record was found for this contributor in the lameta project."
    })
}

/// Attach a person's file nodes through `image` (photos) or `subjectOf`, with `about` back
fn attach_person_files(
    ctx: &mut ExportContext<'_>,
    person: &Person,
    entity: &mut Value,
) -> Vec<Value> {
    let person_ref = extract_id(entity).unwrap_or_default().to_string();
    build_folder_files(ctx, &person.folder, LicenseFallback::Collection)
        .into_iter()
        .map(|built| {
            let key = if built.kind == MediaKind::Image { "image" } else { "subjectOf" };
            append_reference(entity, key, built.id());
            let mut file = built.entity;
            set_property(&mut file, "about", reference(&person_ref));
            file
        })
        .collect()
}

/// Person nodes, their file nodes, and the `People/` hierarchy for a project
#[derive(Debug, Default)]
pub struct PeopleEntities {
    pub persons: Vec<Value>,
    pub files: Vec<Value>,
    /// `People/` followed by the per-person files Datasets; empty when no person has files
    pub datasets: Vec<Value>,
}

impl PeopleEntities {
    pub fn people_dataset(&self) -> Option<&Value> {
        self.datasets.first()
    }

    pub fn into_entities(self) -> Vec<Value> {
        let mut entities = self.persons;
        entities.extend(self.files);
        entities.extend(self.datasets);
        entities
    }
}

/// Build every contributor of `sessions`, in first-seen order
///
/// The age of a person is taken at the first dated session they contribute
/// to, falling back to the first dated session of the project.
pub fn build_people(
    ctx: &mut ExportContext<'_>,
    sessions: &[&Session],
    with_files: bool,
) -> PeopleEntities {
    let project = ctx.project;
    let fallback_date = project.first_session_date();
    let mut seen = BTreeSet::new();
    let mut people = PeopleEntities::default();
    let mut person_datasets: Vec<Value> = Vec::new();

    for session in sessions {
        for contribution in &session.contributions {
            let name = contribution.person_reference.trim();
            if name.is_empty() || !seen.insert(contributor_id(project, name)) {
                continue;
            }

            let Some(person) = project.find_person(name) else {
                people.persons.push(unresolved_person_entity(name));
                continue;
            };

            let date = contributor_date(sessions, project, name).or(fallback_date);
            let mut entity = ldac_person_entity(person, date);

            if with_files && person.folder.has_exported_files() {
                let mut files = attach_person_files(ctx, person, &mut entity);
                let prefix = &person.folder.file_prefix;
                let dataset_id = person_files_dataset_id(prefix);
                let mut dataset = json!({
                    "@id": dataset_id,
                    "@type": "Dataset",
                    "name": format!("{} files", prefix),
                    "description": format!("Files associated with {}.", prefix),
                    "about": reference(extract_id(&entity).unwrap_or_default())
                });
                for file in files.iter_mut() {
                    link_containment(&mut dataset, file);
                }
                let license = ctx.licenses.collection_license_reference();
                set_property(&mut dataset, "license", license);
                append_reference(&mut entity, "subjectOf", &dataset_id);

                people.files.extend(files);
                person_datasets.push(dataset);
            }

            people.persons.push(entity);
        }
    }

    if !person_datasets.is_empty() {
        person_datasets.sort_by(|a, b| a["@id"].as_str().cmp(&b["@id"].as_str()));
        let mut people_dataset = json!({
            "@id": PEOPLE_DATASET_ID,
            "@type": "Dataset",
            "name": "People",
            "description": "Directory of people associated with this collection."
        });
        for dataset in person_datasets.iter_mut() {
            link_containment(&mut people_dataset, dataset);
        }
        let license = ctx.licenses.collection_license_reference();
        set_property(&mut people_dataset, "license", license);

        people.datasets.push(people_dataset);
        people.datasets.extend(person_datasets);
    }

    people
}

/// Date of the first dated session `name` contributes to
fn contributor_date(sessions: &[&Session], project: &Project, name: &str) -> Option<NaiveDate> {
    let id = contributor_id(project, name);
    sessions
        .iter()
        .filter(|s| {
            s.contributions
                .iter()
                .any(|c| contributor_id(project, &c.person_reference) == id)
        })
        .find_map(|s| s.date())
}

/// Entries for exporting one person on its own: the person, its files, then
/// the languages and licenses they reference
pub fn build_person_export(ctx: &mut ExportContext<'_>, person: &Person) -> Vec<Value> {
    let date = ctx.project.first_session_date();
    let mut entity = ldac_person_entity(person, date);
    apply_language_fields(ctx, &person.folder, &mut entity);

    let owner = extract_id(&entity).unwrap_or_default().to_string();
    if entity.get("inLanguage").map(is_empty_value).unwrap_or(true) {
        let undetermined = ctx.languages.undetermined(&owner);
        set_property(&mut entity, "inLanguage", undetermined);
    }

    let files = attach_person_files(ctx, person, &mut entity);
    let mut entries = vec![entity];
    entries.extend(files);
    entries
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
