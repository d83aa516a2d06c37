//! Field handler pipeline
//!
//! Every configured field of a folder is classified once into a [`FieldKind`]
//! and handed to the matching handler, which writes properties onto the
//! entity being built and queues any satellite nodes on the context.

use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::context::ExportContext;
use crate::graph::{extract_id, push_reference, reference, set_default, set_property};
use crate::id::{place_id, sanitize_for_iri};
use crate::languages::{language_code, LanguageRegistry};
use crate::model::{FieldDefinition, Folder, FolderKind};
use crate::vocab::ROOT_ENTITY_ID;
use crate::vocabulary::map_terms;

/// Raw fields that are exported as structured agents instead
const AGENT_FIELDS: [&str; 2] = ["archiveConfigurationName", "depositor"];

/// Plain fields with no LDAC counterpart, dropped without notice
const UNMAPPED_FIELDS: [&str; 8] = [
    "status",
    "topic",
    "id",
    "locationRegion",
    "locationCountry",
    "locationContinent",
    "country",
    "continent",
];

/// Companion fields whose values describe a `location` Place
const LOCATION_PARTS: [&str; 3] = ["locationRegion", "locationCountry", "locationContinent"];

/// How a configured field is turned into JSON-LD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Language references, with the `und` fallback
    Language,
    /// Terms of a controlled vocabulary
    Vocabulary,
    /// The session `location`, as a described Place
    Place,
    /// A satellite node filled from the mapping's template
    Template,
    /// A literal under the mapping's property name
    KeyOnly,
    /// A literal with no mapping at all
    Plain,
}

impl FieldKind {
    pub fn of(field: &FieldDefinition) -> Self {
        if field.has_language_handler() || is_language_template(field) {
            return FieldKind::Language;
        }
        if field.vocabulary.is_some() {
            return FieldKind::Vocabulary;
        }
        match (field.rocrate.as_ref(), field.template()) {
            (_, Some(template)) => {
                let is_place = template.get("@type").map(String::as_str) == Some("Place");
                if is_place && field.key == "location" {
                    FieldKind::Place
                } else {
                    FieldKind::Template
                }
            }
            (Some(_), None) => FieldKind::KeyOnly,
            (None, None) => FieldKind::Plain,
        }
    }
}

fn is_language_template(field: &FieldDefinition) -> bool {
    field.field_type.as_deref() == Some("languageChoices")
        && field
            .template()
            .and_then(|t| t.get("@id"))
            .map(|id| id.contains("#language_"))
            .unwrap_or(false)
}

/// Values of a field on a folder; language lists are split on `;`
pub fn field_values<'f>(folder: &'f Folder, field: &FieldDefinition) -> Vec<&'f str> {
    if field.omit_export {
        return vec![];
    }

    let splits_languages = field.has_language_handler()
        || (field.template().is_some() && field.field_type.as_deref() == Some("languageChoices"));

    match folder.metadata.text(&field.key) {
        Some(text) if splits_languages => text
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(text) => vec![text],
        None => vec![],
    }
}

/// Whether a field is left out of the export entirely
pub fn should_skip(field: &FieldDefinition, folder: &Folder, values: &[&str]) -> bool {
    if field.is_migrated() || AGENT_FIELDS.contains(&field.key.as_str()) {
        return true;
    }

    let empty = values.first().map(|v| *v == "unspecified").unwrap_or(true);
    if empty && !field.has_language_handler() {
        return true;
    }

    folder.kind == FolderKind::Person && field.pii
}

/// Run every known field of `folder` through the pipeline, then its custom fields
pub fn apply_fields(ctx: &mut ExportContext<'_>, folder: &Folder, entity: &mut Value) {
    for field in &folder.known_fields {
        let values = field_values(folder, field);
        if should_skip(field, folder, &values) {
            continue;
        }

        let property = field.property_key();
        match FieldKind::of(field) {
            FieldKind::Language => handle_language(ctx, field, &values, property, entity),
            FieldKind::Vocabulary => handle_vocabulary(ctx, field, &values, property, entity),
            FieldKind::Place => handle_place(ctx, folder, field, &values, property, entity),
            FieldKind::Template => handle_template(ctx, field, &values, property, entity),
            FieldKind::KeyOnly => set_property(entity, property, Value::from(values[0])),
            FieldKind::Plain => handle_plain(field, &values, property, entity),
        }
    }

    if folder.kind != FolderKind::Person {
        apply_custom_fields(folder, entity);
    }
}

/// Run only the language fields of `folder`
pub fn apply_language_fields(ctx: &mut ExportContext<'_>, folder: &Folder, entity: &mut Value) {
    for field in &folder.known_fields {
        if FieldKind::of(field) != FieldKind::Language {
            continue;
        }
        let values = field_values(folder, field);
        if !should_skip(field, folder, &values) {
            handle_language(ctx, field, &values, field.property_key(), entity);
        }
    }
}

fn handle_language(
    ctx: &mut ExportContext<'_>,
    field: &FieldDefinition,
    values: &[&str],
    property: &str,
    entity: &mut Value,
) {
    let owner = extract_id(entity).unwrap_or(ROOT_ENTITY_ID).to_string();
    let mut references: Vec<Value> = values
        .iter()
        .map(|value| language_code(value))
        .filter(|code| !code.is_empty() && !code.eq_ignore_ascii_case("unspecified"))
        .map(|code| ctx.languages.reference_for(code, &owner))
        .collect();

    if references.is_empty() {
        references.push(ctx.languages.undetermined(&owner));
    }

    let value = if field.array() == Some(false) {
        references.swap_remove(0)
    } else {
        Value::Array(references)
    };
    set_property(entity, property, value);
}

/// "genres.json" -> "genre"
fn kind_from_vocabulary_name(name: &str) -> String {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    stem.strip_suffix('s').unwrap_or(stem).to_string()
}

fn handle_vocabulary(
    ctx: &mut ExportContext<'_>,
    field: &FieldDefinition,
    values: &[&str],
    property: &str,
    entity: &mut Value,
) {
    let name = field.vocabulary.as_deref().unwrap_or_default();
    let vocabulary = ctx.catalog.get(name);
    if vocabulary.is_none() {
        warn!(
            "Vocabulary '{}' of field '{}' is not available; exporting its values as custom terms",
            name, field.key
        );
    }

    let mapped = map_terms(
        values[0],
        vocabulary,
        &kind_from_vocabulary_name(name),
        ctx.project_title(),
    );
    if !mapped.references.is_empty() {
        set_property(entity, property, Value::Array(mapped.references));
    }
    ctx.emit_all(mapped.entities);
}

fn handle_place(
    ctx: &mut ExportContext<'_>,
    folder: &Folder,
    field: &FieldDefinition,
    values: &[&str],
    property: &str,
    entity: &mut Value,
) {
    let Some(template) = field.template() else {
        return;
    };

    let parts: Vec<&str> = LOCATION_PARTS
        .iter()
        .filter_map(|key| folder.metadata.value(key))
        .collect();

    for value in values {
        let mut place = fill_template(template, value, &ctx.languages);
        set_property(&mut place, "@id", Value::from(place_id(value)));
        if !parts.is_empty() {
            set_property(
                &mut place,
                "description",
                Value::from(format!("Located in {}", parts.join(", "))),
            );
        }
        link_satellite(ctx, field, place, property, entity);
    }
}

fn handle_template(
    ctx: &mut ExportContext<'_>,
    field: &FieldDefinition,
    values: &[&str],
    property: &str,
    entity: &mut Value,
) {
    let Some(template) = field.template() else {
        return;
    };
    for value in values {
        let node = fill_template(template, value, &ctx.languages);
        link_satellite(ctx, field, node, property, entity);
    }
}

fn link_satellite(
    ctx: &mut ExportContext<'_>,
    field: &FieldDefinition,
    node: Value,
    property: &str,
    entity: &mut Value,
) {
    let Some(id) = extract_id(&node).map(String::from) else {
        return;
    };
    if field.array() == Some(true) {
        push_reference(entity, property, &id);
    } else {
        set_property(entity, property, reference(&id));
    }
    ctx.emit(node);
}

fn handle_plain(field: &FieldDefinition, values: &[&str], property: &str, entity: &mut Value) {
    let value = values[0];
    match field.key.as_str() {
        // access is expressed through the license; the root sets description itself
        "access" | "collectionDescription" => {}
        "title" if entity.get("name").and_then(Value::as_str) == Some(value) => {}
        key if UNMAPPED_FIELDS.contains(&key) => {}
        _ if field.additional => {
            warn!(
                "Skipping additional field '{}' in RO-Crate export: no rocrate definition",
                field.key
            );
        }
        "date" => set_property(entity, "dateCreated", Value::from(value)),
        _ => set_property(entity, property, Value::from(value)),
    }
}

/// User-defined fields, exported verbatim under their own key
fn apply_custom_fields(folder: &Folder, entity: &mut Value) {
    for (key, property) in folder.metadata.iter() {
        if !property.custom || folder.knows_field(key) || AGENT_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let text = property.text.trim();
        if !text.is_empty() && text != "unspecified" {
            set_default(entity, key, Value::from(text));
        }
    }
}

/// `#language_<code>` with characters unsafe in a fragment replaced by `_`
fn language_fragment(code: &str) -> String {
    if code.starts_with("#language_") {
        return code.to_string();
    }
    let safe: String = code
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("#language_{}", safe)
}

/// Fill a field template with one value
///
/// `[v]` is the value (percent-encoded inside `@id`, reduced to the language
/// code when the `@id` is a language fragment), `[code]` the language
/// fragment, and `[languageName]` the display name of the code.
pub fn fill_template(
    template: &BTreeMap<String, String>,
    value: &str,
    languages: &LanguageRegistry<'_>,
) -> Value {
    let code = language_code(value);
    let mut node = Map::new();

    for (key, pattern) in template {
        let mut filled = pattern.clone();
        if filled.contains("[v]") {
            let replacement = match key.as_str() {
                "@id" if filled.contains("#language_") => code.to_string(),
                "@id" => sanitize_for_iri(value),
                _ => value.to_string(),
            };
            filled = filled.replace("[v]", &replacement);
        }
        if filled.contains("[code]") {
            filled = filled.replace("[code]", &language_fragment(code));
        }
        if filled.contains("[languageName]") {
            filled = filled.replace("[languageName]", &languages.name_of(code));
        }
        node.insert(key.clone(), Value::String(filled));
    }

    Value::Object(node)
}
