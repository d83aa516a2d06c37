//! Controlled-vocabulary term mapping
//!
//! Field values drawn from an open vocabulary (genres and the like) become
//! `DefinedTerm` references: canonical `ldac:` terms when the vocabulary maps
//! them onto the LDAC profile, project-scoped `tag:` URIs otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::debug;

use crate::error::ExportError;
use crate::graph::reference;
use crate::id::sanitize_for_iri;
use crate::vocab::LINGUISTIC_GENRE_TERMS;

/// Id shared by every placeholder value ("unknown", "unspecified", ...)
pub const UNKNOWN_TERM_ID: &str = "tag:lameta/unknown";

/// Title used in custom URIs when the project has none
pub const UNTITLED_PROJECT: &str = "unknown-project";

const PLACEHOLDER_TERMS: [&str; 6] = ["unknown", "unspecified", "<unknown>", "", "null", "undefined"];

/// LDAC linguistic genre terms: (term, label, description)
const LDAC_GENRES: &[(&str, &str, &str)] = &[
    ("ldac:Dialogue", "Dialogue", "An interactive discourse with two or more participants. Examples of dialogues include conversations, interviews, correspondence, consultations, greetings and leave-takings."),
    ("ldac:Interview", "Interview", "A structured conversation where one participant asks questions and another provides answers."),
    ("ldac:Drama", "Drama", "A planned, creative, rendition of discourse involving two or more participants."),
    ("ldac:Narrative", "Narrative", "A monologic discourse which represents temporally organized events."),
    ("ldac:Procedural", "Procedural", "An explanation or description of a method, process, or situation having ordered steps."),
    ("ldac:Report", "Report", "A factual account of some event or circumstance."),
    ("ldac:Oratory", "Oratory", "Public speaking, or speaking eloquently according to rules or conventions."),
    ("ldac:Formulaic", "Formulaic", "A ritually or conventionally structured discourse."),
    ("ldac:Ludic", "Ludic", "Language whose primary function is to be part of play, or a style of speech that involves a creative manipulation of the structures of the language."),
    ("ldac:Informational", "Informational", "Discourse whose primary purpose is to convey information."),
];

/// lameta genre ids bundled with the crate: (id, label, LDAC term)
const BUILTIN_GENRES: &[(&str, &str, &str)] = &[
    ("dialog", "Dialog", "ldac:Dialogue"),
    ("conversation", "Conversation", "ldac:Dialogue"),
    ("interview", "Interview", "ldac:Interview"),
    ("drama", "Drama", "ldac:Drama"),
    ("narrative", "Narrative", "ldac:Narrative"),
    ("personal_narrative", "Personal Narrative", "ldac:Narrative"),
    ("folktale", "Folktale", "ldac:Narrative"),
    ("oral_history", "Oral History", "ldac:Narrative"),
    ("mythology", "Mythology", "ldac:Narrative"),
    ("procedural_discourse", "Procedural Discourse", "ldac:Procedural"),
    ("procedural_text", "Procedural Text", "ldac:Procedural"),
    ("report", "Report", "ldac:Report"),
    ("oratory", "Oratory", "ldac:Oratory"),
    ("formulaic_discourse", "Formulaic Discourse", "ldac:Formulaic"),
    ("ritual", "Ritual", "ldac:Formulaic"),
    ("language_play", "Language Play", "ldac:Ludic"),
    ("ludic", "Ludic", "ldac:Ludic"),
    ("verbal_art", "Verbal Art", "ldac:Ludic"),
    ("singing", "Singing", "ldac:Ludic"),
    ("song", "Song", "ldac:Ludic"),
    ("description", "Description", "ldac:Informational"),
];

/// A link from a vocabulary entry to a term of another vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermLink {
    pub vocabulary: String,
    pub term: String,
}

/// One entry of a vocabulary file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub mapping: Vec<TermLink>,
}

impl VocabularyEntry {
    fn matches(&self, term: &str) -> bool {
        self.id.eq_ignore_ascii_case(term) || self.label.eq_ignore_ascii_case(term)
    }

    /// The `ldac:` term this entry maps onto, if any
    pub fn ldac_term(&self) -> Option<String> {
        self.mapping
            .iter()
            .find(|m| m.vocabulary.eq_ignore_ascii_case("LDAC"))
            .map(|m| {
                if m.term.starts_with("ldac:") {
                    m.term.clone()
                } else {
                    format!("ldac:{}", m.term)
                }
            })
    }
}

/// A named vocabulary table
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    pub name: String,
    /// Singular noun for one term ("genre"), used in custom URIs
    pub kind: String,
    pub entries: Vec<VocabularyEntry>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Vocabulary {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, entries: Vec<VocabularyEntry>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            entries,
        }
    }

    /// The lameta genre list mapped onto LDAC linguistic genres
    pub fn builtin_genres() -> Self {
        let entries = BUILTIN_GENRES
            .iter()
            .map(|(id, label, term)| VocabularyEntry {
                id: id.to_string(),
                label: label.to_string(),
                definition: ldac_genre(term).map(|(_, _, d)| d.to_string()).unwrap_or_default(),
                examples: vec![],
                mapping: vec![TermLink {
                    vocabulary: "LDAC".to_string(),
                    term: term.to_string(),
                }],
            })
            .collect();
        Self::new("genres", "genre", entries)
    }

    /// Read a JSON array of entries; the table is named after the file stem
    pub fn load_file(path: &Path) -> Result<Self, ExportError> {
        let load_error = |reason: String| ExportError::VocabularyLoad {
            path: path.display().to_string(),
            reason,
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ExportError::InvalidPath(path.to_path_buf()))?
            .to_string();
        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let entries: Vec<VocabularyEntry> =
            serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
        let kind = name.strip_suffix('s').unwrap_or(&name).to_string();
        Ok(Self::new(name, kind, entries))
    }

    pub fn find(&self, term: &str) -> Option<&VocabularyEntry> {
        self.entries
            .iter()
            .find(|e| e.id == term)
            .or_else(|| self.entries.iter().find(|e| e.matches(term)))
    }

    /// Set that holds this vocabulary's LDAC terms: (id, name)
    pub fn ldac_term_set(&self) -> (String, String) {
        if self.kind == "genre" {
            (LINGUISTIC_GENRE_TERMS.to_string(), "Linguistic Genre Terms".to_string())
        } else {
            let kind = capitalize(&self.kind);
            (format!("ldac:{}Terms", kind), format!("{} Terms", kind))
        }
    }
}

/// Set that holds project-specific terms of a kind: (id, name)
pub fn custom_term_set(kind: &str) -> (String, String) {
    let kind = capitalize(kind);
    (format!("#Custom{}Terms", kind), format!("Custom Project {}s", kind))
}

fn ldac_genre(term: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    LDAC_GENRES.iter().find(|(id, _, _)| *id == term)
}

/// Vocabularies available to one export, by name
#[derive(Debug, Clone, Default)]
pub struct VocabularyCatalog {
    vocabularies: BTreeMap<String, Vocabulary>,
}

impl VocabularyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the bundled `genres` vocabulary
    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(Vocabulary::builtin_genres());
        catalog
    }

    pub fn insert(&mut self, vocabulary: Vocabulary) {
        self.vocabularies.insert(vocabulary.name.clone(), vocabulary);
    }

    /// Add every `*.json` vocabulary in `dir`, replacing same-named tables
    pub fn load_dir(mut self, dir: &Path) -> Result<Self, ExportError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();
        for path in paths {
            let vocabulary = Vocabulary::load_file(&path)?;
            debug!(
                "Loaded vocabulary '{}' with {} entries",
                vocabulary.name,
                vocabulary.entries.len()
            );
            self.insert(vocabulary);
        }
        Ok(self)
    }

    /// Look up by name; a `.json` suffix (as in field configuration) is ignored
    pub fn get(&self, name: &str) -> Option<&Vocabulary> {
        let name = name.strip_suffix(".json").unwrap_or(name);
        self.vocabularies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// References and node definitions produced by mapping one field value
#[derive(Debug, Default)]
pub struct MappedTerms {
    /// One reference per input term, duplicates kept
    pub references: Vec<Value>,
    /// DefinedTerm and DefinedTermSet nodes, each id once
    pub entities: Vec<Value>,
}

/// Map a comma-separated value through a vocabulary
///
/// `vocabulary` is `None` when the table could not be found; every term then
/// becomes a custom term of `fallback_kind`.
pub fn map_terms(
    raw: &str,
    vocabulary: Option<&Vocabulary>,
    fallback_kind: &str,
    project_title: &str,
) -> MappedTerms {
    let kind = vocabulary.map(|v| v.kind.as_str()).unwrap_or(fallback_kind);
    let (custom_set_id, custom_set_name) = custom_term_set(kind);
    let mut mapped = MappedTerms::default();
    let mut seen = BTreeSet::new();
    let mut used_sets: BTreeMap<String, String> = BTreeMap::new();

    for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let entry = vocabulary.and_then(|v| v.find(term));
        let ldac = entry.and_then(VocabularyEntry::ldac_term);

        let definition = match (entry, ldac) {
            (Some(entry), Some(ldac_id)) => {
                let (set_id, set_name) = vocabulary
                    .map(Vocabulary::ldac_term_set)
                    .unwrap_or_else(|| (LINGUISTIC_GENRE_TERMS.to_string(), "Linguistic Genre Terms".to_string()));
                let (name, description) = match ldac_genre(&ldac_id) {
                    Some((_, label, description)) => (label.to_string(), description.to_string()),
                    None => (entry.label.clone(), entry.definition.clone()),
                };
                used_sets.insert(set_id.clone(), set_name);
                json!({
                    "@id": ldac_id,
                    "@type": "DefinedTerm",
                    "name": name,
                    "description": description,
                    "inDefinedTermSet": { "@id": set_id }
                })
            }
            (Some(entry), None) => {
                used_sets.insert(custom_set_id.clone(), custom_set_name.clone());
                let description = if entry.definition.is_empty() {
                    format!("Custom term: {}", entry.label)
                } else {
                    entry.definition.clone()
                };
                json!({
                    "@id": custom_term_id(&entry.label, kind, project_title),
                    "@type": "DefinedTerm",
                    "name": entry.label,
                    "description": description,
                    "inDefinedTermSet": { "@id": custom_set_id }
                })
            }
            (None, _) => {
                used_sets.insert(custom_set_id.clone(), custom_set_name.clone());
                let name = if is_placeholder(term) { "Unknown" } else { term };
                json!({
                    "@id": custom_term_id(term, kind, project_title),
                    "@type": "DefinedTerm",
                    "name": name,
                    "description": format!("Custom term: {}", name),
                    "inDefinedTermSet": { "@id": custom_set_id }
                })
            }
        };

        let id = definition["@id"].as_str().unwrap_or_default().to_string();
        mapped.references.push(reference(&id));
        if seen.insert(id) {
            mapped.entities.push(definition);
        }
    }

    for (set_id, set_name) in used_sets {
        mapped.entities.push(json!({
            "@id": set_id,
            "@type": "DefinedTermSet",
            "name": set_name
        }));
    }

    mapped
}

fn is_placeholder(term: &str) -> bool {
    let normalized = term.trim().to_lowercase();
    PLACEHOLDER_TERMS.contains(&normalized.as_str())
}

/// `tag:lameta,<Title>:<kind>/<term>`, or the shared unknown id for placeholders
pub fn custom_term_id(term: &str, kind: &str, project_title: &str) -> String {
    if is_placeholder(term) {
        return UNKNOWN_TERM_ID.to_string();
    }
    let title = if project_title.trim().is_empty() {
        UNTITLED_PROJECT
    } else {
        project_title.trim()
    };
    format!(
        "tag:lameta,{}:{}/{}",
        sanitize_for_iri(title),
        kind,
        sanitize_for_iri(term)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[Value]) -> Vec<&str> {
        values.iter().filter_map(|v| v["@id"].as_str()).collect()
    }

    #[test]
    fn test_builtin_genre_maps_to_ldac() {
        let genres = Vocabulary::builtin_genres();
        let mapped = map_terms("Dialog", Some(&genres), "genre", "Edolo");

        assert_eq!(mapped.references, vec![json!({"@id": "ldac:Dialogue"})]);
        assert_eq!(ids(&mapped.entities), vec!["ldac:Dialogue", LINGUISTIC_GENRE_TERMS]);
        assert_eq!(mapped.entities[0]["name"], "Dialogue");
        assert_eq!(
            mapped.entities[0]["inDefinedTermSet"],
            json!({"@id": LINGUISTIC_GENRE_TERMS})
        );
    }

    #[test]
    fn test_duplicate_terms_share_one_definition() {
        let genres = Vocabulary::builtin_genres();
        let mapped = map_terms("dialog,dialog", Some(&genres), "genre", "Edolo");

        assert_eq!(mapped.references.len(), 2);
        let dialogue_defs = mapped
            .entities
            .iter()
            .filter(|e| e["@id"] == "ldac:Dialogue")
            .count();
        assert_eq!(dialogue_defs, 1);
    }

    #[test]
    fn test_unknown_term_becomes_custom() {
        let genres = Vocabulary::builtin_genres();
        let mapped = map_terms("dialog, Fish Talk", Some(&genres), "genre", "Edolo Texts");

        assert_eq!(
            mapped.references[1],
            json!({"@id": "tag:lameta,Edolo%20Texts:genre/Fish%20Talk"})
        );
        let custom = &mapped.entities[1];
        assert_eq!(custom["name"], "Fish Talk");
        assert_eq!(custom["description"], "Custom term: Fish Talk");
        assert_eq!(custom["inDefinedTermSet"], json!({"@id": "#CustomGenreTerms"}));
        assert!(ids(&mapped.entities).contains(&"#CustomGenreTerms"));
        assert!(ids(&mapped.entities).contains(&LINGUISTIC_GENRE_TERMS));
    }

    #[test]
    fn test_placeholder_terms_collapse() {
        let mapped = map_terms("<Unknown>", None, "genre", "Edolo");
        assert_eq!(mapped.references[0], json!({"@id": UNKNOWN_TERM_ID}));
        assert_eq!(mapped.entities[0]["name"], "Unknown");
    }

    #[test]
    fn test_entry_without_ldac_mapping() {
        let vocabulary = Vocabulary::new(
            "genres",
            "genre",
            vec![VocabularyEntry {
                id: "word_list".into(),
                label: "Word List".into(),
                definition: "A list of words.".into(),
                examples: vec![],
                mapping: vec![],
            }],
        );
        let mapped = map_terms("word list", Some(&vocabulary), "genre", "P");
        assert_eq!(mapped.references[0], json!({"@id": "tag:lameta,P:genre/Word%20List"}));
        assert_eq!(mapped.entities[0]["description"], "A list of words.");
    }

    #[test]
    fn test_missing_vocabulary_uses_fallback_kind() {
        let mapped = map_terms("dialog", None, "genre", "");
        assert_eq!(
            mapped.references[0],
            json!({"@id": "tag:lameta,unknown-project:genre/dialog"})
        );
    }

    #[test]
    fn test_catalog_lookup_ignores_json_suffix() {
        let catalog = VocabularyCatalog::with_builtin();
        assert!(catalog.contains("genres"));
        assert!(catalog.contains("genres.json"));
        assert!(!catalog.contains("roles"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("topics.json"),
            r#"[{"id": "kinship", "label": "Kinship", "definition": "Family terms",
                 "mapping": [{"vocabulary": "LDAC", "term": "Kinship"}]}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = VocabularyCatalog::with_builtin().load_dir(dir.path()).unwrap();
        let topics = catalog.get("topics.json").unwrap();
        assert_eq!(topics.kind, "topic");
        assert_eq!(topics.entries[0].ldac_term().as_deref(), Some("ldac:Kinship"));
        assert_eq!(topics.ldac_term_set().0, "ldac:TopicTerms");
        assert!(catalog.contains("genres"));
    }

    #[test]
    fn test_load_dir_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let result = VocabularyCatalog::new().load_dir(dir.path());
        assert!(matches!(result, Err(ExportError::VocabularyLoad { .. })));
    }
}
