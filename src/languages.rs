//! Per-export language registry
//!
//! One `Language` node per distinct code, created on first reference, with
//! usage tracking so only languages some entity points at reach the graph.

use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::graph::reference;
use crate::id::language_id;
use crate::vocab::UND_LANGUAGE_ID;

/// Code of the undetermined language
pub const UND: &str = "und";

/// External lookup of language names by ISO 639-3 code
pub trait LanguageNames {
    fn name_for(&self, code: &str) -> Option<String>;
}

/// A fixed code -> name table
#[derive(Debug, Clone, Default)]
pub struct StaticLanguageNames {
    names: BTreeMap<String, String>,
}

impl StaticLanguageNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: &str, name: &str) -> Self {
        self.names.insert(code.to_lowercase(), name.to_string());
        self
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for StaticLanguageNames {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |names, (code, name)| names.with(code, name))
    }
}

impl LanguageNames for StaticLanguageNames {
    fn name_for(&self, code: &str) -> Option<String> {
        self.names.get(&code.to_lowercase()).cloned()
    }
}

/// Extract the code from a stored language value ("etr: Edolo" -> "etr")
pub fn language_code(value: &str) -> &str {
    value.split(':').next().unwrap_or(value).trim()
}

fn normalize(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Language nodes and their users for one export run
pub struct LanguageRegistry<'a> {
    names: &'a dyn LanguageNames,
    entities: BTreeMap<String, Value>,
    usage: BTreeMap<String, BTreeSet<String>>,
}

impl<'a> LanguageRegistry<'a> {
    pub fn new(names: &'a dyn LanguageNames) -> Self {
        Self {
            names,
            entities: BTreeMap::new(),
            usage: BTreeMap::new(),
        }
    }

    fn entity(&mut self, code: &str) -> &Value {
        let code = normalize(code);
        let names = self.names;
        self.entities.entry(code.clone()).or_insert_with(|| {
            if code == UND {
                json!({
                    "@id": UND_LANGUAGE_ID,
                    "@type": "Language",
                    "code": UND,
                    "name": "Undetermined",
                    "description": "Language marked as undetermined because no working language was specified in lameta"
                })
            } else {
                let name = names.name_for(&code).unwrap_or_else(|| code.clone());
                json!({
                    "@id": language_id(&code),
                    "@type": "Language",
                    "code": code,
                    "name": name
                })
            }
        })
    }

    /// `{"@id"}` of the node for `code`, creating the node on first use
    pub fn language_reference(&mut self, code: &str) -> Value {
        let entity = self.entity(code);
        reference(entity["@id"].as_str().unwrap_or_default())
    }

    /// Record that `entity_id` refers to `code`
    pub fn track_usage(&mut self, code: &str, entity_id: &str) {
        self.usage
            .entry(normalize(code))
            .or_default()
            .insert(entity_id.to_string());
    }

    /// Reference to `code` on behalf of `entity_id`, tracked
    pub fn reference_for(&mut self, code: &str, entity_id: &str) -> Value {
        let reference = self.language_reference(code);
        self.track_usage(code, entity_id);
        reference
    }

    /// Reference to the shared undetermined-language node, tracked
    pub fn undetermined(&mut self, entity_id: &str) -> Value {
        self.reference_for(UND, entity_id)
    }

    /// Display name of a code, without creating a node
    pub fn name_of(&self, code: &str) -> String {
        let code = normalize(code);
        if code == UND {
            return "Undetermined".to_string();
        }
        self.names.name_for(&code).unwrap_or(code)
    }

    pub fn usage_count(&self, code: &str) -> usize {
        self.usage.get(&normalize(code)).map(|s| s.len()).unwrap_or(0)
    }

    /// Language nodes some entity refers to, ordered by code
    pub fn used_entities(&self) -> Vec<Value> {
        self.entities
            .iter()
            .filter(|(code, _)| self.usage_count(code) > 0)
            .map(|(_, entity)| entity.clone())
            .collect()
    }

    /// Nodes that were created but never referenced
    pub fn unused_entities(&self) -> Vec<Value> {
        self.entities
            .iter()
            .filter(|(code, _)| self.usage_count(code) == 0)
            .map(|(_, entity)| entity.clone())
            .collect()
    }
}
