//! Per-export state
//!
//! A fresh [`ExportContext`] is created for every export call and threaded
//! through the entity builders. Nothing survives between calls.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::languages::{LanguageNames, LanguageRegistry};
use crate::license::LicenseBuilder;
use crate::model::Project;
use crate::vocab::material_type_definitions;
use crate::vocabulary::{VocabularyCatalog, UNTITLED_PROJECT};

/// Options for an export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Value of the root `datePublished`; the latest file date when unset
    pub date_published: Option<DateTime<Utc>>,
    /// Fail when a field names a vocabulary missing from the catalog
    pub strict_vocabularies: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            date_published: None,
            strict_vocabularies: true,
        }
    }
}

/// Registries and collected satellite nodes of one export call
pub struct ExportContext<'a> {
    pub project: &'a Project,
    pub catalog: &'a VocabularyCatalog,
    pub options: &'a ExportOptions,
    pub languages: LanguageRegistry<'a>,
    pub licenses: LicenseBuilder<'a>,
    satellites: Vec<Value>,
    material_types: BTreeSet<String>,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        project: &'a Project,
        catalog: &'a VocabularyCatalog,
        names: &'a dyn LanguageNames,
        options: &'a ExportOptions,
    ) -> Self {
        Self {
            project,
            catalog,
            options,
            languages: LanguageRegistry::new(names),
            licenses: LicenseBuilder::new(project),
            satellites: Vec::new(),
            material_types: BTreeSet::new(),
        }
    }

    /// Project title as used in custom term URIs
    pub fn project_title(&self) -> &'a str {
        self.project.title().unwrap_or(UNTITLED_PROJECT)
    }

    /// Queue a node that is not part of the structural tree (places, terms, agents)
    pub fn emit(&mut self, entity: Value) {
        self.satellites.push(entity);
    }

    pub fn emit_all(&mut self, entities: impl IntoIterator<Item = Value>) {
        self.satellites.extend(entities);
    }

    pub fn has_satellite(&self, id: &str) -> bool {
        self.satellites.iter().any(|s| s["@id"] == id)
    }

    pub fn use_material_type(&mut self, term: &str) {
        self.material_types.insert(term.to_string());
    }

    /// Satellites, then used languages, licenses and material terms
    pub fn into_support_entities(self) -> Vec<Value> {
        let mut entities = self.satellites;
        entities.extend(self.languages.used_entities());
        entities.extend(self.licenses.into_entities());
        entities.extend(material_type_definitions(&self.material_types));
        entities
    }
}
