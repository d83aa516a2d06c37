//! Input model handed over by the host application
//!
//! Projects, sessions, people and document folders are all [`Folder`]s; the
//! role of each one is carried explicitly in [`FolderKind`] so the exporter
//! never has to guess it from the shape of the value.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// Which of the two project-level document folders a folder is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    Description,
    Other,
}

/// Structural role of a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FolderKind {
    Project,
    Session,
    Person,
    DocumentFolder(DocumentKind),
}

/// Special processing requested by a field's RO-Crate mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handler {
    Languages,
}

/// The `rocrate` block of a field definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocrateMapping {
    #[serde(default)]
    pub key: Option<String>,
    /// Satellite-entity template; values may contain `[v]`, `[code]`, `[languageName]`
    #[serde(default)]
    pub template: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub handler: Option<Handler>,
    #[serde(default)]
    pub array: Option<bool>,
}

/// One configured metadata field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub key: String,
    #[serde(default)]
    pub english_label: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
    #[serde(default)]
    pub omit_export: bool,
    /// Name of a vocabulary in the catalog (e.g. `genres` or `genres.json`)
    #[serde(default, alias = "vocabularyFile")]
    pub vocabulary: Option<String>,
    #[serde(default, rename = "personallyIdentifiableInformation")]
    pub pii: bool,
    #[serde(default, rename = "isAdditional")]
    pub additional: bool,
    #[serde(default)]
    pub rocrate: Option<RocrateMapping>,
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Fields whose deprecation notice says they were migrated elsewhere
    pub fn is_migrated(&self) -> bool {
        self.deprecated
            .as_deref()
            .map(|d| d.contains("migrated"))
            .unwrap_or(false)
    }

    pub fn has_language_handler(&self) -> bool {
        self.rocrate
            .as_ref()
            .and_then(|r| r.handler)
            .map(|h| h == Handler::Languages)
            .unwrap_or(false)
    }

    pub fn template(&self) -> Option<&BTreeMap<String, String>> {
        self.rocrate.as_ref().and_then(|r| r.template.as_ref())
    }

    /// `Some(true)` / `Some(false)` when the mapping says so explicitly
    pub fn array(&self) -> Option<bool> {
        self.rocrate.as_ref().and_then(|r| r.array)
    }

    /// The output property name: the mapping's key, or the field key
    pub fn property_key(&self) -> &str {
        self.rocrate
            .as_ref()
            .and_then(|r| r.key.as_deref())
            .unwrap_or(&self.key)
    }

    pub fn label(&self) -> &str {
        self.english_label.as_deref().unwrap_or(&self.key)
    }
}

/// A stored metadata value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub text: String,
    /// User-defined field, not part of the configured field set
    #[serde(default)]
    pub custom: bool,
}

/// Metadata properties of a folder, keyed by field key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    properties: BTreeMap<String, Property>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.properties.insert(
            key.into(),
            Property {
                text: text.into(),
                custom: false,
            },
        );
    }

    pub fn set_custom(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.properties.insert(
            key.into(),
            Property {
                text: text.into(),
                custom: true,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Trimmed text of a property, `None` when absent or blank
    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Like [`Metadata::text`], also treating `unspecified` as absent
    pub fn value(&self, key: &str) -> Option<&str> {
        self.text(key).filter(|t| *t != "unspecified")
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Property)> {
        self.properties.iter()
    }
}

/// A file inside a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: PathBuf,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    /// Declared per-file metadata such as `license` or `access`
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: 0,
            created: None,
            modified: None,
            properties: BTreeMap::new(),
        }
    }

    /// Describe a file on disk with a single `stat`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)?;
        let modified = meta.modified().ok().map(DateTime::<Utc>::from);
        let created = meta.created().ok().map(DateTime::<Utc>::from).or(modified);
        Ok(Self {
            path: path.to_path_buf(),
            size: meta.len(),
            created,
            modified,
            properties: BTreeMap::new(),
        })
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Metadata files the exporter itself writes are never exported
    pub fn is_crate_metadata(&self) -> bool {
        self.file_name()
            .map(|n| n.starts_with("ro-crate"))
            .unwrap_or(false)
    }
}

/// Common shape of every exported folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub kind: FolderKind,
    #[serde(default)]
    pub file_prefix: String,
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub known_fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

impl Folder {
    pub fn new(kind: FolderKind, file_prefix: impl Into<String>) -> Self {
        Self {
            kind,
            file_prefix: file_prefix.into(),
            directory: None,
            metadata: Metadata::new(),
            known_fields: vec![],
            files: vec![],
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.metadata.set(key, text);
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.known_fields.push(field);
        self
    }

    pub fn with_file(mut self, file: FileRecord) -> Self {
        self.files.push(file);
        self
    }

    pub fn knows_field(&self, key: &str) -> bool {
        self.known_fields.iter().any(|f| f.key == key)
    }

    /// Files that belong in the crate, in folder order
    pub fn exported_files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|f| !f.is_crate_metadata())
    }

    pub fn has_exported_files(&self) -> bool {
        self.exported_files().next().is_some()
    }
}

/// A (person, role) pairing recorded against a session's files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub person_reference: String,
    pub role: String,
}

impl Contribution {
    pub fn new(person_reference: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            person_reference: person_reference.into(),
            role: role.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub folder: Folder,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl Session {
    pub fn new(folder: Folder) -> Self {
        Self {
            folder,
            contributions: vec![],
        }
    }

    pub fn with_contribution(mut self, contribution: Contribution) -> Self {
        self.contributions.push(contribution);
        self
    }

    /// Recording date, when the `date` field parses
    pub fn date(&self) -> Option<NaiveDate> {
        self.folder.metadata.text("date").and_then(parse_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub folder: Folder,
}

/// Oldest age reported for a contributor
pub const MAX_AGE: i32 = 150;

impl Person {
    pub fn new(folder: Folder) -> Self {
        Self { folder }
    }

    /// Display name: the `name` field, falling back to the folder prefix
    pub fn name(&self) -> &str {
        self.folder.metadata.text_or("name", &self.folder.file_prefix)
    }

    /// Age in whole years on `date`, from the `birthYear` field
    ///
    /// Birth years that give an age outside `0..=MAX_AGE` are ignored.
    pub fn age_on(&self, date: NaiveDate) -> Option<String> {
        let birth_year: i32 = self
            .folder
            .metadata
            .text("birthYear")
            .filter(|y| *y != "?")
            .and_then(|y| y.parse().ok())?;
        let age = date.year().checked_sub(birth_year)?;
        (0..=MAX_AGE).contains(&age).then(|| age.to_string())
    }
}

/// An entry of the project's access-choice authority list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessChoice {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ldac_access_category: Option<String>,
}

impl AccessChoice {
    pub fn matches(&self, access: &str) -> bool {
        let access = access.trim();
        self.id.eq_ignore_ascii_case(access) || self.label.eq_ignore_ascii_case(access)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub folder: Folder,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub access_choices: Vec<AccessChoice>,
    #[serde(default)]
    pub description_folder: Option<Folder>,
    #[serde(default)]
    pub other_docs_folder: Option<Folder>,
}

impl Project {
    pub fn new(folder: Folder) -> Self {
        Self {
            folder,
            sessions: vec![],
            persons: vec![],
            access_choices: vec![],
            description_folder: None,
            other_docs_folder: None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.folder.metadata.text("title")
    }

    /// Find a person by display name or folder prefix, ignoring case
    pub fn find_person(&self, name: &str) -> Option<&Person> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.persons.iter().find(|p| {
            p.name().eq_ignore_ascii_case(name) || p.folder.file_prefix.eq_ignore_ascii_case(name)
        })
    }

    /// Date of the first session that has a parseable one
    pub fn first_session_date(&self) -> Option<NaiveDate> {
        self.sessions.iter().find_map(Session::date)
    }
}

/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|d| d.date_naive()))
}
