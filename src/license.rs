//! License normalization
//!
//! Archive-specific access labels ("F: Free to All", "Strategic partners")
//! become one `ldac:DataReuseLicense` per (archive, access) pair, with the id
//! `#license-<archive>-<access>`. Every file gets exactly one license, decided
//! the first time the file is seen.

use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

use url::Url;

use crate::graph::reference;
use crate::id::license_slug;
use crate::model::{AccessChoice, FileRecord, Project, Session};
use crate::vocab::{
    access_type_definitions, AUTHORIZED_ACCESS, DATA_REUSE_LICENSE, LDAC_NS, OPEN_ACCESS,
};

pub const COLLECTION_LICENSE_ID: &str = "#collection-license";

/// Access label used when nothing more specific is recorded
pub const DEFAULT_ACCESS: &str = "public";

/// Where a file's license comes from when the file declares none
#[derive(Debug, Clone, Copy)]
pub enum LicenseFallback<'s> {
    /// The access level of the session holding the file
    Session(&'s Session),
    /// The collection-wide license
    Collection,
}

fn sanitize_access(access: Option<&str>) -> Option<&str> {
    access
        .map(str::trim)
        .filter(|a| !a.is_empty() && *a != "unspecified")
}

/// "F: Free to All" -> "F"
fn access_key(access: &str) -> &str {
    match access.split_once(':') {
        Some((key, _)) => key.trim(),
        None => access,
    }
}

/// A license given as a web address, e.g. a Creative Commons deed
fn is_license_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// Accepts "OpenAccess", "ldac:OpenAccess" or the full term IRI
fn compact_category(category: &str) -> String {
    let category = category.trim();
    if category.starts_with("ldac:") {
        category.to_string()
    } else if let Some(local) = category.strip_prefix(LDAC_NS) {
        format!("ldac:{}", local)
    } else {
        format!("ldac:{}", category)
    }
}

/// Builds and deduplicates the licenses of one export run
pub struct LicenseBuilder<'a> {
    archive: Option<String>,
    choices: &'a [AccessChoice],
    licenses: BTreeMap<String, Value>,
    file_licenses: BTreeMap<String, String>,
    collection_license_used: bool,
}

impl<'a> LicenseBuilder<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self {
            archive: project
                .folder
                .metadata
                .text("archiveConfigurationName")
                .map(String::from),
            choices: &project.access_choices,
            licenses: BTreeMap::new(),
            file_licenses: BTreeMap::new(),
            collection_license_used: false,
        }
    }

    fn archive_display(&self) -> &str {
        self.archive.as_deref().unwrap_or("current archive")
    }

    fn find_choice(&self, access: &str) -> Option<&'a AccessChoice> {
        let key = access_key(access);
        self.choices
            .iter()
            .find(|c| c.matches(access))
            .or_else(|| self.choices.iter().find(|c| c.matches(key)))
    }

    /// Normalized license id for an access label (`None` means public)
    pub fn license_id(&self, access: Option<&str>) -> String {
        let access = sanitize_access(access).unwrap_or(DEFAULT_ACCESS);
        let archive = self.archive.as_deref().unwrap_or("unknown");
        format!(
            "#license-{}-{}",
            license_slug(archive),
            license_slug(access_key(access))
        )
    }

    fn build_license(&self, access: Option<&str>) -> Value {
        let archive = self.archive_display();
        let id = self.license_id(access);

        match sanitize_access(access) {
            Some(access) => {
                let choice = self.find_choice(access);
                let category = choice
                    .and_then(|c| c.ldac_access_category.as_deref())
                    .filter(|c| !c.trim().is_empty())
                    .map(compact_category)
                    .unwrap_or_else(|| AUTHORIZED_ACCESS.to_string());
                let meaning = choice
                    .map(|c| c.description.trim())
                    .filter(|d| !d.is_empty());
                let description = match meaning {
                    Some(meaning) => format!(
                        "Marked with the {}-specific term, '{}' which means '{}'",
                        archive, access, meaning
                    ),
                    None => format!("Marked with the {}-specific term, '{}'", archive, access),
                };
                json!({
                    "@id": id,
                    "@type": DATA_REUSE_LICENSE,
                    "name": format!("{} {} License", archive, access),
                    "description": description,
                    "ldac:access": { "@id": category }
                })
            }
            None => json!({
                "@id": id,
                "@type": DATA_REUSE_LICENSE,
                "name": format!("{} {} License", archive, DEFAULT_ACCESS),
                "description": format!(
                    "Marked with the {}-specific term, '{}' which means 'This is an open access license.'",
                    archive, DEFAULT_ACCESS
                ),
                "ldac:access": { "@id": OPEN_ACCESS }
            }),
        }
    }

    /// Reference to the license for an access label, registering it for output
    pub fn license_reference(&mut self, access: Option<&str>) -> Value {
        let id = self.license_id(access);
        if !self.licenses.contains_key(&id) {
            let license = self.build_license(access);
            self.licenses.insert(id.clone(), license);
        }
        reference(&id)
    }

    /// License of a session, from its `access` field
    pub fn session_license(&mut self, session: &Session) -> Value {
        self.license_reference(session.folder.metadata.value("access"))
    }

    pub fn collection_license_reference(&mut self) -> Value {
        self.collection_license_used = true;
        reference(COLLECTION_LICENSE_ID)
    }

    /// Decide the license of a file once; later calls return the first answer
    ///
    /// A file's own `license` (or `access`) value wins over the fallback. Only
    /// `http`/`https` license URLs are kept as they are; any other value is an
    /// access label and gets a license node.
    pub fn ensure_file_license(&mut self, file: &FileRecord, fallback: LicenseFallback<'_>) -> String {
        let path = file.path.display().to_string();
        if let Some(existing) = self.file_licenses.get(&path) {
            return existing.clone();
        }

        let own = sanitize_access(file.property("license"))
            .or_else(|| sanitize_access(file.property("access")));

        let license_id = match own {
            Some(value) if is_license_url(value) => value.to_string(),
            Some(value) => self.register(Some(value)),
            None => match fallback {
                LicenseFallback::Session(session) => {
                    self.register(session.folder.metadata.value("access"))
                }
                LicenseFallback::Collection => {
                    self.collection_license_used = true;
                    COLLECTION_LICENSE_ID.to_string()
                }
            },
        };

        self.file_licenses.insert(path, license_id.clone());
        license_id
    }

    fn register(&mut self, access: Option<&str>) -> String {
        let license = self.license_reference(access);
        license["@id"].as_str().unwrap_or_default().to_string()
    }

    pub fn file_license(&self, file: &FileRecord) -> Option<&str> {
        self.file_licenses
            .get(&file.path.display().to_string())
            .map(String::as_str)
    }

    /// Number of distinct archive licenses registered so far
    pub fn license_count(&self) -> usize {
        self.licenses.len()
    }

    /// License nodes, the collection license if used, and the access terms they use
    pub fn into_entities(self) -> Vec<Value> {
        let mut entities: Vec<Value> = self.licenses.into_values().collect();
        if self.collection_license_used {
            entities.push(json!({
                "@id": COLLECTION_LICENSE_ID,
                "@type": DATA_REUSE_LICENSE,
                "name": "Collection License",
                "description": "License for the collection as a whole. Individual items may have their own specific licenses.",
                "ldac:access": { "@id": OPEN_ACCESS }
            }));
        }

        let used: BTreeSet<String> = entities
            .iter()
            .filter_map(|l| l["ldac:access"]["@id"].as_str().map(String::from))
            .collect();
        entities.extend(access_type_definitions(&used));
        entities
    }
}
