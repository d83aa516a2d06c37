//! Agents derived from plain project fields
//!
//! The archive name, depositor and contact person are stored as strings but
//! LDAC wants object references, so each becomes a small Person or
//! Organization node with a slug id.

use serde_json::{json, Value};

use crate::graph::{reference, set_property};
use crate::id::slug;
use crate::model::Project;

pub const UNKNOWN_CONTRIBUTOR_ID: &str = "#unknown-contributor";

/// A reference to put on the entity plus the node it points at
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub reference: Value,
    pub entity: Value,
}

struct ResolverConfig {
    field_key: &'static str,
    id_prefix: &'static str,
    entity_type: &'static str,
    /// Values treated as absent, compared case-insensitively
    empty_values: &'static [&'static str],
}

fn resolve(project: &Project, config: &ResolverConfig) -> Option<Resolution> {
    let raw = project.folder.metadata.text(config.field_key)?;
    if config
        .empty_values
        .iter()
        .any(|v| v.eq_ignore_ascii_case(raw))
    {
        return None;
    }

    let id = format!("{}{}", config.id_prefix, slug(raw));
    Some(Resolution {
        reference: reference(&id),
        entity: json!({
            "@id": id,
            "@type": config.entity_type,
            "name": raw
        }),
    })
}

/// Organization named by `archiveConfigurationName`
pub fn resolve_publisher(project: &Project) -> Option<Resolution> {
    resolve(
        project,
        &ResolverConfig {
            field_key: "archiveConfigurationName",
            id_prefix: "#publisher-",
            entity_type: "Organization",
            empty_values: &["default", "unknown"],
        },
    )
}

pub fn resolve_depositor(project: &Project) -> Option<Resolution> {
    resolve(
        project,
        &ResolverConfig {
            field_key: "depositor",
            id_prefix: "#depositor-",
            entity_type: "Person",
            empty_values: &[],
        },
    )
}

/// The contact person, or the shared unknown contributor when none is recorded
pub fn resolve_contact(project: &Project) -> Resolution {
    resolve(
        project,
        &ResolverConfig {
            field_key: "contactPerson",
            id_prefix: "#contact-",
            entity_type: "Person",
            empty_values: &["unknown"],
        },
    )
    .unwrap_or_else(|| Resolution {
        reference: reference(UNKNOWN_CONTRIBUTOR_ID),
        entity: json!({
            "@id": UNKNOWN_CONTRIBUTOR_ID,
            "@type": "Person",
            "name": "Unknown"
        }),
    })
}

/// Point `author`, `accountablePerson` and `dct:rightsHolder` at the contact
pub fn set_contact_properties(entity: &mut Value, contact: &Value) {
    for key in ["author", "accountablePerson", "dct:rightsHolder"] {
        set_property(entity, key, contact.clone());
    }
}
