//! Vocabulary definitions for RO-Crate / LDAC export
//!
//! Context URLs, profile identifiers, and the fixed LDAC term sets
//! (access types, material types) the exporter emits on demand.

use serde_json::{json, Value};
use std::collections::BTreeSet;

/// RO-Crate 1.2 JSON-LD context
pub const ROCRATE_CONTEXT: &str = "https://w3id.org/ro/crate/1.2/context";

/// Language Data Commons JSON-LD context
pub const LDAC_CONTEXT: &str = "https://w3id.org/ldac/context";

/// Namespace behind the `ldac:` prefix
pub const LDAC_NS: &str = "https://w3id.org/ldac/terms#";

/// Namespace behind the `pcdm:` prefix
pub const PCDM_NS: &str = "http://pcdm.org/models#";

/// Namespace behind the `dct:` prefix
pub const DCT_NS: &str = "http://purl.org/dc/terms/";

/// conformsTo target of the metadata descriptor
pub const ROCRATE_PROFILE: &str = "https://w3id.org/ro/crate/1.2";

/// conformsTo target of a collection root
pub const LDAC_COLLECTION_PROFILE: &str = "https://w3id.org/ldac/profile#Collection";

/// conformsTo target of a single object (session)
pub const LDAC_OBJECT_PROFILE: &str = "https://w3id.org/ldac/profile#Object";

/// Standard metadata descriptor filename
pub const METADATA_DESCRIPTOR_ID: &str = "ro-crate-metadata.json";

/// Root entity ID
pub const ROOT_ENTITY_ID: &str = "./";

/// Lexvo identifier for the undetermined language
pub const UND_LANGUAGE_ID: &str = "https://lexvo.org/id/iso639-3/und";

/// Publisher used when a session is exported on its own
pub const LAMETA_PUBLISHER_ID: &str = "https://github.com/onset/lameta";

pub const DATA_REUSE_LICENSE: &str = "ldac:DataReuseLicense";
pub const COLLECTION_PROTOCOL: &str = "ldac:CollectionProtocol";

pub const ACCESS_TYPES: &str = "ldac:AccessTypes";
pub const OPEN_ACCESS: &str = "ldac:OpenAccess";
pub const AUTHORIZED_ACCESS: &str = "ldac:AuthorizedAccess";

pub const MATERIAL_TYPES: &str = "ldac:MaterialTypes";
pub const PRIMARY_MATERIAL: &str = "ldac:PrimaryMaterial";
pub const ANNOTATION: &str = "ldac:Annotation";

/// Term set for genres mapped onto the LDAC profile
pub const LINGUISTIC_GENRE_TERMS: &str = "ldac:LinguisticGenreTerms";

/// Compact-IRI prefixes declared inline in the context
pub const CONTEXT_PREFIXES: [&str; 3] = ["ldac", "pcdm", "dct"];

/// The `@context` block of every exported crate
pub fn context() -> Value {
    json!([
        ROCRATE_CONTEXT,
        LDAC_CONTEXT,
        {
            "ldac": LDAC_NS,
            "pcdm": PCDM_NS,
            "dct": DCT_NS
        }
    ])
}

/// The self-describing `ro-crate-metadata.json` node
pub fn metadata_descriptor() -> Value {
    json!({
        "@id": METADATA_DESCRIPTOR_ID,
        "@type": "CreativeWork",
        "conformsTo": { "@id": ROCRATE_PROFILE },
        "about": { "@id": ROOT_ENTITY_ID }
    })
}

/// Access-type terms for the categories some license actually uses
///
/// Returns nothing when `used` is empty so the term set is never orphaned.
pub fn access_type_definitions(used: &BTreeSet<String>) -> Vec<Value> {
    if used.is_empty() {
        return vec![];
    }

    let mut definitions = vec![json!({
        "@id": ACCESS_TYPES,
        "@type": "DefinedTermSet",
        "name": "Access Types"
    })];

    if used.contains(OPEN_ACCESS) {
        definitions.push(json!({
            "@id": OPEN_ACCESS,
            "@type": "DefinedTerm",
            "name": "Open Access",
            "description": "Data covered by this license may be accessed as long as the license is served alongside it, and does not require any specific authorization step.",
            "inDefinedTermSet": { "@id": ACCESS_TYPES }
        }));
    }
    if used.contains(AUTHORIZED_ACCESS) {
        definitions.push(json!({
            "@id": AUTHORIZED_ACCESS,
            "@type": "DefinedTerm",
            "name": "Authorized Access",
            "description": "Data covered by this license requires explicit authorization for access.",
            "inDefinedTermSet": { "@id": ACCESS_TYPES }
        }));
    }

    definitions
}

/// Material-type terms for the kinds some file actually declares
pub fn material_type_definitions(used: &BTreeSet<String>) -> Vec<Value> {
    if used.is_empty() {
        return vec![];
    }

    let mut definitions = vec![json!({
        "@id": MATERIAL_TYPES,
        "@type": "DefinedTermSet",
        "name": "Material Types"
    })];

    if used.contains(PRIMARY_MATERIAL) {
        definitions.push(json!({
            "@id": PRIMARY_MATERIAL,
            "@type": "DefinedTerm",
            "name": "Primary Material",
            "description": "The object of study, such as a literary work, film, or recording of natural discourse.",
            "inDefinedTermSet": { "@id": MATERIAL_TYPES }
        }));
    }
    if used.contains(ANNOTATION) {
        definitions.push(json!({
            "@id": ANNOTATION,
            "@type": "DefinedTerm",
            "name": "Annotation",
            "description": "The resource includes material that adds information to some other linguistic record.",
            "inDefinedTermSet": { "@id": MATERIAL_TYPES }
        }));
    }

    definitions
}
