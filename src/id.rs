//! Identifier building for exported entities
//!
//! Every `@id` in the graph is derived here from a structural role and a raw
//! name, so the same input always yields the same identifier.

use url::Url;

use crate::model::{DocumentKind, FolderKind};
use crate::vocab::{CONTEXT_PREFIXES, METADATA_DESCRIPTOR_ID, ROOT_ENTITY_ID};

/// Classification of an entity @id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdKind {
    /// Root entity: "./"
    Root,
    /// Relative path: "./foo", "Sessions/ETR008/"
    Relative,
    /// Fragment identifier: "#session-ETR008"
    Fragment,
    /// Compact IRI under a prefix declared in the context: "ldac:Dialogue"
    Compact,
    /// Absolute IRI: "https://...", "tag:..."
    Absolute,
    /// Metadata descriptor: "ro-crate-metadata.json"
    MetadataDescriptor,
}

/// Classify an @id string
pub fn classify_id(id: &str) -> IdKind {
    if id == ROOT_ENTITY_ID {
        IdKind::Root
    } else if id == METADATA_DESCRIPTOR_ID {
        IdKind::MetadataDescriptor
    } else if id.starts_with('#') {
        IdKind::Fragment
    } else if is_compact_iri(id) {
        IdKind::Compact
    } else if is_absolute_iri(id) {
        IdKind::Absolute
    } else {
        IdKind::Relative
    }
}

/// Hierarchical IRIs with a host, plus `tag:` and `urn:` names
///
/// A label such as "F: Free to All" parses as a URL with scheme `f` but is
/// not an identifier.
fn is_absolute_iri(id: &str) -> bool {
    Url::parse(id)
        .map(|url| url.has_host() || matches!(url.scheme(), "tag" | "urn"))
        .unwrap_or(false)
}

fn is_compact_iri(id: &str) -> bool {
    id.split_once(':')
        .map(|(prefix, _)| CONTEXT_PREFIXES.contains(&prefix))
        .unwrap_or(false)
}

/// Percent-encode the characters that may not appear raw in an IRI
///
/// Whitespace, `%`, delimiters such as `( ) ! # ?` and control characters are
/// encoded byte-wise. Non-ASCII letters are kept so names stay readable.
/// Encoding `%` itself keeps distinct names on distinct ids.
pub fn sanitize_for_iri(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let reserved = c.is_whitespace()
            || c.is_control()
            || matches!(
                c,
                '%' | '(' | ')' | '!' | '#' | '?' | '[' | ']' | '"' | '<' | '>' | '\\' | '^' | '`'
                    | '{' | '|' | '}'
            );
        if reserved {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Human-readable fragment slug: lowercase words joined by `-`
///
/// "Acme Archive (Main)" -> "acme-archive-main"
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

/// License slug: every character outside `[a-z0-9]` becomes `-`
///
/// "Strategic partners" -> "strategic-partners"
pub fn license_slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}

/// Session CollectionEvent: `#session-<prefix>`
pub fn session_event_id(prefix: &str) -> String {
    format!("#session-{}", sanitize_for_iri(prefix))
}

/// Session directory Dataset: `Sessions/<prefix>/`
pub fn session_directory_id(prefix: &str) -> String {
    format!("Sessions/{}/", sanitize_for_iri(prefix))
}

/// Person: `People/<prefix>/`
pub fn person_id(prefix: &str) -> String {
    format!("People/{}/", sanitize_for_iri(prefix))
}

/// Dataset grouping a person's files: `#<prefix>-files`
pub fn person_files_dataset_id(prefix: &str) -> String {
    format!("#{}-files", sanitize_for_iri(prefix))
}

/// Contributor named in a session without a matching person folder
pub fn unresolved_contributor_id(name: &str) -> String {
    format!("#contributor-{}", slug(name))
}

/// Place named by a location field: `#place-<name>`
pub fn place_id(name: &str) -> String {
    format!("#place-{}", sanitize_for_iri(name))
}

/// Language node for a code; `und` is handled by the registry
pub fn language_id(code: &str) -> String {
    format!("#language_{}", sanitize_for_iri(code))
}

/// File entity id, namespaced by the role of the folder holding it
pub fn file_id(kind: FolderKind, folder_prefix: &str, file_name: &str) -> String {
    let name = sanitize_for_iri(file_name);
    match kind {
        FolderKind::Project => format!("./{}", name),
        FolderKind::Session => format!("Sessions/{}/{}", sanitize_for_iri(folder_prefix), name),
        FolderKind::Person => format!("People/{}/{}", sanitize_for_iri(folder_prefix), name),
        FolderKind::DocumentFolder(DocumentKind::Description) => {
            format!("DescriptionDocuments/{}", name)
        }
        FolderKind::DocumentFolder(DocumentKind::Other) => format!("OtherDocuments/{}", name),
    }
}

/// Dataset that holds the files of a document folder
pub fn document_dataset_id(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Description => "DescriptionDocuments/",
        DocumentKind::Other => "OtherDocuments/",
    }
}

/// Reject prefixes that would collapse distinct folders onto one id
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.trim().is_empty() {
        return Err("Folder prefix cannot be empty".to_string());
    }
    if prefix.contains('/') {
        return Err(format!("Folder prefix cannot contain '/': {}", prefix));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_id() {
        assert_eq!(classify_id("./"), IdKind::Root);
        assert_eq!(classify_id("Sessions/ETR008/"), IdKind::Relative);
        assert_eq!(classify_id("./notes.txt"), IdKind::Relative);
        assert_eq!(classify_id("#session-ETR008"), IdKind::Fragment);
        assert_eq!(classify_id("ldac:Dialogue"), IdKind::Compact);
        assert_eq!(classify_id("https://lexvo.org/id/iso639-3/und"), IdKind::Absolute);
        assert_eq!(classify_id("tag:lameta,Edolo:genre/x"), IdKind::Absolute);
        assert_eq!(classify_id("ro-crate-metadata.json"), IdKind::MetadataDescriptor);
        assert_eq!(classify_id("urn:x-archive:F"), IdKind::Absolute);
        assert_eq!(classify_id("F: Free to All"), IdKind::Relative);
    }

    #[test]
    fn test_sanitize_for_iri() {
        assert_eq!(sanitize_for_iri("My File (1)!.wav"), "My%20File%20%281%29%21.wav");
        assert_eq!(sanitize_for_iri("a#b?c"), "a%23b%3Fc");
        assert_eq!(sanitize_for_iri("tab\there"), "tab%09here");
        assert_eq!(sanitize_for_iri("Édolo"), "Édolo");
        assert_eq!(sanitize_for_iri("50%"), "50%25");
        assert_eq!(sanitize_for_iri("a%20b"), "a%2520b");
        assert_eq!(sanitize_for_iri(""), "");
    }

    #[test]
    fn test_sanitize_is_stable() {
        let first = file_id(FolderKind::Session, "ETR 008", "a (b).wav");
        let second = file_id(FolderKind::Session, "ETR 008", "a (b).wav");
        assert_eq!(first, second);
        assert_eq!(first, "Sessions/ETR%20008/a%20%28b%29.wav");
    }

    #[test]
    fn test_encoded_names_stay_distinct() {
        let spaced = file_id(FolderKind::Session, "S1", "a b.wav");
        let escaped = file_id(FolderKind::Session, "S1", "a%20b.wav");
        assert_eq!(spaced, "Sessions/S1/a%20b.wav");
        assert_eq!(escaped, "Sessions/S1/a%2520b.wav");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Acme Archive (Main)"), "acme-archive-main");
        assert_eq!(slug("  --  "), "unknown");
        assert_eq!(slug("REAP"), "reap");
    }

    #[test]
    fn test_license_slug() {
        assert_eq!(license_slug("Strategic partners"), "strategic-partners");
        assert_eq!(license_slug("REAP"), "reap");
        assert_eq!(license_slug("Level 1"), "level-1");
    }

    #[test]
    fn test_file_id_by_role() {
        assert_eq!(file_id(FolderKind::Project, "proj", "notes.txt"), "./notes.txt");
        assert_eq!(
            file_id(FolderKind::Session, "ETR009", "ETR009.session"),
            "Sessions/ETR009/ETR009.session"
        );
        assert_eq!(
            file_id(FolderKind::Person, "Awi_Heole", "photo.jpg"),
            "People/Awi_Heole/photo.jpg"
        );
        assert_eq!(
            file_id(
                FolderKind::DocumentFolder(DocumentKind::Description),
                "",
                "Read Me.md"
            ),
            "DescriptionDocuments/Read%20Me.md"
        );
        assert_eq!(
            file_id(FolderKind::DocumentFolder(DocumentKind::Other), "", "map.pdf"),
            "OtherDocuments/map.pdf"
        );
    }

    #[test]
    fn test_structural_ids() {
        assert_eq!(session_event_id("ETR008"), "#session-ETR008");
        assert_eq!(session_directory_id("ETR008"), "Sessions/ETR008/");
        assert_eq!(person_id("Awi Heole"), "People/Awi%20Heole/");
        assert_eq!(person_files_dataset_id("Awi_Heole"), "#Awi_Heole-files");
        assert_eq!(unresolved_contributor_id("Mary Smith"), "#contributor-mary-smith");
        assert_eq!(language_id("etr"), "#language_etr");
        assert_eq!(place_id("Huya Village"), "#place-Huya%20Village");
        assert_eq!(place_id("collection-license"), "#place-collection-license");
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("ETR008").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("a/b").is_err());
    }
}
