//! lameta RO-Crate Export Library
//!
//! This library turns a lameta field-documentation project (sessions,
//! people, their files and metadata) into a single RO-Crate 1.2 metadata
//! document that conforms to the Language Data Commons (LDAC) profile.
//!
//! # Overview
//!
//! The export builds one flat JSON-LD `@graph`:
//!
//! 1. The project becomes the root `./`, an LDAC `RepositoryCollection`
//! 2. Each session becomes a `#session-<id>` CollectionEvent plus a
//!    `Sessions/<id>/` Dataset holding its files
//! 3. Contributors become Person nodes with LDAC-safe properties only
//! 4. Field values are mapped onto LDAC vocabulary terms, languages and
//!    deduplicated access licenses
//! 5. Every structural link is written in both directions so each file is
//!    reachable from the root through `hasPart`
//!
//! The export is a pure function of its input: no state survives between
//! calls and no clock is read, so exporting the same project twice gives
//! equal graphs.
//!
//! # Vocabulary
//!
//! Values that have no LDAC term are given project-scoped ids of the form
//! `tag:lameta,<project title>:<kind>/<term>` and described by a
//! `DefinedTerm` in the graph.
//!
//! # Usage
//!
//! ## Export a project
//!
//! ```ignore
//! use lameta_rocrate::{to_json_string, Exporter, StaticLanguageNames, VocabularyCatalog};
//!
//! let project: Project = // build or deserialize the project
//! let exporter = Exporter::new(
//!     VocabularyCatalog::with_builtin(),
//!     StaticLanguageNames::new().with("etr", "Edolo"),
//! );
//! let result = exporter.export_project(&project)?;
//!
//! println!("{}", to_json_string(&result, true)?);
//! ```
//!
//! ## Export one session on its own
//!
//! ```ignore
//! use lameta_rocrate::{ExportTarget, Exporter};
//!
//! let session = &project.sessions[0];
//! let result = exporter.export(&project, ExportTarget::Session(session))?;
//! ```
//!
//! ## Write `ro-crate-metadata.json`
//!
//! ```ignore
//! use lameta_rocrate::write_ro_crate_file;
//!
//! let path = write_ro_crate_file(&project, &exporter)?;
//! ```

pub mod context;
pub mod documents;
pub mod error;
pub mod export;
pub mod fields;
pub mod files;
pub mod graph;
pub mod id;
pub mod languages;
pub mod license;
pub mod media;
pub mod model;
pub mod people;
pub mod project;
pub mod resolver;
pub mod sessions;
pub mod vocab;
pub mod vocabulary;
pub mod writer;

// Re-export main types for convenience
pub use crate::context::ExportOptions;
pub use crate::error::ExportError;
pub use crate::export::{
    export, to_json_string, to_jsonld, ExportResult, ExportStats, ExportTarget, Exporter,
};
pub use crate::languages::{LanguageNames, StaticLanguageNames};
pub use crate::model::{
    AccessChoice, Contribution, DocumentKind, FieldDefinition, FileRecord, Folder, FolderKind,
    Person, Project, Session,
};
pub use crate::vocabulary::{Vocabulary, VocabularyCatalog};
pub use crate::writer::write_ro_crate_file;
