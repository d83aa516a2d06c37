//! File typing by extension
//!
//! Decides the schema.org media type, the MIME type, and the LDAC material
//! type of an exported file.

use serde_json::{json, Value};

use crate::vocab::{ANNOTATION, PRIMARY_MATERIAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Other,
}

impl MediaKind {
    /// Classify a lowercase extension without the leading dot
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "wav" | "mp3" | "m4a" | "aac" | "flac" | "ogg" | "oga" | "wma" | "aif" | "aiff" => {
                MediaKind::Audio
            }
            "mp4" | "m4v" | "mov" | "avi" | "mkv" | "mpg" | "mpeg" | "wmv" | "webm" | "mts" => {
                MediaKind::Video
            }
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tif" | "tiff" | "webp" => MediaKind::Image,
            _ => MediaKind::Other,
        }
    }

    /// The schema.org MediaObject subtype, if any
    pub fn schema_type(self) -> Option<&'static str> {
        match self {
            MediaKind::Audio => Some("AudioObject"),
            MediaKind::Video => Some("VideoObject"),
            MediaKind::Image => Some("ImageObject"),
            MediaKind::Other => None,
        }
    }

    /// `"File"` alone, or `["File", <MediaObject subtype>]`
    pub fn entity_type(self) -> Value {
        match self.schema_type() {
            Some(media) => json!(["File", media]),
            None => json!("File"),
        }
    }

    /// Recordings and photos are primary material; everything else annotates them
    pub fn material_type(self) -> &'static str {
        match self {
            MediaKind::Audio | MediaKind::Video | MediaKind::Image => PRIMARY_MATERIAL,
            MediaKind::Other => ANNOTATION,
        }
    }
}

/// MIME type for a lowercase extension without the leading dot
pub fn mime_type(ext: &str) -> &'static str {
    match ext {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "wma" => "audio/x-ms-wma",
        "aif" | "aiff" => "audio/aiff",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "mpg" | "mpeg" => "video/mpeg",
        "wmv" => "video/x-ms-wmv",
        "webm" => "video/webm",
        "mts" => "video/mp2t",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "rtf" => "application/rtf",
        "json" => "application/json",
        "xml" | "session" | "person" | "meta" | "sprj" => "application/xml",
        "eaf" => "text/x-eaf+xml",
        "flextext" => "application/xml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
