//! crates/unbind_core/src/admission.rs
//!
//! Client-side admission rules for uploads: which file types are accepted
//! and how large each may be. Checked before any upload attempt exists.

use std::fmt;

const MIB: u64 = 1024 * 1024;

/// Extensions accepted for upload, lowercase and without the dot.
pub const ALLOWED_FILE_TYPES: [&str; 4] = ["pdf", "docx", "doc", "txt"];

/// A document type the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Txt => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Doc => "application/msword",
            Self::Txt => "text/plain",
        }
    }

    /// Largest accepted size in bytes, inclusive.
    pub fn size_limit(self) -> u64 {
        match self {
            Self::Pdf | Self::Docx | Self::Doc => 10 * MIB,
            Self::Txt => MIB,
        }
    }
}

/// Why a file was refused before upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("{filename}: file type '{extension}' is not allowed")]
    UnsupportedType { filename: String, extension: String },
    #[error("{filename}: {size} bytes exceeds the {limit} byte limit for {kind} files")]
    TooLarge {
        filename: String,
        kind: FileKind,
        size: u64,
        limit: u64,
    },
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Lowercased text after the last dot, or an empty string when there is none.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

pub fn is_valid_file_type(filename: &str) -> bool {
    FileKind::from_extension(&file_extension(filename)).is_some()
}

/// Admits a file iff its extension is allowed and `size <= kind.size_limit()`.
pub fn admit(filename: &str, size: u64) -> Result<FileKind, AdmissionError> {
    let extension = file_extension(filename);
    let kind = FileKind::from_extension(&extension).ok_or_else(|| AdmissionError::UnsupportedType {
        filename: filename.to_string(),
        extension: extension.clone(),
    })?;

    let limit = kind.size_limit();
    if size > limit {
        return Err(AdmissionError::TooLarge {
            filename: filename.to_string(),
            kind,
            size,
            limit,
        });
    }
    Ok(kind)
}
