//! Core data models used throughout doc-chat.
//!
//! These types represent the uploaded files, per-file processing records,
//! and conversation turns that flow through the extraction and chat pipeline.

use std::fmt;
use std::path::Path;

/// Declared document type, derived from the filename suffix (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Pdf,
    Docx,
    Txt,
}

impl DeclaredType {
    /// Resolve the declared type from a filename suffix.
    /// Returns `None` for unsupported or missing extensions.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DeclaredType::Pdf),
            "docx" => Some(DeclaredType::Docx),
            "txt" => Some(DeclaredType::Txt),
            _ => None,
        }
    }

    /// Display label used in processing records (e.g. `"PDF"`).
    pub fn label(&self) -> &'static str {
        match self {
            DeclaredType::Pdf => "PDF",
            DeclaredType::Docx => "DOCX",
            DeclaredType::Txt => "TXT",
        }
    }

    /// Unit noun used in the per-file info string.
    pub fn unit_noun(&self) -> &'static str {
        match self {
            DeclaredType::Pdf => "pages",
            DeclaredType::Docx => "paragraphs",
            DeclaredType::Txt => "lines",
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A file handed to the pipeline: name plus raw bytes.
/// Consumed once by extraction, then discarded.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Result of extracting one file: raw text plus a unit count
/// (pages / paragraphs / lines depending on the type).
/// Empty text is a valid failure result, never an `Option`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub unit_count: usize,
}

impl ExtractionResult {
    pub fn new(text: String, unit_count: usize) -> Self {
        Self { text, unit_count }
    }

    /// The canonical failure value: `("", 0)`.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Processing outcome for one uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Processed,
    Failed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Processed => f.write_str("Processed"),
            FileStatus::Failed => f.write_str("Failed"),
        }
    }
}

/// One per uploaded file, in upload order. Kept for the session,
/// cleared on reset.
#[derive(Debug, Clone)]
pub struct ProcessedFileRecord {
    pub name: String,
    pub declared_type: DeclaredType,
    pub info: String,
    pub status: FileStatus,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    /// Wire name used by the chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single (role, content) turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_case_insensitive() {
        assert_eq!(DeclaredType::from_name("notes.PDF"), Some(DeclaredType::Pdf));
        assert_eq!(
            DeclaredType::from_name("report.Docx"),
            Some(DeclaredType::Docx)
        );
        assert_eq!(DeclaredType::from_name("a.TXT"), Some(DeclaredType::Txt));
    }

    #[test]
    fn declared_type_unsupported() {
        assert_eq!(DeclaredType::from_name("data.csv"), None);
        assert_eq!(DeclaredType::from_name("noext"), None);
        assert_eq!(DeclaredType::from_name("archive.tar.gz"), None);
    }
}
