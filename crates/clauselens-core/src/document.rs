//! Document types exchanged with the extraction and analysis collaborators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extensions the upload control offers in its file picker.
///
/// Authoritative validation belongs to the extraction service; this is only
/// the client-side filter.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "docx"];

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const FALLBACK_MIME: &str = "application/octet-stream";

/// Lower-cased extension of `name`, if it has one.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether the file picker would offer `name`.
pub fn is_accepted_extension(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type implied by the file name's extension.
pub fn mime_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("pdf") => PDF_MIME,
        Some("docx") => DOCX_MIME,
        _ => FALLBACK_MIME,
    }
}

/// A file picked by the user, not yet sent to the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from a file name and its contents, inferring the MIME type.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_for(&name).to_string();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A document the extraction service accepted.
///
/// Replaced wholesale on reupload; never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub extracted_text: String,
    /// Passed through from the extraction service unmodified.
    #[serde(default)]
    pub extraction_metadata: Map<String, Value>,
}

impl UploadedDocument {
    /// Combine the picked file with what the extraction service returned.
    pub fn from_extraction(
        file: &UploadFile,
        extracted_text: String,
        extraction_metadata: Map<String, Value>,
    ) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes(),
            extracted_text,
            extraction_metadata,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.extracted_text.trim().is_empty()
    }
}

/// Kind of analysis requested from the AI service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Comprehensive,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comprehensive => "comprehensive",
        }
    }
}

/// Body of `POST /api/analyze`. Built per attempt, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    #[serde(rename = "text")]
    pub document_text: String,
    pub analysis_type: AnalysisType,
}

impl AnalysisRequest {
    /// A comprehensive analysis request, or `None` when there is no text to send.
    pub fn comprehensive(document_text: &str) -> Option<Self> {
        if document_text.trim().is_empty() {
            return None;
        }
        Some(Self {
            document_text: document_text.to_string(),
            analysis_type: AnalysisType::Comprehensive,
        })
    }
}
