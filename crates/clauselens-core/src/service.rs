//! Collaborator traits: the extraction, analysis, and Q&A services the
//! workflow controller calls out to.
//!
//! Implementations live in `clauselens-client` (HTTP and offline demo); tests
//! substitute their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::RawAnalysis;
use crate::document::{AnalysisRequest, UploadFile};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The service answered and refused the request.
    #[error("{message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },
    /// The service could not be reached or the exchange broke off.
    #[error("connection failed: {0}")]
    Transport(String),
    /// The service answered with something we could not interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl CollaboratorError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: None,
            message: message.into(),
        }
    }
}

/// What the extraction service returns for an accepted file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Backend health, as reported by `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    /// Everything else the backend chose to report (mode, configuration).
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}

/// Services the workflow controller drives: upload/extraction, analysis, Q&A.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Send a file for text extraction.
    async fn upload(&self, file: &UploadFile) -> Result<Extraction, CollaboratorError>;

    /// Run an analysis over extracted text.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, CollaboratorError>;

    /// Answer a free-form question about the document text.
    async fn ask(&self, document_text: &str, question: &str) -> Result<String, CollaboratorError>;

    /// Extract and run a comprehensive analysis in one exchange.
    ///
    /// Services without a combined endpoint make the two calls in sequence.
    async fn upload_and_analyze(
        &self,
        file: &UploadFile,
    ) -> Result<(Extraction, RawAnalysis), CollaboratorError> {
        let extraction = self.upload(file).await?;
        let request = AnalysisRequest::comprehensive(&extraction.text)
            .ok_or_else(|| CollaboratorError::Malformed("no text was extracted".into()))?;
        let raw = self.analyze(&request).await?;
        Ok((extraction, raw))
    }
}

/// Auxiliary services used outside the main workflow.
#[async_trait]
pub trait AssistService: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, CollaboratorError>;

    /// Plain-language explanation of a clause, optionally with surrounding context.
    async fn explain(&self, clause: &str, context: &str) -> Result<String, CollaboratorError>;

    async fn summarize(&self, text: &str) -> Result<String, CollaboratorError>;
}
