//! Core types shared across ClauseLens: uploaded documents, raw and normalised
//! analysis results, risk tables, and the collaborator traits the workflow
//! controller talks to.

pub mod analysis;
pub mod document;
pub mod normalize;
pub mod risk;
pub mod service;

pub use analysis::RawAnalysis;
pub use document::{AnalysisRequest, AnalysisType, UploadFile, UploadedDocument};
pub use normalize::{ComparisonRow, GlossaryEntry, NormalizedInsight, normalize, parties_display};
pub use risk::RiskLevel;
pub use service::{AssistService, CollaboratorError, DocumentService, Extraction, HealthStatus};
