//! Offline demo collaborator.
//!
//! Returns canned extraction, analysis, and answers so the workflow can be
//! exercised without a backend or AI spend. Upload validation matches the
//! backend's: accepted extensions, non-empty, within the size limit.

use async_trait::async_trait;
use clauselens_core::document::{extension_of, is_accepted_extension};
use clauselens_core::risk::overall_from_severities;
use clauselens_core::{
    AnalysisRequest, AssistService, CollaboratorError, DocumentService, Extraction,
    HealthStatus, RawAnalysis, UploadFile,
};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::upload::DEFAULT_MAX_FILE_SIZE;

const DEMO_TEXT: &str = "\
SERVICES AGREEMENT

This Services Agreement is entered into by Party A (the \"Provider\") and Party B (the \"Client\").

1. Term. This Agreement commences on the Effective Date and continues for two (2) years.
2. Fees. Client shall pay all invoices within thirty (30) days of the invoice date.
3. Liability. Provider's aggregate liability shall not exceed the fees paid in the preceding twelve months.
4. Termination. Either party may terminate on thirty (30) days' written notice.
5. Governing Law. This Agreement is governed by the laws of the State of New York.";

const SUMMARY: &str = "This is a demo summary of the provided text. The document contains \
important legal provisions covering various aspects of a business relationship. Key areas \
include contractual terms, payment obligations, performance standards, and dispute resolution \
procedures.";

/// Canned responses for every collaborator call.
#[derive(Debug, Clone)]
pub struct DemoService {
    max_file_size: u64,
}

impl Default for DemoService {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl DemoService {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    fn validate(&self, file: &UploadFile) -> Result<(), CollaboratorError> {
        if file.name.trim().is_empty() {
            return Err(rejected(400, "No file selected".into()));
        }
        if !is_accepted_extension(&file.name) {
            let ext = extension_of(&file.name).unwrap_or_default();
            return Err(rejected(
                400,
                format!("Unsupported file type: .{ext}. Allowed types: pdf, docx"),
            ));
        }
        if file.bytes.is_empty() {
            return Err(rejected(400, "File is empty".into()));
        }
        if file.size_bytes() > self.max_file_size {
            return Err(rejected(
                413,
                format!(
                    "File size ({} bytes) exceeds maximum allowed ({} bytes)",
                    file.size_bytes(),
                    self.max_file_size
                ),
            ));
        }
        Ok(())
    }
}

fn rejected(status: u16, message: String) -> CollaboratorError {
    CollaboratorError::Rejected {
        status: Some(status),
        message,
    }
}

/// Plain-text payloads are used as-is; anything binary gets the sample agreement.
fn demo_text(file: &UploadFile) -> String {
    match std::str::from_utf8(&file.bytes) {
        Ok(text) if !text.trim().is_empty() && !text.starts_with("%PDF") => text.to_string(),
        _ => DEMO_TEXT.to_string(),
    }
}

fn demo_analysis() -> Value {
    let mut risk_assessment = json!({
        "financial_risks": [{
            "risk": "Late payments may accrue additional fees",
            "severity": "medium",
            "mitigation": "Track invoice dates against the 30-day term",
        }],
        "legal_risks": [{
            "risk": "Liability cap may not cover consequential losses",
            "severity": "high",
            "mitigation": "Negotiate carve-outs for gross negligence",
        }],
        "compliance_risks": [{
            "risk": "Data protection obligations are not specified",
            "severity": "medium",
            "mitigation": "Add a data processing addendum",
        }],
    });
    let overall = overall_from_severities(&risk_assessment);
    risk_assessment["overall_risk_level"] = Value::from(overall.as_str());

    json!({
        "document_summary": {
            "document_type": "Legal Agreement",
            "parties_involved": ["Party A", "Party B"],
            "main_purpose": "This demo document appears to be a services agreement covering \
                contractual obligations, liability, payment terms, and dispute resolution.",
            "jurisdiction": "State of New York",
            "effective_date": "On signature",
            "expiration_date": "Two years after the effective date",
        },
        "key_provisions": [
            {"section": "Payment Terms", "content": "Invoices are payable within 30 days", "importance": "high"},
            {"section": "Liability", "content": "Aggregate liability capped at 12 months of fees", "importance": "high"},
            {"section": "Termination", "content": "Either party may terminate on 30 days' written notice", "importance": "medium"},
            {"section": "Governing Law", "content": "Laws of the State of New York", "importance": "low"},
        ],
        "risk_assessment": risk_assessment,
        "recommendations": [
            {"priority": "high", "recommendation": "Review the liability cap with legal counsel"},
            {"priority": "medium", "recommendation": "Add a data processing addendum"},
            {"priority": "low", "recommendation": "Document any amendments in writing"},
        ],
        "confidence_score": 0.92,
    })
}

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

fn demo_answer(question: &str) -> String {
    let q = question.to_lowercase();
    if contains_any(&q, &["payment", "pay", "cost", "fee", "price"]) {
        "According to this demo document, payment terms are net 30 days from invoice date. \
         Late payments may incur additional fees as specified in the payment terms section."
            .to_string()
    } else if contains_any(&q, &["termination", "terminate", "end", "cancel"]) {
        "The termination clause in this demo document requires 30 days written notice from \
         either party."
            .to_string()
    } else if contains_any(&q, &["liability", "responsible", "damages"]) {
        "The liability provisions in this demo document limit damages to the amount paid \
         under the agreement."
            .to_string()
    } else if contains_any(&q, &["intellectual", "property", "copyright", "patent"]) {
        "Intellectual property rights in this demo document remain with the original owner. \
         Limited usage rights are granted as specified in the intellectual property clause."
            .to_string()
    } else {
        format!(
            "Based on this demo document, regarding your question about '{question}', the \
             relevant provisions can be found in the main body of the agreement."
        )
    }
}

#[async_trait]
impl DocumentService for DemoService {
    async fn upload(&self, file: &UploadFile) -> Result<Extraction, CollaboratorError> {
        self.validate(file)?;
        let text = demo_text(file);

        let mut metadata = Map::new();
        metadata.insert(
            "file_type".into(),
            Value::from(extension_of(&file.name).unwrap_or_default()),
        );
        metadata.insert("size_bytes".into(), Value::from(file.size_bytes()));
        metadata.insert(
            "word_count".into(),
            Value::from(text.split_whitespace().count()),
        );
        metadata.insert(
            "character_count".into(),
            Value::from(text.chars().count()),
        );
        metadata.insert("demo".into(), Value::Bool(true));

        info!(name = %file.name, "demo extraction");
        Ok(Extraction { text, metadata })
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, CollaboratorError> {
        info!(chars = request.document_text.len(), "demo analysis");
        Ok(RawAnalysis::from_value(demo_analysis()))
    }

    async fn ask(&self, _document_text: &str, question: &str) -> Result<String, CollaboratorError> {
        Ok(demo_answer(question))
    }
}

#[async_trait]
impl AssistService for DemoService {
    async fn health(&self) -> Result<HealthStatus, CollaboratorError> {
        let mut details = Map::new();
        details.insert("demo_mode".into(), Value::Bool(true));
        Ok(HealthStatus {
            status: "healthy".into(),
            details,
        })
    }

    async fn explain(&self, clause: &str, _context: &str) -> Result<String, CollaboratorError> {
        let excerpt: String = clause.chars().take(100).collect();
        Ok(format!(
            "This demo explanation covers the selected clause: '{excerpt}'. In plain language, \
             both parties agree to specific terms and conditions that govern their relationship. \
             Review with legal counsel if unsure."
        ))
    }

    async fn summarize(&self, _text: &str) -> Result<String, CollaboratorError> {
        Ok(SUMMARY.to_string())
    }
}
