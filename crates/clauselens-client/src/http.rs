//! HTTP client for the ClauseLens analysis backend.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use clauselens_core::{
    AnalysisRequest, AnalysisType, AssistService, CollaboratorError, DocumentService,
    Extraction, HealthStatus, RawAnalysis, UploadFile,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Envelope(String),
    #[error("failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file type: {0} (accepted: pdf, docx)")]
    Unsupported(String),
    #[error("File is empty")]
    Empty,
    #[error("File size ({size} bytes) exceeds maximum allowed ({max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

impl From<ClientError> for CollaboratorError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Http(e) => CollaboratorError::Transport(e.to_string()),
            ClientError::Server { status, message } => CollaboratorError::Rejected {
                status: Some(status),
                message,
            },
            ClientError::Json(_) | ClientError::Envelope(_) => {
                CollaboratorError::Malformed(e.to_string())
            }
            ClientError::File { .. }
            | ClientError::Unsupported(_)
            | ClientError::Empty
            | ClientError::TooLarge { .. } => CollaboratorError::rejected(e.to_string()),
        }
    }
}

/// Client for the backend's `/health` and `/api/*` endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AskBody<'a> {
    text: &'a str,
    question: &'a str,
}

#[derive(Serialize)]
struct ExplainBody<'a> {
    clause: &'a str,
    context: &'a str,
}

impl ApiClient {
    /// Create a client for the given backend base URL.
    ///
    /// `base_url` should be like `http://localhost:5000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like [`new`](Self::new), with an overall per-request timeout.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.url("/health");
        info!(url = %url, "checking backend health");
        let resp = self.client.get(&url).send().await?;
        let value = read_body(resp).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Upload a file for text extraction.
    pub async fn upload(&self, file: &UploadFile) -> Result<Extraction, ClientError> {
        let url = self.url("/api/upload");
        info!(url = %url, name = %file.name, size = file.size_bytes(), "uploading document");
        let resp = self
            .client
            .post(&url)
            .multipart(file_form(file)?)
            .send()
            .await?;
        let value = read_body(resp).await?;
        extraction_from(&value)
    }

    /// Upload and analyse in one round trip.
    pub async fn upload_and_analyze(
        &self,
        file: &UploadFile,
    ) -> Result<(Extraction, RawAnalysis), ClientError> {
        let url = self.url(&format!(
            "/api/upload-and-analyze?analysis_type={}",
            AnalysisType::Comprehensive.as_str()
        ));
        info!(url = %url, name = %file.name, "uploading document for analysis");
        let resp = self
            .client
            .post(&url)
            .multipart(file_form(file)?)
            .send()
            .await?;
        let value = read_body(resp).await?;
        combined_from(&value)
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, ClientError> {
        let url = self.url("/api/analyze");
        info!(url = %url, chars = request.document_text.len(), "requesting analysis");
        let value = self.post_json(&url, request).await?;
        analysis_from(&value)
    }

    pub async fn ask(&self, document_text: &str, question: &str) -> Result<String, ClientError> {
        let url = self.url("/api/ask");
        info!(url = %url, "asking question");
        let body = AskBody {
            text: document_text,
            question,
        };
        let value = self.post_json(&url, &body).await?;
        text_field(&value, "answer")
    }

    pub async fn explain(&self, clause: &str, context: &str) -> Result<String, ClientError> {
        let url = self.url("/api/explain");
        info!(url = %url, "requesting clause explanation");
        let value = self.post_json(&url, &ExplainBody { clause, context }).await?;
        text_field(&value, "explanation")
    }

    pub async fn summarize(&self, text: &str) -> Result<String, ClientError> {
        let url = self.url("/api/summarize");
        info!(url = %url, chars = text.len(), "requesting summary");
        let value = self.post_json(&url, &json!({ "text": text })).await?;
        text_field(&value, "summary")
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        let resp = self.client.post(url).json(body).send().await?;
        read_body(resp).await
    }
}

fn file_form(file: &UploadFile) -> Result<reqwest::multipart::Form, ClientError> {
    let part = reqwest::multipart::Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)?;
    Ok(reqwest::multipart::Form::new().part("file", part))
}

async fn read_body(resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    parse_body(status, &body)
}

// ── Response parsing ──

/// Interpret a backend response.
///
/// Non-2xx statuses become [`ClientError::Server`] with the body's
/// `error.message` when present, else `HTTP error! status: <code>`. A 2xx
/// envelope with `success: false` is a failure too.
fn parse_body(status: u16, body: &str) -> Result<Value, ClientError> {
    let parsed = serde_json::from_str::<Value>(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));
        return Err(ClientError::Server { status, message });
    }

    let value = parsed?;
    if value.get("success") == Some(&Value::Bool(false)) {
        let message = error_message(&value).unwrap_or_else(|| "request failed".to_string());
        return Err(ClientError::Server { status, message });
    }
    Ok(value)
}

fn error_message(value: &Value) -> Option<String> {
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// `data.<key>` if the response is enveloped, else top-level `<key>`.
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .get("data")
        .and_then(|d| d.get(key))
        .or_else(|| value.get(key))
        .filter(|v| !v.is_null())
}

fn text_field(value: &Value, key: &str) -> Result<String, ClientError> {
    field(value, key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClientError::Envelope(format!("missing `{key}`")))
}

fn extraction_from(value: &Value) -> Result<Extraction, ClientError> {
    let text = text_field(value, "text")?;
    let metadata = field(value, "metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);
    Ok(Extraction { text, metadata })
}

fn analysis_from(value: &Value) -> Result<RawAnalysis, ClientError> {
    let result = field(value, "result")
        .ok_or_else(|| ClientError::Envelope("missing `result`".to_string()))?;
    Ok(RawAnalysis::from_value(result.clone()))
}

fn combined_from(value: &Value) -> Result<(Extraction, RawAnalysis), ClientError> {
    let extraction = extraction_from(value)?;
    let analysis = field(value, "analysis")
        .ok_or_else(|| ClientError::Envelope("missing `analysis`".to_string()))?;
    let raw = match analysis.get("result") {
        Some(result) => result.clone(),
        None => analysis.clone(),
    };
    Ok((extraction, RawAnalysis::from_value(raw)))
}

// ── Collaborator impls ──

#[async_trait]
impl DocumentService for ApiClient {
    async fn upload(&self, file: &UploadFile) -> Result<Extraction, CollaboratorError> {
        Ok(ApiClient::upload(self, file).await?)
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, CollaboratorError> {
        Ok(ApiClient::analyze(self, request).await?)
    }

    async fn ask(&self, document_text: &str, question: &str) -> Result<String, CollaboratorError> {
        Ok(ApiClient::ask(self, document_text, question).await?)
    }

    async fn upload_and_analyze(
        &self,
        file: &UploadFile,
    ) -> Result<(Extraction, RawAnalysis), CollaboratorError> {
        Ok(ApiClient::upload_and_analyze(self, file).await?)
    }
}

#[async_trait]
impl AssistService for ApiClient {
    async fn health(&self) -> Result<HealthStatus, CollaboratorError> {
        Ok(ApiClient::health(self).await?)
    }

    async fn explain(&self, clause: &str, context: &str) -> Result<String, CollaboratorError> {
        Ok(ApiClient::explain(self, clause, context).await?)
    }

    async fn summarize(&self, text: &str) -> Result<String, CollaboratorError> {
        Ok(ApiClient::summarize(self, text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/".into());
        assert_eq!(client.base_url, "http://localhost:5000");
        assert_eq!(client.url("/api/ask"), "http://localhost:5000/api/ask");
    }

    #[test]
    fn server_error_message_is_used() {
        let body = r#"{"success": false, "error": {"message": "File size exceeds limit", "type": "APIError"}}"#;
        match parse_body(413, body) {
            Err(ClientError::Server { status, message }) => {
                assert_eq!(status, 413);
                assert_eq!(message, "File size exceeds limit");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn generic_message_without_error_body() {
        for body in ["<html>Bad Gateway</html>", "{}", r#"{"error": "flat string"}"#] {
            let err = parse_body(502, body).unwrap_err();
            assert_eq!(err.to_string(), "HTTP error! status: 502");
        }
    }

    #[test]
    fn unsuccessful_envelope_with_ok_status() {
        let body = r#"{"success": false, "error": {"message": "AI service error"}, "data": null}"#;
        let err = parse_body(200, body).unwrap_err();
        assert_eq!(err.to_string(), "AI service error");
    }

    #[test]
    fn invalid_json_on_success_is_json_error() {
        assert!(matches!(parse_body(200, "not json"), Err(ClientError::Json(_))));
    }

    #[test]
    fn upload_envelope() {
        let value = parse_body(
            200,
            r#"{"success": true, "data": {"text": "Lease terms", "metadata": {"pages": 2}}}"#,
        )
        .unwrap();
        let ex = extraction_from(&value).unwrap();
        assert_eq!(ex.text, "Lease terms");
        assert_eq!(ex.metadata["pages"], 2);
    }

    #[test]
    fn upload_without_text_is_envelope_error() {
        let value = parse_body(200, r#"{"success": true, "data": {"metadata": {}}}"#).unwrap();
        assert!(matches!(
            extraction_from(&value),
            Err(ClientError::Envelope(_))
        ));
    }

    #[test]
    fn analysis_envelope_object_and_text() {
        let value = parse_body(
            200,
            r#"{"success": true, "data": {"result": {"confidence_score": 0.9}}}"#,
        )
        .unwrap();
        let raw = analysis_from(&value).unwrap();
        assert_eq!(raw.group("confidence_score"), Some(&json!(0.9)));

        let value = json!({"success": true, "data": {"result": "```json\n{\"confidence_score\": 0.4}\n```"}});
        let raw = analysis_from(&value).unwrap();
        assert_eq!(raw.group("confidence_score"), Some(&json!(0.4)));
    }

    #[test]
    fn combined_envelope_accepts_both_analysis_shapes() {
        let nested = json!({"data": {
            "text": "t",
            "metadata": {},
            "analysis": {"result": {"confidence_score": 0.5}},
        }});
        let flat = json!({"data": {
            "text": "t",
            "analysis": {"confidence_score": 0.5},
        }});
        for value in [nested, flat] {
            let (ex, raw) = combined_from(&value).unwrap();
            assert_eq!(ex.text, "t");
            assert_eq!(raw.group("confidence_score"), Some(&json!(0.5)));
        }
    }

    #[test]
    fn bare_answer_fields() {
        assert_eq!(
            text_field(&json!({"answer": "Net 30"}), "answer").unwrap(),
            "Net 30"
        );
        assert_eq!(
            text_field(&json!({"data": {"summary": "Short"}}), "summary").unwrap(),
            "Short"
        );
        assert!(text_field(&json!({"answer": null}), "answer").is_err());
    }

    #[test]
    fn client_errors_map_to_collaborator_errors() {
        let e: CollaboratorError = ClientError::Server {
            status: 400,
            message: "No file provided".into(),
        }
        .into();
        assert_eq!(
            e,
            CollaboratorError::Rejected {
                status: Some(400),
                message: "No file provided".into()
            }
        );

        let e: CollaboratorError = ClientError::Envelope("missing `answer`".into()).into();
        assert!(matches!(e, CollaboratorError::Malformed(_)));

        let e: CollaboratorError = ClientError::Empty.into();
        assert_eq!(e.to_string(), "File is empty");
    }
}
