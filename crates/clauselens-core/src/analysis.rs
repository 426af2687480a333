//! Raw analysis payloads as returned by the AI service.
//!
//! The backend promises a `comprehensive` shape (`document_summary`,
//! `key_provisions`, `risk_assessment`, `recommendations`,
//! `confidence_score`), but any group may be missing, mistyped, or the whole
//! result may arrive as unparsed model text. [`RawAnalysis`] keeps the payload
//! untyped; [`crate::normalize`] is the only place that interprets it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// An analysis result exactly as the backend produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAnalysis(pub Value);

impl RawAnalysis {
    /// Wrap a backend value.
    ///
    /// Objects pass through, strings are treated as model output and mined for
    /// a JSON object, anything else becomes an empty mapping.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => Self(value),
            Value::String(text) => Self::from_model_text(&text),
            _ => Self::empty(),
        }
    }

    /// Recover a JSON object from raw model text.
    ///
    /// Strips markdown code fences and parses the outermost `{...}` span.
    /// Text without a parseable object yields an empty mapping.
    pub fn from_model_text(text: &str) -> Self {
        match extract_json_object(text) {
            Some(map) => Self(Value::Object(map)),
            None => {
                debug!(len = text.len(), "no JSON object in model text");
                Self::empty()
            }
        }
    }

    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// A top-level group, if present and not null.
    pub fn group(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let s = strip_fences(text);
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&s[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_passes_through() {
        let raw = RawAnalysis::from_value(json!({"confidence_score": 0.9}));
        assert_eq!(raw.group("confidence_score"), Some(&json!(0.9)));
    }

    #[test]
    fn fenced_model_text_is_recovered() {
        let text = "```json\n{\"risk_assessment\": {\"overall_risk_level\": \"low\"}}\n```";
        let raw = RawAnalysis::from_value(Value::String(text.into()));
        assert_eq!(
            raw.group("risk_assessment"),
            Some(&json!({"overall_risk_level": "low"}))
        );
    }

    #[test]
    fn prose_around_json_is_ignored() {
        let text = "Here is the analysis:\n{\"confidence_score\": 0.7}\nHope this helps.";
        let raw = RawAnalysis::from_model_text(text);
        assert_eq!(raw.group("confidence_score"), Some(&json!(0.7)));
    }

    #[test]
    fn unparseable_text_is_empty() {
        assert_eq!(RawAnalysis::from_model_text("no json here"), RawAnalysis::empty());
        assert_eq!(RawAnalysis::from_model_text("} backwards {"), RawAnalysis::empty());
        assert_eq!(RawAnalysis::from_model_text("{broken"), RawAnalysis::empty());
    }

    #[test]
    fn non_object_values_are_empty() {
        assert_eq!(RawAnalysis::from_value(json!([1, 2])), RawAnalysis::empty());
        assert_eq!(RawAnalysis::from_value(Value::Null), RawAnalysis::empty());
    }

    #[test]
    fn null_groups_are_absent() {
        let raw = RawAnalysis::from_value(json!({"document_summary": null}));
        assert!(raw.group("document_summary").is_none());
    }
}
