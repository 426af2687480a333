//! Analysis result normalisation.
//!
//! Maps a [`RawAnalysis`] of any shape into a [`NormalizedInsight`] with every
//! display field populated. For each field the backend value is used when it
//! is present and of the expected type, otherwise a value is derived from a
//! related field, otherwise a fixed fallback applies.
//!
//! Comparison rows and the glossary are never read from the payload; they are
//! recomputed from the other normalised fields by [`comparison_rows`] and
//! [`glossary`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::RawAnalysis;
use crate::risk::{RISK_CATEGORIES, score_for_level};

pub const SUMMARY_FALLBACK: &str =
    "Analysis complete. No summary was returned for this document.";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const UNKNOWN: &str = "Unknown";
pub const RISK_LEVEL_PENDING: &str = "PENDING";
pub const DEFAULT_CONFIDENCE_PERCENT: u8 = 80;

pub const KEY_CLAUSE_FALLBACK: [&str; 4] = [
    "Parties and Scope: Confirm who is bound and what the document covers",
    "Term and Termination: Check duration, renewal, and notice periods",
    "Payment Obligations: Verify amounts, schedules, and late-payment penalties",
    "Liability and Indemnification: Review caps, exclusions, and indemnities",
];

pub const RISK_FACTOR_FALLBACK: [&str; 3] = [
    "Financial exposure has not been assessed",
    "Legal obligations require manual review",
    "Compliance requirements have not been identified",
];

pub const RECOMMENDATION_FALLBACK: [&str; 4] = [
    "Have qualified legal counsel review the full document",
    "Confirm all dates, amounts, and party names are accurate",
    "Clarify any ambiguous terms before signing",
    "Keep the signed copy together with any amendments",
];

/// One row of the "current vs. recommended" comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub aspect: String,
    pub current: String,
    pub recommended: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// Display-ready analysis. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInsight {
    pub summary: String,
    pub document_type: String,
    pub parties: Vec<String>,
    pub jurisdiction: String,
    pub effective_date: String,
    pub expiration_date: String,
    pub key_clauses: Vec<String>,
    /// As the backend spelled it, or `PENDING`. Unrecognised levels are kept for display.
    pub risk_level: String,
    /// 0..=100.
    pub risk_score: u8,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub comparison_rows: Vec<ComparisonRow>,
    pub glossary: Vec<GlossaryEntry>,
    /// 0..=100.
    pub confidence_percent: u8,
}

/// Normalise a raw analysis payload. Pure and total.
pub fn normalize(raw: &RawAnalysis) -> NormalizedInsight {
    let summary_group = raw.group("document_summary");
    let risk_group = raw.group("risk_assessment");

    let risk_level = risk_group
        .and_then(|ra| ra.get("overall_risk_level"))
        .and_then(non_empty_str)
        .unwrap_or_else(|| RISK_LEVEL_PENDING.to_string());
    let risk_score = risk_group
        .and_then(|ra| ra.get("score"))
        .and_then(valid_score)
        .unwrap_or_else(|| score_for_level(&risk_level));

    let mut insight = NormalizedInsight {
        summary: summary_text(raw, summary_group),
        document_type: summary_field(summary_group, "document_type")
            .unwrap_or_else(|| UNKNOWN.to_string()),
        parties: parties(summary_group),
        jurisdiction: summary_field(summary_group, "jurisdiction")
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        effective_date: summary_field(summary_group, "effective_date")
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        expiration_date: summary_field(summary_group, "expiration_date")
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        key_clauses: key_clauses(raw.group("key_provisions")),
        risk_level,
        risk_score,
        risk_factors: risk_factors(risk_group),
        recommendations: recommendations(raw.group("recommendations")),
        comparison_rows: Vec::new(),
        glossary: Vec::new(),
        confidence_percent: confidence_percent(raw.group("confidence_score")),
    };
    insight.comparison_rows = comparison_rows(&insight);
    insight.glossary = glossary(&insight);
    insight
}

// ── Derived tables ──

/// The fixed four-row comparison table, computed from normalised fields.
pub fn comparison_rows(insight: &NormalizedInsight) -> Vec<ComparisonRow> {
    vec![
        row(
            "Document Type",
            insight.document_type.clone(),
            "Clearly identified agreement type",
            "Low",
        ),
        row(
            "Parties Involved",
            parties_display(&insight.parties),
            "All parties named with legal capacity",
            "Medium",
        ),
        row(
            "Risk Level",
            insight.risk_level.clone(),
            "LOW",
            impact_for_score(insight.risk_score),
        ),
        row(
            "Key Provisions",
            format!("{} provisions", insight.key_clauses.len()),
            "All material terms covered",
            "High",
        ),
    ]
}

/// The fixed six-entry glossary, interpolated from normalised fields.
pub fn glossary(insight: &NormalizedInsight) -> Vec<GlossaryEntry> {
    vec![
        entry(
            "Document Type",
            format!("This document is classified as: {}.", insight.document_type),
        ),
        entry(
            "Parties",
            format!(
                "The persons or organisations bound by the document: {}.",
                parties_display(&insight.parties)
            ),
        ),
        entry(
            "Jurisdiction",
            format!("Governing law and forum for disputes: {}.", insight.jurisdiction),
        ),
        entry(
            "Effective Date",
            format!(
                "The date the obligations begin: {}. Expiration: {}.",
                insight.effective_date, insight.expiration_date
            ),
        ),
        entry(
            "Risk Score",
            format!(
                "Overall assessed risk is {} ({}/100).",
                insight.risk_level, insight.risk_score
            ),
        ),
        entry(
            "Confidence Score",
            format!(
                "How certain the analysis is of its findings: {}%.",
                insight.confidence_percent
            ),
        ),
    ]
}

fn row(aspect: &str, current: String, recommended: &str, impact: &str) -> ComparisonRow {
    ComparisonRow {
        aspect: aspect.to_string(),
        current,
        recommended: recommended.to_string(),
        impact: impact.to_string(),
    }
}

fn entry(term: &str, definition: String) -> GlossaryEntry {
    GlossaryEntry {
        term: term.to_string(),
        definition,
    }
}

/// Parties joined for display, or `Not specified` when none were named.
pub fn parties_display(parties: &[String]) -> String {
    if parties.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        parties.join(", ")
    }
}

fn impact_for_score(score: u8) -> &'static str {
    match score {
        75.. => "High",
        40..=74 => "Medium",
        _ => "Low",
    }
}

// ── Field extraction ──

/// Scalar JSON as display text. Strings are trimmed; empty means absent.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

fn summary_field(group: Option<&Value>, key: &str) -> Option<String> {
    group?.get(key).and_then(non_empty_str)
}

fn summary_text(raw: &RawAnalysis, group: Option<&Value>) -> String {
    if let Some(text) = group.and_then(non_empty_str) {
        return text;
    }
    summary_field(group, "main_purpose")
        .or_else(|| summary_field(group, "key_subject_matter"))
        .or_else(|| raw.group("summary").and_then(non_empty_str))
        .unwrap_or_else(|| SUMMARY_FALLBACK.to_string())
}

fn parties(group: Option<&Value>) -> Vec<String> {
    let Some(group) = group else {
        return Vec::new();
    };
    let list = group
        .get("parties_involved")
        .or_else(|| group.get("parties"))
        .and_then(Value::as_array);
    list.map(|items| items.iter().filter_map(non_empty_str).collect())
        .unwrap_or_default()
}

fn key_clauses(provisions: Option<&Value>) -> Vec<String> {
    let clauses: Vec<String> = provisions
        .and_then(Value::as_array)
        .map(|items| items.iter().map(format_provision).collect())
        .unwrap_or_default();
    if clauses.is_empty() {
        return fallback(&KEY_CLAUSE_FALLBACK);
    }
    clauses
}

/// `"<section>: <content>"`; a missing part renders as an empty segment.
fn format_provision(item: &Value) -> String {
    if let Some(text) = item.as_str() {
        return text.to_string();
    }
    let section = item.get("section").and_then(text_of).unwrap_or_default();
    let content = item.get("content").and_then(text_of).unwrap_or_default();
    format!("{section}: {content}")
}

fn risk_factors(group: Option<&Value>) -> Vec<String> {
    let mut factors = Vec::new();
    if let Some(group) = group {
        for category in RISK_CATEGORIES {
            let Some(items) = group.get(*category).and_then(Value::as_array) else {
                continue;
            };
            factors.extend(items.iter().filter_map(|item| described(item, "risk")));
        }
    }
    if factors.is_empty() {
        return fallback(&RISK_FACTOR_FALLBACK);
    }
    factors
}

fn recommendations(group: Option<&Value>) -> Vec<String> {
    let recs: Vec<String> = group
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| described(item, "recommendation"))
                .collect()
        })
        .unwrap_or_default();
    if recs.is_empty() {
        return fallback(&RECOMMENDATION_FALLBACK);
    }
    recs
}

/// A list item that is either plain text or an object carrying `key`.
fn described(item: &Value, key: &str) -> Option<String> {
    non_empty_str(item).or_else(|| item.get(key).and_then(non_empty_str))
}

fn valid_score(value: &Value) -> Option<u8> {
    let score = value.as_f64()?;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return None;
    }
    Some(score.round() as u8)
}

fn confidence_percent(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
        .map_or(DEFAULT_CONFIDENCE_PERCENT, |c| (c * 100.0).round() as u8)
}

fn fallback(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
