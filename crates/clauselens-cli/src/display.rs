//! Vertical card display for analysis results.
//!
//! Renders a [`NormalizedInsight`] as a grouped, human-readable card. Long
//! lists are capped so a verbose analysis still fits on a screen.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use clauselens_core::{NormalizedInsight, UploadedDocument, parties_display};

const MAX_LIST_ITEMS: usize = 10;
const LABEL_WIDTH: usize = 18;

// ── Public API ──

/// Print an analysis as a vertical card grouped by section.
pub fn print_insight_card(
    insight: &NormalizedInsight,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut out = String::new();
    write_insight_card(&mut out, insight, generated_at)?;
    print!("{out}");
    Ok(())
}

/// Print what the extraction service returned for an upload.
pub fn print_document(document: &UploadedDocument, with_text: bool) -> anyhow::Result<()> {
    let mut out = String::new();
    write_document(&mut out, document, with_text)?;
    print!("{out}");
    Ok(())
}

pub fn write_insight_card(
    out: &mut impl Write,
    insight: &NormalizedInsight,
    generated_at: DateTime<Utc>,
) -> fmt::Result {
    writeln!(out, "=== {} ===", insight.document_type)?;
    writeln!(out, "{}", insight.summary)?;
    writeln!(out)?;

    writeln!(out, "Overview")?;
    field(out, "Parties", &parties_display(&insight.parties))?;
    field(out, "Jurisdiction", &insight.jurisdiction)?;
    field(out, "Effective date", &insight.effective_date)?;
    field(out, "Expiration date", &insight.expiration_date)?;
    field(out, "Confidence", &format!("{}%", insight.confidence_percent))?;
    writeln!(out)?;

    numbered(out, "Key Clauses", &insight.key_clauses)?;

    writeln!(out, "Risk")?;
    field(
        out,
        "Level",
        &format!("{} ({}/100)", insight.risk_level, insight.risk_score),
    )?;
    writeln!(out, "  Factors ({}):", insight.risk_factors.len())?;
    for factor in capped(&insight.risk_factors) {
        writeln!(out, "    - {factor}")?;
    }
    more(out, insight.risk_factors.len())?;
    writeln!(out)?;

    numbered(out, "Recommendations", &insight.recommendations)?;

    writeln!(out, "Comparison")?;
    for row in &insight.comparison_rows {
        writeln!(out, "  {} [{}]", row.aspect, row.impact)?;
        writeln!(out, "    current:     {}", row.current)?;
        writeln!(out, "    recommended: {}", row.recommended)?;
    }
    writeln!(out)?;

    writeln!(out, "Glossary")?;
    for entry in &insight.glossary {
        field(out, &entry.term, &entry.definition)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Generated {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn write_document(
    out: &mut impl Write,
    document: &UploadedDocument,
    with_text: bool,
) -> fmt::Result {
    writeln!(out, "=== {} ===", document.name)?;
    field(out, "Type", &document.mime_type)?;
    field(out, "Size", &format!("{} bytes", document.size_bytes))?;
    field(
        out,
        "Characters",
        &document.extracted_text.chars().count().to_string(),
    )?;
    for (key, value) in &document.extraction_metadata {
        let rendered = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        field(out, key, &rendered)?;
    }
    if with_text {
        writeln!(out)?;
        writeln!(out, "{}", document.extracted_text)?;
    }
    Ok(())
}

// ── Section rendering ──

fn field(out: &mut impl Write, label: &str, value: &str) -> fmt::Result {
    writeln!(out, "  {label:<LABEL_WIDTH$} {value}")
}

fn numbered(out: &mut impl Write, header: &str, items: &[String]) -> fmt::Result {
    writeln!(out, "{header} ({}):", items.len())?;
    for (i, item) in capped(items).iter().enumerate() {
        writeln!(out, "  {:>2}. {item}", i + 1)?;
    }
    more(out, items.len())?;
    writeln!(out)
}

fn capped(items: &[String]) -> &[String] {
    &items[..items.len().min(MAX_LIST_ITEMS)]
}

fn more(out: &mut impl Write, len: usize) -> fmt::Result {
    if len > MAX_LIST_ITEMS {
        writeln!(out, "  ... and {} more", len - MAX_LIST_ITEMS)?;
    }
    Ok(())
}
