//! Risk levels and the tables that turn them into scores.
//!
//! The score table is the canonical one for the dashboard:
//!
//! | level    | score |
//! |----------|-------|
//! | none     | 0     |
//! | low      | 25    |
//! | moderate | 40    |
//! | medium   | 50    |
//! | high     | 75    |
//! | critical | 90    |
//! | pending  | 0     |

use serde_json::Value;

/// Recognised overall risk levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    None,
    Low,
    Moderate,
    Medium,
    High,
    Critical,
    Pending,
}

impl RiskLevel {
    /// Case-insensitive parse; `None` for anything outside the known set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Pending => "pending",
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 25,
            Self::Moderate => 40,
            Self::Medium => 50,
            Self::High => 75,
            Self::Critical => 90,
            Self::Pending => 0,
        }
    }
}

/// Score for a free-form level string; unrecognised levels score 0.
pub fn score_for_level(level: &str) -> u8 {
    RiskLevel::parse(level).map_or(0, |l| l.score())
}

/// Risk categories that feed both the overall level and the risk factor list.
pub const RISK_CATEGORIES: &[&str] = &["financial_risks", "legal_risks", "compliance_risks"];

fn severity_weight(severity: &str) -> Option<u32> {
    match severity.trim().to_ascii_lowercase().as_str() {
        "low" => Some(1),
        "medium" => Some(2),
        "high" => Some(3),
        "critical" => Some(4),
        _ => None,
    }
}

/// Derive an overall level from the categorised risks of a `risk_assessment` group.
///
/// Averages per-item severity (low=1 .. critical=4, missing severity counts as
/// medium). No scorable items yields `Medium`.
pub fn overall_from_severities(risk_assessment: &Value) -> RiskLevel {
    let mut total = 0u32;
    let mut count = 0u32;

    for category in RISK_CATEGORIES {
        let Some(items) = risk_assessment.get(*category).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            let severity = item
                .get("severity")
                .and_then(Value::as_str)
                .unwrap_or("medium");
            if let Some(w) = severity_weight(severity) {
                total += w;
                count += 1;
            }
        }
    }

    if count == 0 {
        return RiskLevel::Medium;
    }

    let average = f64::from(total) / f64::from(count);
    if average <= 1.5 {
        RiskLevel::Low
    } else if average <= 2.5 {
        RiskLevel::Medium
    } else if average <= 3.5 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}
