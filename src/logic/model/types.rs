//! Audit Types
//!
//! Wire and view types for the decision audit store.
//! No controller logic lives here.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::wire::{flexible_timestamp, ordered_counts};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Risk classification attached to every decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// `high` or `critical`
    pub fn is_high_risk(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }

    /// Chart color, fixed per level
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#10B981",      // Green
            RiskLevel::Medium => "#F59E0B",   // Amber
            RiskLevel::High => "#EF4444",     // Red
            RiskLevel::Critical => "#DC2626", // Dark red
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk level {0:?} (expected low, medium, high or critical)")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

// ============================================================================
// DECISION RECORDS
// ============================================================================

/// Rule entry on a decision.
///
/// The store records full rule evaluations; older producers send bare labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleRef {
    Detailed(RuleEvaluation),
    Label(String),
    Other(Value),
}

impl RuleRef {
    pub fn label(&self) -> &str {
        match self {
            RuleRef::Detailed(rule) => &rule.rule_name,
            RuleRef::Label(label) => label,
            RuleRef::Other(_) => "unrecognised rule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub rule_id: String,
    pub rule_name: String,
    pub condition: String,
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Reviewer annotation stored with a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewNote {
    pub reviewer: String,
    pub note: String,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Full audited decision as returned by the trace endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: String,
    pub source_system: String,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub input_payload: Value,
    pub output: Value,
    #[serde(default)]
    pub rules_triggered: Vec<RuleRef>,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    /// Integrity hash computed by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub review_notes: Vec<ReviewNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl DecisionRecord {
    pub fn summary(&self) -> DecisionSummary {
        DecisionSummary {
            decision_id: self.decision_id.clone(),
            source_system: self.source_system.clone(),
            timestamp: self.timestamp,
            risk_level: self.risk_level,
        }
    }

    pub fn pretty_input(&self) -> String {
        pretty_json(&self.input_payload)
    }

    pub fn pretty_output(&self) -> String {
        pretty_json(&self.output)
    }

    pub fn local_timestamp(&self) -> String {
        format_local(&self.timestamp)
    }
}

/// List row for dashboard and search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub decision_id: String,
    pub source_system: String,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub risk_level: RiskLevel,
}

impl DecisionSummary {
    pub fn local_timestamp(&self) -> String {
        format_local(&self.timestamp)
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Aggregate view over all records, recomputed by the store on every fetch.
///
/// Both breakdowns keep the order the store sent them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    #[serde(default)]
    pub total_decisions: u64,
    #[serde(default, with = "ordered_counts")]
    pub by_risk_level: Vec<(RiskLevel, u64)>,
    #[serde(default, with = "ordered_counts")]
    pub by_source_system: Vec<(String, u64)>,
}

impl StatisticsSnapshot {
    /// Count for one level, 0 when the store omitted it
    pub fn risk_count(&self, level: RiskLevel) -> u64 {
        self.by_risk_level
            .iter()
            .filter(|(key, _)| *key == level)
            .map(|(_, count)| *count)
            .sum()
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Filter sent to the search endpoint. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl SearchQuery {
    /// Query-string pairs for the set fields only
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(system) = &self.source_system {
            pairs.push(("source_system", system.clone()));
        }
        if let Some(level) = self.risk_level {
            pairs.push(("risk_level", level.as_str().to_string()));
        }
        if let Some(text) = &self.search_text {
            pairs.push(("search_text", text.clone()));
        }
        pairs
    }

    pub fn is_unconstrained(&self) -> bool {
        self.source_system.is_none() && self.risk_level.is_none() && self.search_text.is_none()
    }
}

/// Results of one search, replaced wholesale by the next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSet {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub results: Vec<DecisionSummary>,
}

// ============================================================================
// INGESTION
// ============================================================================

/// Body of `POST /ingest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub source_system: String,
    pub input_payload: Value,
    pub output: Value,
    pub rules_triggered: Vec<RuleRef>,
    pub confidence: f64,
    pub risk_level: RiskLevel,
}

/// The part of the ingest response the console needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub decision_id: String,
}

// ============================================================================
// INTEGRITY & HEALTH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub decision_id: String,
    pub is_valid: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    #[serde(default, with = "flexible_timestamp::option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render an instant in the operator's local time zone
pub fn format_local(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
