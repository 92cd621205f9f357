//! Text rendering of controller view states

use crate::logic::dashboard::DashboardState;
use crate::logic::ingest::{IngestPhase, IngestState};
use crate::logic::model::{DecisionRecord, DecisionSummary, HealthReport};
use crate::logic::search::{SearchResults, SearchState};
use crate::logic::trace::{IntegrityCheck, TraceState, TraceView};

const RULE: &str = "------------------------------------------------------------";

pub fn health(report: &HealthReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Store status: {}\n", report.status));
    for (service, status) in &report.services {
        out.push_str(&format!("  {:<12} {}\n", service, status));
    }
    if let Some(ts) = &report.timestamp {
        out.push_str(&format!("Checked at: {}\n", crate::logic::model::format_local(ts)));
    }
    out
}

pub fn dashboard(state: &DashboardState) -> String {
    let mut out = String::new();
    if state.loading {
        out.push_str("Loading dashboard...\n");
        return out;
    }

    let cards = &state.cards;
    out.push_str(&format!(
        "Total: {}   Low: {}   Medium: {}   High: {}\n",
        cards.total_decisions, cards.low_risk, cards.medium_risk, cards.high_risk
    ));

    out.push_str("\nRisk distribution\n");
    for slice in &state.risk_distribution {
        out.push_str(&format!("  {:<10} {:>6}  {}\n", slice.name, slice.value, slice.fill));
    }

    out.push_str("\nDecisions by source system\n");
    for bar in &state.system_distribution {
        out.push_str(&format!("  {:<24} {:>6}\n", bar.name, bar.count));
    }

    out.push_str("\nRecent high-risk decisions\n");
    if state.high_risk.is_empty() {
        out.push_str("  (none)\n");
    }
    for row in &state.high_risk {
        out.push_str(&summary_row(row));
    }

    if let Some(err) = &state.last_error {
        out.push_str(&format!("\nLast refresh failed: {}\n", err));
    }
    out
}

pub fn search(state: &SearchState) -> String {
    let mut out = String::new();
    if let Some(err) = &state.last_error {
        out.push_str(&format!("Search failed: {}\n", err));
    }
    match &state.results {
        SearchResults::NotSearched => out.push_str("No search run yet\n"),
        SearchResults::Loaded { rows, .. } if rows.is_empty() => {
            out.push_str("No decisions found\n")
        }
        SearchResults::Loaded { total, rows } => {
            out.push_str(&format!("Search Results ({} of {})\n", rows.len(), total));
            for row in rows {
                out.push_str(&summary_row(row));
            }
        }
    }
    out
}

pub fn ingest(state: &IngestState) -> String {
    let mut out = String::new();
    match &state.phase {
        IngestPhase::Editing => {}
        IngestPhase::Submitting => out.push_str("Submitting...\n"),
        IngestPhase::Succeeded { decision_id } => {
            out.push_str(&format!("Decision ingested: {}\n", decision_id));
        }
    }
    if let Some(err) = &state.error {
        out.push_str(&format!("Error: {}\n", err.user_message()));
    }
    out
}

pub fn trace(state: &TraceState) -> String {
    let mut out = match state.view() {
        TraceView::Loading => "Loading...\n".to_string(),
        TraceView::NotFound => "Decision not found\n".to_string(),
        TraceView::Found(record) => record_detail(&record),
    };

    match &state.integrity {
        None => {}
        Some(IntegrityCheck::Checking) => out.push_str("Integrity: checking...\n"),
        Some(IntegrityCheck::Report(report)) => {
            let verdict = if report.is_valid { "VALID" } else { "TAMPERED" };
            out.push_str(&format!("Integrity: {} ({})\n", verdict, report.message));
        }
        Some(IntegrityCheck::NotFound) => out.push_str("Integrity: decision not found\n"),
        Some(IntegrityCheck::Failed(reason)) => {
            out.push_str(&format!("Integrity: check failed ({})\n", reason));
        }
    }
    out
}

fn summary_row(row: &DecisionSummary) -> String {
    format!(
        "  {:<38} {:<20} {:<9} {}\n",
        row.decision_id,
        row.source_system,
        row.risk_level,
        row.local_timestamp()
    )
}

fn record_detail(record: &DecisionRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Decision Trace: {}\n", record.decision_id));
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Source System: {}\n", record.source_system));
    out.push_str(&format!("Risk Level:    {}\n", record.risk_level));
    out.push_str(&format!("Confidence:    {:.1}%\n", record.confidence * 100.0));
    out.push_str(&format!("Timestamp:     {}\n", record.local_timestamp()));
    if let Some(hash) = &record.hash {
        out.push_str(&format!("Hash:          {}\n", hash));
    }

    out.push_str(&format!("\nInput Payload\n{}\n", record.pretty_input()));
    out.push_str(&format!("\nOutput\n{}\n", record.pretty_output()));

    if !record.rules_triggered.is_empty() {
        out.push_str("\nRules Triggered\n");
        for rule in &record.rules_triggered {
            out.push_str(&format!("  - {}\n", rule.label()));
        }
    }

    if !record.review_notes.is_empty() {
        out.push_str("\nReview Notes\n");
        for note in &record.review_notes {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                crate::logic::model::format_local(&note.timestamp),
                note.reviewer,
                note.note
            ));
        }
    }

    if let Some(metadata) = &record.metadata {
        out.push_str(&format!("\nMetadata\n{}\n", crate::logic::model::pretty_json(metadata)));
    }
    out
}
