//! Ingestion Controller
//!
//! Builds a new decision record from the operator's form, validates it
//! locally, submits it, and on success navigates to the created trace.
//!
//! Phases: `Editing -> Submitting -> Succeeded | Editing (with error)`.
//! Form values are never cleared on error.

#[cfg(test)]
mod tests;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::logic::lifecycle::RequestGuard;
use crate::logic::model::{IngestRequest, RiskLevel};
use crate::logic::navigation::Navigator;
use crate::logic::store::{AuditStore, StoreError};

/// Message shown when the store gives no usable detail
pub const GENERIC_FAILURE: &str = "Failed";

/// New-decision form, kept as typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestForm {
    pub source_system: String,
    pub risk_level: RiskLevel,
    /// Numeric text; the input widget hints [0, 1]
    pub confidence: String,
    /// JSON text
    pub input_payload: String,
    /// JSON text
    pub output: String,
}

impl Default for IngestForm {
    fn default() -> Self {
        Self {
            source_system: String::new(),
            risk_level: RiskLevel::Medium,
            confidence: "0.95".to_string(),
            input_payload: "{}".to_string(),
            output: "{}".to_string(),
        }
    }
}

impl IngestForm {
    /// Validate and parse into the outgoing record. No network involved.
    pub fn build_request(&self) -> Result<IngestRequest, IngestError> {
        if self.source_system.trim().is_empty() {
            return Err(IngestError::MissingField("source_system"));
        }

        let input_payload = parse_json("input_payload", &self.input_payload)?;
        let output = parse_json("output", &self.output)?;

        let confidence: f64 = self
            .confidence
            .trim()
            .parse()
            .ok()
            .filter(|c: &f64| c.is_finite())
            .ok_or_else(|| IngestError::MalformedConfidence(self.confidence.clone()))?;

        Ok(IngestRequest {
            source_system: self.source_system.clone(),
            input_payload,
            output,
            // Not collected by the form yet
            rules_triggered: Vec::new(),
            confidence,
            risk_level: self.risk_level,
        })
    }
}

fn parse_json(field: &'static str, raw: &str) -> Result<Value, IngestError> {
    serde_json::from_str(raw).map_err(|e| IngestError::MalformedJson {
        field,
        reason: e.to_string(),
    })
}

/// Everything that can stop a submission, local or remote
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum IngestError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Malformed JSON in {field}: {reason}")]
    MalformedJson { field: &'static str, reason: String },

    #[error("Confidence must be a number, got {0:?}")]
    MalformedConfidence(String),

    /// Store refused the record and said why; shown verbatim
    #[error("{0}")]
    Rejected(String),

    /// Store or transport failed without a usable message
    #[error("Failed")]
    Failed { cause: String },

    #[error("A submission is already in progress")]
    Busy,

    #[error("The ingestion form has been closed")]
    Closed,
}

impl IngestError {
    /// True for errors caught before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            IngestError::MissingField(_)
                | IngestError::MalformedJson { .. }
                | IngestError::MalformedConfidence(_)
        )
    }

    /// What the operator sees
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        match err.detail() {
            Some(detail) if !detail.trim().is_empty() => IngestError::Rejected(detail.to_string()),
            _ => IngestError::Failed {
                cause: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum IngestPhase {
    #[default]
    Editing,
    Submitting,
    Succeeded { decision_id: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestState {
    pub form: IngestForm,
    pub phase: IngestPhase,
    pub error: Option<IngestError>,
}

pub struct IngestController {
    store: Arc<dyn AuditStore>,
    navigator: Navigator,
    state: RwLock<IngestState>,
    guard: RequestGuard,
}

impl IngestController {
    pub fn new(store: Arc<dyn AuditStore>, navigator: Navigator) -> Self {
        Self {
            store,
            navigator,
            state: RwLock::new(IngestState::default()),
            guard: RequestGuard::new(),
        }
    }

    pub fn state(&self) -> IngestState {
        self.state.read().clone()
    }

    pub fn form(&self) -> IngestForm {
        self.state.read().form.clone()
    }

    /// Edit form fields in place
    pub fn edit(&self, update: impl FnOnce(&mut IngestForm)) {
        update(&mut self.state.write().form);
    }

    /// Validate, submit, and navigate to the new trace on success.
    ///
    /// Returns the assigned decision id, or the error now shown on the form.
    pub async fn submit(&self) -> Result<String, IngestError> {
        if self.guard.is_closed() {
            return Err(IngestError::Closed);
        }

        let request = {
            let mut state = self.state.write();
            if state.phase == IngestPhase::Submitting {
                return Err(IngestError::Busy);
            }
            match state.form.build_request() {
                Ok(request) => {
                    state.phase = IngestPhase::Submitting;
                    state.error = None;
                    request
                }
                Err(e) => {
                    log::warn!("Ingest form rejected locally: {}", e);
                    state.phase = IngestPhase::Editing;
                    state.error = Some(e.clone());
                    return Err(e);
                }
            }
        };

        let ticket = self.guard.issue();
        let result = self.store.ingest(&request).await.map(|r| r.decision_id);

        let outcome = result.map_err(|e| {
            log::error!("Ingest failed: {}", e);
            IngestError::from(e)
        });

        self.guard.apply_if_current(ticket, || {
            let mut state = self.state.write();
            match &outcome {
                Ok(decision_id) => {
                    state.phase = IngestPhase::Succeeded {
                        decision_id: decision_id.clone(),
                    };
                    self.navigator.open_trace(decision_id);
                }
                Err(e) => {
                    state.phase = IngestPhase::Editing;
                    state.error = Some(e.clone());
                }
            }
        });

        outcome
    }

    /// View torn down: a late answer must not touch the form or navigate.
    ///
    /// A submission in flight is abandoned and the phase returns to
    /// `Editing`. Further `submit()` calls are refused with `Closed`.
    pub fn close(&self) {
        self.guard.close();
        let mut state = self.state.write();
        if state.phase == IngestPhase::Submitting {
            state.phase = IngestPhase::Editing;
        }
    }
}
