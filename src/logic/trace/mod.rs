//! Trace Viewer Controller
//!
//! Holds exactly one decision record for read-only display. A change of
//! id re-triggers the fetch; responses for an id that is no longer shown
//! are dropped.
//!
//! Internally a confirmed absence (`Absent`) and a failed fetch
//! (`Unavailable`) stay distinct; `TraceState::view()` collapses both to
//! `NotFound`.


use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::logic::lifecycle::RequestGuard;
use crate::logic::model::{DecisionRecord, IntegrityReport};
use crate::logic::store::AuditStore;

/// Fetch status for the current id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TraceStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Found(Box<DecisionRecord>),
    /// Store confirmed there is no such record
    Absent,
    /// Transport or server failure
    Unavailable(String),
}

/// What the operator sees
#[derive(Debug, Clone, PartialEq)]
pub enum TraceView {
    Loading,
    Found(Box<DecisionRecord>),
    NotFound,
}

/// Result of the optional store-side hash check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum IntegrityCheck {
    Checking,
    Report(IntegrityReport),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceState {
    pub decision_id: Option<String>,
    pub status: TraceStatus,
    pub integrity: Option<IntegrityCheck>,
}

impl TraceState {
    pub fn view(&self) -> TraceView {
        match &self.status {
            TraceStatus::Idle | TraceStatus::Loading => TraceView::Loading,
            TraceStatus::Found(record) => TraceView::Found(record.clone()),
            TraceStatus::Absent | TraceStatus::Unavailable(_) => TraceView::NotFound,
        }
    }

    pub fn record(&self) -> Option<&DecisionRecord> {
        match &self.status {
            TraceStatus::Found(record) => Some(record),
            _ => None,
        }
    }
}

pub struct TraceController {
    store: Arc<dyn AuditStore>,
    state: RwLock<TraceState>,
    guard: RequestGuard,
    verify_guard: RequestGuard,
}

impl TraceController {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            state: RwLock::new(TraceState::default()),
            guard: RequestGuard::new(),
            verify_guard: RequestGuard::new(),
        }
    }

    pub fn state(&self) -> TraceState {
        self.state.read().clone()
    }

    pub fn view(&self) -> TraceView {
        self.state.read().view()
    }

    /// Show `decision_id`, fetching it unless it is already loaded or loading
    pub async fn show(&self, decision_id: &str) {
        let settled = {
            let state = self.state.read();
            state.decision_id.as_deref() == Some(decision_id)
                && !matches!(state.status, TraceStatus::Idle | TraceStatus::Unavailable(_))
        };
        if settled {
            log::debug!("Trace {} already shown, skipping fetch", decision_id);
            return;
        }
        self.fetch(decision_id).await;
    }

    /// Refetch the current id
    pub async fn reload(&self) {
        let current = self.state.read().decision_id.clone();
        if let Some(decision_id) = current {
            self.fetch(&decision_id).await;
        }
    }

    async fn fetch(&self, decision_id: &str) {
        let ticket = self.guard.issue();
        let started = self.guard.apply_if_current(ticket, || {
            let mut state = self.state.write();
            state.decision_id = Some(decision_id.to_string());
            state.status = TraceStatus::Loading;
            state.integrity = None;
        });
        if started.is_none() {
            return;
        }

        let result = self.store.trace(decision_id).await;

        let applied = self.guard.apply_if_current(ticket, || {
            let mut state = self.state.write();
            state.status = match result {
                Ok(Some(record)) => TraceStatus::Found(Box::new(record)),
                Ok(None) => {
                    log::info!("Decision {} not found", decision_id);
                    TraceStatus::Absent
                }
                Err(e) => {
                    log::error!("Failed to load trace {}: {}", decision_id, e);
                    TraceStatus::Unavailable(e.to_string())
                }
            };
        });

        if applied.is_none() {
            log::debug!("Trace response for {} is stale, dropped", decision_id);
        }
    }

    /// Ask the store to recompute the hash of the shown record
    pub async fn verify_integrity(&self) {
        let Some(decision_id) = self.state.read().decision_id.clone() else {
            return;
        };

        let ticket = self.verify_guard.issue();
        self.verify_guard.apply_if_current(ticket, || {
            self.state.write().integrity = Some(IntegrityCheck::Checking);
        });

        let result = self.store.verify(&decision_id).await;

        self.verify_guard.apply_if_current(ticket, || {
            let mut state = self.state.write();
            if state.decision_id.as_deref() != Some(decision_id.as_str()) {
                return;
            }
            state.integrity = Some(match result {
                Ok(Some(report)) => {
                    if !report.is_valid {
                        log::warn!("Integrity check failed for {}: {}", decision_id, report.message);
                    }
                    IntegrityCheck::Report(report)
                }
                Ok(None) => IntegrityCheck::NotFound,
                Err(e) => {
                    log::error!("Integrity check error for {}: {}", decision_id, e);
                    IntegrityCheck::Failed(e.to_string())
                }
            });
        });
    }

    /// View torn down: drop anything still in flight
    pub fn close(&self) {
        self.guard.close();
        self.verify_guard.close();
    }
}
