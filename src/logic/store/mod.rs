//! Audit Store Module - Console to Store Communication
//!
//! This module handles:
//! - The `AuditStore` seam every controller talks through
//! - The HTTP implementation against the store's REST API
//! - Store error taxonomy

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::{HttpAuditStore, StoreConfig};

use async_trait::async_trait;
use thiserror::Error;

use crate::logic::model::{
    DecisionRecord, DecisionSummary, HealthReport, IngestReceipt, IngestRequest,
    IntegrityReport, SearchQuery, SearchResultSet, StatisticsSnapshot,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transport failure: connection refused, timeout, DNS
    #[error("Network error: {0}")]
    Network(String),

    /// The store answered with a non-success status
    #[error("Request rejected ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    /// The store answered 2xx with a body we could not decode
    #[error("Parse error: {0}")]
    Parse(String),
}

impl StoreError {
    /// Human-readable message sent by the store, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            StoreError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Asynchronous request client for the remote audit store
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Aggregate statistics over all decisions
    async fn statistics(&self) -> StoreResult<StatisticsSnapshot>;

    /// Up to `limit` newest decisions rated high or critical
    async fn recent_high_risk(&self, limit: u32) -> StoreResult<Vec<DecisionSummary>>;

    async fn search(&self, query: &SearchQuery) -> StoreResult<SearchResultSet>;

    /// Full record; `Ok(None)` when the store reports it absent
    async fn trace(&self, decision_id: &str) -> StoreResult<Option<DecisionRecord>>;

    async fn ingest(&self, request: &IngestRequest) -> StoreResult<IngestReceipt>;

    /// Recompute the record hash on the store side
    async fn verify(&self, decision_id: &str) -> StoreResult<Option<IntegrityReport>>;

    async fn health(&self) -> StoreResult<HealthReport>;
}
