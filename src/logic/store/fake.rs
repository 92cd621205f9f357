use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{AuditStore, StoreError, StoreResult};
use crate::logic::model::{
    DecisionRecord, DecisionSummary, HealthReport, IngestReceipt, IngestRequest,
    IntegrityReport, RiskLevel, SearchQuery, SearchResultSet, StatisticsSnapshot,
};

/// In-memory store with scripted answers, call counters and delays
pub struct FakeStore {
    pub statistics: Mutex<StoreResult<StatisticsSnapshot>>,
    pub high_risk: Mutex<StoreResult<Vec<DecisionSummary>>>,
    pub search_results: Mutex<StoreResult<SearchResultSet>>,
    pub records: Mutex<HashMap<String, DecisionRecord>>,
    pub trace_error: Mutex<Option<StoreError>>,
    pub ingest_result: Mutex<StoreResult<IngestReceipt>>,
    pub integrity: Mutex<HashMap<String, IntegrityReport>>,

    /// Applied to every call unless a scripted delay is queued
    pub delay: Mutex<Duration>,
    /// Consumed one per `statistics` call
    pub statistics_delays: Mutex<VecDeque<Duration>>,
    /// Per-id delay for `trace`
    pub trace_delays: Mutex<HashMap<String, Duration>>,
    /// Consumed one per `search` call ahead of `delay`/`search_results`
    pub search_script: Mutex<VecDeque<(Duration, StoreResult<SearchResultSet>)>>,

    pub statistics_calls: AtomicU64,
    pub high_risk_calls: AtomicU64,
    pub search_calls: AtomicU64,
    pub trace_calls: AtomicU64,
    pub ingest_calls: AtomicU64,
    pub last_query: Mutex<Option<SearchQuery>>,
    pub last_ingest: Mutex<Option<IngestRequest>>,
    pub last_limit: Mutex<Option<u32>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            statistics: Mutex::new(Ok(StatisticsSnapshot::default())),
            high_risk: Mutex::new(Ok(Vec::new())),
            search_results: Mutex::new(Ok(SearchResultSet::default())),
            records: Mutex::new(HashMap::new()),
            trace_error: Mutex::new(None),
            ingest_result: Mutex::new(Ok(IngestReceipt {
                decision_id: "dec-new".to_string(),
            })),
            integrity: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            statistics_delays: Mutex::new(VecDeque::new()),
            trace_delays: Mutex::new(HashMap::new()),
            search_script: Mutex::new(VecDeque::new()),
            statistics_calls: AtomicU64::new(0),
            high_risk_calls: AtomicU64::new(0),
            search_calls: AtomicU64::new(0),
            trace_calls: AtomicU64::new(0),
            ingest_calls: AtomicU64::new(0),
            last_query: Mutex::new(None),
            last_ingest: Mutex::new(None),
            last_limit: Mutex::new(None),
        }
    }
}

impl FakeStore {
    pub fn set_statistics(&self, stats: StoreResult<StatisticsSnapshot>) {
        *self.statistics.lock() = stats;
    }

    pub fn insert_record(&self, record: DecisionRecord) {
        self.records.lock().insert(record.decision_id.clone(), record);
    }

    pub fn calls(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::SeqCst)
    }

    async fn pause(&self, scripted: Option<Duration>) {
        let delay = scripted.unwrap_or_else(|| *self.delay.lock());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AuditStore for FakeStore {
    async fn statistics(&self) -> StoreResult<StatisticsSnapshot> {
        self.statistics_calls.fetch_add(1, Ordering::SeqCst);
        // Snapshot taken at request time, like a real store would
        let answer = self.statistics.lock().clone();
        let scripted = self.statistics_delays.lock().pop_front();
        self.pause(scripted).await;
        answer
    }

    async fn recent_high_risk(&self, limit: u32) -> StoreResult<Vec<DecisionSummary>> {
        self.high_risk_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_limit.lock() = Some(limit);
        self.pause(None).await;
        self.high_risk
            .lock()
            .clone()
            .map(|rows| rows.into_iter().take(limit as usize).collect())
    }

    async fn search(&self, query: &SearchQuery) -> StoreResult<SearchResultSet> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = Some(query.clone());
        let scripted = self.search_script.lock().pop_front();
        if let Some((delay, answer)) = scripted {
            self.pause(Some(delay)).await;
            return answer;
        }
        self.pause(None).await;
        self.search_results.lock().clone()
    }

    async fn trace(&self, decision_id: &str) -> StoreResult<Option<DecisionRecord>> {
        self.trace_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.trace_delays.lock().get(decision_id).copied();
        self.pause(scripted).await;
        if let Some(err) = self.trace_error.lock().clone() {
            return Err(err);
        }
        Ok(self.records.lock().get(decision_id).cloned())
    }

    async fn ingest(&self, request: &IngestRequest) -> StoreResult<IngestReceipt> {
        self.ingest_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_ingest.lock() = Some(request.clone());
        self.pause(None).await;
        self.ingest_result.lock().clone()
    }

    async fn verify(&self, decision_id: &str) -> StoreResult<Option<IntegrityReport>> {
        self.pause(None).await;
        Ok(self.integrity.lock().get(decision_id).cloned())
    }

    async fn health(&self) -> StoreResult<HealthReport> {
        Ok(HealthReport {
            status: "healthy".to_string(),
            services: BTreeMap::new(),
            timestamp: None,
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn sample_record(id: &str, risk_level: RiskLevel) -> DecisionRecord {
    DecisionRecord {
        decision_id: id.to_string(),
        source_system: "fraud_detection".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        input_payload: json!({"transaction_id": "TXN123", "amount": 5000}),
        output: json!({"decision": "APPROVED", "flags": ["high_value"]}),
        rules_triggered: Vec::new(),
        risk_level,
        confidence: 0.95,
        hash: Some("c0ffee".to_string()),
        review_notes: Vec::new(),
        metadata: None,
    }
}

pub fn sample_summary(id: &str, risk_level: RiskLevel) -> DecisionSummary {
    sample_record(id, risk_level).summary()
}

pub fn sample_statistics() -> StatisticsSnapshot {
    StatisticsSnapshot {
        total_decisions: 20,
        by_risk_level: vec![
            (RiskLevel::Low, 9),
            (RiskLevel::Medium, 5),
            (RiskLevel::High, 4),
            (RiskLevel::Critical, 2),
        ],
        by_source_system: vec![
            ("loan_engine".to_string(), 12),
            ("fraud_detection".to_string(), 8),
        ],
    }
}
