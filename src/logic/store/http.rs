//! Audit Store HTTP Client
//!
//! REST client for the decision audit store (`/api/v1`).

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{AuditStore, StoreError, StoreResult};
use crate::config::ConsoleConfig;
use crate::constants;
use crate::logic::model::{
    DecisionRecord, DecisionSummary, HealthReport, IngestReceipt, IngestRequest,
    IntegrityReport, SearchQuery, SearchResultSet, StatisticsSnapshot,
};

/// Audit store connection settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl From<&ConsoleConfig> for StoreConfig {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            timeout: config.timeout(),
        }
    }
}

/// `reqwest`-backed `AuditStore`
pub struct HttpAuditStore {
    config: StoreConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HighRiskResponse {
    #[serde(default)]
    high_risk_decisions: Vec<DecisionSummary>,
}

impl HttpAuditStore {
    /// Create new store client
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("audit-console/{}", constants::APP_VERSION))
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// `{base}/api/v1/{segments...}` with each segment percent-encoded
    fn api_url(&self, segments: &[&str]) -> StoreResult<Url> {
        let root = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            constants::API_PREFIX
        );
        let mut url = Url::parse(&root)
            .map_err(|e| StoreError::Network(format!("invalid store URL {}: {}", root, e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Network(format!("store URL {} cannot carry a path", root)))?
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, query: &[(&str, String)]) -> StoreResult<reqwest::Response> {
        log::debug!("GET {}", url);
        self.http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    /// Decode a success body or turn the response into `Rejected`
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| StoreError::Parse(e.to_string()))
        } else {
            Err(Self::rejection(response).await)
        }
    }

    /// Like `read_json`, but a 404 that names the missing record means it
    /// does not exist. A bare 404 (wrong base URL, proxy) stays an error.
    async fn read_optional<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<Option<T>> {
        if response.status() != StatusCode::NOT_FOUND {
            return Self::read_json(response).await.map(Some);
        }

        let body = response.text().await.unwrap_or_default();
        match extract_detail(&body) {
            Some(detail) => {
                log::debug!("Audit store reports not found: {}", detail);
                Ok(None)
            }
            None => {
                log::warn!("Audit store route not found (404 without detail)");
                Err(StoreError::Rejected {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    detail: None,
                })
            }
        }
    }

    async fn rejection(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        log::warn!("Audit store rejected request ({}): {}", status, body);
        StoreError::Rejected {
            status,
            detail: extract_detail(&body),
        }
    }
}

#[async_trait]
impl AuditStore for HttpAuditStore {
    async fn statistics(&self) -> StoreResult<StatisticsSnapshot> {
        let url = self.api_url(&["statistics"])?;
        Self::read_json(self.get(url, &[]).await?).await
    }

    async fn recent_high_risk(&self, limit: u32) -> StoreResult<Vec<DecisionSummary>> {
        let url = self.api_url(&["analytics", "high-risk-recent"])?;
        let response = self.get(url, &[("limit", limit.to_string())]).await?;
        let body: HighRiskResponse = Self::read_json(response).await?;
        Ok(body.high_risk_decisions)
    }

    async fn search(&self, query: &SearchQuery) -> StoreResult<SearchResultSet> {
        let url = self.api_url(&["search"])?;
        Self::read_json(self.get(url, &query.to_query_pairs()).await?).await
    }

    async fn trace(&self, decision_id: &str) -> StoreResult<Option<DecisionRecord>> {
        let url = self.api_url(&["trace", decision_id])?;
        Self::read_optional(self.get(url, &[]).await?).await
    }

    async fn ingest(&self, request: &IngestRequest) -> StoreResult<IngestReceipt> {
        let url = self.api_url(&["ingest"])?;
        log::info!("Ingesting decision from {}", request.source_system);

        let response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let receipt: IngestReceipt = Self::read_json(response).await?;
        log::info!("Decision ingested: {}", receipt.decision_id);
        Ok(receipt)
    }

    async fn verify(&self, decision_id: &str) -> StoreResult<Option<IntegrityReport>> {
        let url = self.api_url(&["verify", decision_id])?;
        Self::read_optional(self.get(url, &[]).await?).await
    }

    async fn health(&self) -> StoreResult<HealthReport> {
        // Health lives at the origin root, outside the versioned prefix
        let root = format!("{}/health", self.config.base_url.trim_end_matches('/'));
        let url = Url::parse(&root)
            .map_err(|e| StoreError::Network(format!("invalid store URL {}: {}", root, e)))?;
        Self::read_json(self.get(url, &[]).await?).await
    }
}

/// Pull the human-readable message out of an error body.
///
/// FastAPI-style bodies use `detail`; the store's own handler uses `error`.
/// Structured details (validation error lists) are rendered as compact JSON.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let field = value
        .get("detail")
        .filter(|v| !v.is_null())
        .or_else(|| value.get("error"))?;

    match field {
        Value::String(message) => Some(message.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
