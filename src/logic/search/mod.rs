//! Search Controller
//!
//! Composes a filter from up to three optional fields and runs it on
//! explicit submission. Blank fields are left out of the request.


use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::logic::lifecycle::RequestGuard;
use crate::logic::model::{DecisionSummary, RiskLevel, SearchQuery};
use crate::logic::navigation::Navigator;
use crate::logic::store::AuditStore;

/// Search form as typed by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchForm {
    pub source_system: String,
    /// `None` = all risk levels
    pub risk_level: Option<RiskLevel>,
    pub search_text: String,
}

impl SearchForm {
    /// Only the non-blank fields, trimmed
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery {
            source_system: non_blank(&self.source_system),
            risk_level: self.risk_level,
            search_text: non_blank(&self.search_text),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Result list state; "no results" is distinct from "not yet searched"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResults {
    #[default]
    NotSearched,
    Loaded {
        total: u64,
        rows: Vec<DecisionSummary>,
    },
}

impl SearchResults {
    pub fn rows(&self) -> &[DecisionSummary] {
        match self {
            SearchResults::NotSearched => &[],
            SearchResults::Loaded { rows, .. } => rows,
        }
    }

    /// A search ran and matched nothing
    pub fn is_empty_result(&self) -> bool {
        matches!(self, SearchResults::Loaded { rows, .. } if rows.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    pub form: SearchForm,
    pub searching: bool,
    pub results: SearchResults,
    /// Query behind the displayed results
    pub last_query: Option<SearchQuery>,
    pub last_error: Option<String>,
}

pub struct SearchController {
    store: Arc<dyn AuditStore>,
    navigator: Navigator,
    state: RwLock<SearchState>,
    guard: RequestGuard,
}

impl SearchController {
    pub fn new(store: Arc<dyn AuditStore>, navigator: Navigator) -> Self {
        Self {
            store,
            navigator,
            state: RwLock::new(SearchState::default()),
            guard: RequestGuard::new(),
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.read().clone()
    }

    pub fn set_source_system(&self, value: impl Into<String>) {
        self.state.write().form.source_system = value.into();
    }

    pub fn set_risk_level(&self, level: Option<RiskLevel>) {
        self.state.write().form.risk_level = level;
    }

    pub fn set_search_text(&self, value: impl Into<String>) {
        self.state.write().form.search_text = value.into();
    }

    /// Run the current form against the store.
    ///
    /// Only the latest submission may update the results; on failure the
    /// previous results stay on screen.
    pub async fn submit(&self) {
        let ticket = self.guard.issue();
        let query = {
            let mut state = self.state.write();
            state.searching = true;
            state.form.to_query()
        };

        if query.is_unconstrained() {
            log::debug!("Search #{}: no filters, listing all decisions", ticket.seq());
        } else {
            log::debug!("Search #{}: {:?}", ticket.seq(), query);
        }
        let result = self.store.search(&query).await;

        let applied = self.guard.apply_if_current(ticket, || {
            let mut state = self.state.write();
            state.searching = false;
            match result {
                Ok(found) => {
                    log::info!("Search returned {} of {} decisions", found.results.len(), found.total);
                    state.results = SearchResults::Loaded {
                        total: found.total,
                        rows: found.results,
                    };
                    state.last_query = Some(query);
                    state.last_error = None;
                }
                Err(e) => {
                    log::error!("Search error: {}", e);
                    state.last_error = Some(e.to_string());
                }
            }
        });

        if applied.is_none() {
            log::debug!("Search #{} superseded, response dropped", ticket.seq());
        }
    }

    /// Follow a result row to its trace
    pub fn open_result(&self, decision_id: &str) {
        self.navigator.open_trace(decision_id);
    }

    /// View torn down: drop any response still in flight
    pub fn close(&self) {
        self.guard.close();
    }
}
