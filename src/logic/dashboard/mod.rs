//! Dashboard Controller
//!
//! Polls aggregate statistics and the most recent high-risk decisions.
//!
//! - `activate()` spawns an owned scheduler task that starts a refresh cycle
//!   immediately and then every `refresh_interval`.
//! - Each cycle fetches both slices concurrently and is tagged with a
//!   sequence number; a slice is only written if no newer cycle has
//!   written it already.
//! - `deactivate()` (or drop) aborts the scheduler and all in-flight
//!   cycles and closes the request guard, so nothing lands afterwards.

pub mod projection;


pub use projection::{RiskSlice, SummaryCards, SystemBar};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::config::ConsoleConfig;
use crate::constants;
use crate::logic::lifecycle::{RequestGuard, Ticket};
use crate::logic::model::{DecisionSummary, StatisticsSnapshot};
use crate::logic::navigation::Navigator;
use crate::logic::store::{AuditStore, StoreResult};

/// Dashboard polling configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub refresh_interval: Duration,
    pub high_risk_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(constants::DEFAULT_REFRESH_INTERVAL),
            high_risk_limit: constants::DEFAULT_HIGH_RISK_LIMIT,
        }
    }
}

impl From<&ConsoleConfig> for DashboardConfig {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            high_risk_limit: config.high_risk_limit,
        }
    }
}

/// Dashboard view state
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    /// True until the first refresh cycle finishes, success or not
    pub loading: bool,
    pub stats: Option<StatisticsSnapshot>,
    pub cards: SummaryCards,
    pub risk_distribution: Vec<RiskSlice>,
    pub system_distribution: Vec<SystemBar>,
    pub high_risk: Vec<DecisionSummary>,
    /// When any slice was last written
    pub last_refreshed: Option<DateTime<Utc>>,
    /// Failures of the newest completed cycle
    pub last_error: Option<String>,
    pub cycles_completed: u64,

    // Sequence of the cycle that last wrote each slice
    #[serde(skip)]
    stats_seq: u64,
    #[serde(skip)]
    high_risk_seq: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            loading: true,
            stats: None,
            cards: SummaryCards::default(),
            risk_distribution: Vec::new(),
            system_distribution: Vec::new(),
            high_risk: Vec::new(),
            last_refreshed: None,
            last_error: None,
            cycles_completed: 0,
            stats_seq: 0,
            high_risk_seq: 0,
        }
    }
}

impl DashboardState {
    fn set_statistics(&mut self, stats: StatisticsSnapshot) {
        self.cards = SummaryCards::from_snapshot(Some(&stats));
        self.risk_distribution = projection::risk_distribution(&stats);
        self.system_distribution = projection::system_distribution(&stats);
        self.stats = Some(stats);
    }

    fn newest_seq(&self) -> u64 {
        self.stats_seq.max(self.high_risk_seq)
    }
}

struct Shared {
    state: watch::Sender<DashboardState>,
    guard: RequestGuard,
}

impl Shared {
    fn apply(
        &self,
        ticket: Ticket,
        stats: StoreResult<StatisticsSnapshot>,
        high_risk: StoreResult<Vec<DecisionSummary>>,
    ) {
        let seq = ticket.seq();
        let applied = self.guard.apply_if_live(ticket, || {
            self.state.send_modify(|state| {
                let stale = seq < state.newest_seq();
                let mut failures = Vec::new();
                let mut wrote = false;

                match stats {
                    Ok(snapshot) if seq > state.stats_seq => {
                        state.set_statistics(snapshot);
                        state.stats_seq = seq;
                        wrote = true;
                    }
                    Ok(_) => log::debug!("Discarding stale statistics from refresh #{}", seq),
                    Err(e) => {
                        log::error!("Error fetching dashboard statistics: {}", e);
                        failures.push(e.to_string());
                    }
                }

                match high_risk {
                    Ok(rows) if seq > state.high_risk_seq => {
                        state.high_risk = rows;
                        state.high_risk_seq = seq;
                        wrote = true;
                    }
                    Ok(_) => log::debug!("Discarding stale high-risk list from refresh #{}", seq),
                    Err(e) => {
                        log::error!("Error fetching recent high-risk decisions: {}", e);
                        failures.push(e.to_string());
                    }
                }

                state.loading = false;
                state.cycles_completed += 1;
                if wrote {
                    state.last_refreshed = Some(Utc::now());
                }
                // Errors describe the newest cycle only
                if !stale {
                    state.last_error = (!failures.is_empty()).then(|| failures.join("; "));
                }
            })
        });

        if applied.is_none() {
            log::debug!("Dashboard refresh #{} dropped: view deactivated", seq);
        }
    }
}

/// Owns the dashboard view state and its refresh schedule
pub struct DashboardController {
    store: Arc<dyn AuditStore>,
    navigator: Navigator,
    config: DashboardConfig,
    shared: Arc<Shared>,
    scheduler: Option<JoinHandle<()>>,
}

impl DashboardController {
    pub fn new(store: Arc<dyn AuditStore>, navigator: Navigator, config: DashboardConfig) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            store,
            navigator,
            config,
            shared: Arc::new(Shared {
                state,
                guard: RequestGuard::new(),
            }),
            scheduler: None,
        }
    }

    /// Start polling. Must be called inside a tokio runtime; no-op if active.
    pub fn activate(&mut self) {
        if self.scheduler.is_some() {
            return;
        }

        log::info!(
            "Dashboard activated (refresh every {}s, {} high-risk rows)",
            self.config.refresh_interval.as_secs(),
            self.config.high_risk_limit
        );
        self.shared.guard.reopen();
        self.scheduler = Some(tokio::spawn(run_schedule(
            self.store.clone(),
            self.shared.clone(),
            self.config.clone(),
        )));
    }

    /// Stop polling; no state write happens after this returns
    pub fn deactivate(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            self.shared.guard.close();
            scheduler.abort();
            log::info!("Dashboard deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Current view state
    pub fn state(&self) -> DashboardState {
        self.shared.state.borrow().clone()
    }

    /// Change notifications for the view
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.shared.state.subscribe()
    }

    /// Follow a row of the high-risk list
    pub fn open_decision(&self, decision_id: &str) {
        self.navigator.open_trace(decision_id);
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn run_schedule(store: Arc<dyn AuditStore>, shared: Arc<Shared>, config: DashboardConfig) {
    let mut ticker = tokio::time::interval(config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Dropped with this task on abort, which aborts every cycle in it
    let mut cycles = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ticket = shared.guard.issue();
                cycles.spawn(run_cycle(
                    store.clone(),
                    shared.clone(),
                    ticket,
                    config.high_risk_limit,
                ));
            }
            Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        log::error!("Dashboard refresh task panicked: {}", e);
                    }
                }
            }
        }
    }
}

async fn run_cycle(store: Arc<dyn AuditStore>, shared: Arc<Shared>, ticket: Ticket, limit: u32) {
    log::debug!("Dashboard refresh #{} started", ticket.seq());
    let (stats, high_risk) = tokio::join!(store.statistics(), store.recent_high_risk(limit));
    shared.apply(ticket, stats, high_risk);
}
