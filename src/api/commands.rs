//! Console Commands
//!
//! One entry point per view. Each drives its controller against the store
//! and prints the resulting view state, as text or JSON.

use anyhow::{bail, Result};
use serde::Serialize;
use std::sync::Arc;

use super::render;
use crate::config::ConsoleConfig;
use crate::logic::dashboard::{DashboardConfig, DashboardController};
use crate::logic::ingest::{IngestController, IngestForm};
use crate::logic::navigation::{NavigationEvent, Navigator};
use crate::logic::search::{SearchController, SearchForm};
use crate::logic::store::{AuditStore, HttpAuditStore, StoreConfig};
use crate::logic::trace::{TraceController, TraceView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command runner bound to one store
pub struct Console {
    store: Arc<dyn AuditStore>,
    config: ConsoleConfig,
    output: OutputFormat,
}

impl Console {
    /// Connect to the store named in `config`
    pub fn connect(config: ConsoleConfig, output: OutputFormat) -> Result<Self> {
        let store = HttpAuditStore::new(StoreConfig::from(&config))?;
        log::info!("Using audit store at {}", store.base_url());
        Ok(Self::with_store(Arc::new(store), config, output))
    }

    pub fn with_store(store: Arc<dyn AuditStore>, config: ConsoleConfig, output: OutputFormat) -> Self {
        Self { store, config, output }
    }

    fn emit<T: Serialize>(&self, state: &T, text: impl Fn(&T) -> String) -> Result<()> {
        match self.output {
            OutputFormat::Text => print!("{}", text(state)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(state)?),
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<()> {
        let report = self.store.health().await?;
        self.emit(&report, render::health)?;
        if !report.is_healthy() {
            bail!("audit store reports status {:?}", report.status);
        }
        Ok(())
    }

    /// Run the dashboard until Ctrl-C, or for one refresh cycle with `once`
    pub async fn dashboard(&self, once: bool) -> Result<()> {
        let (navigator, _events) = Navigator::channel();
        let mut controller = DashboardController::new(
            self.store.clone(),
            navigator,
            DashboardConfig::from(&self.config),
        );
        let mut updates = controller.subscribe();
        controller.activate();

        let mut printed = 0;
        let outcome = loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    let state = updates.borrow_and_update().clone();
                    if state.cycles_completed > printed {
                        printed = state.cycles_completed;
                        self.emit(&state, render::dashboard)?;
                        if once {
                            break Ok(());
                        }
                    }
                }
                signal = tokio::signal::ctrl_c() => {
                    log::info!("Interrupted, stopping dashboard");
                    break signal.map_err(anyhow::Error::from);
                }
            }
        };

        controller.deactivate();
        outcome
    }

    pub async fn search(&self, form: SearchForm) -> Result<()> {
        let (navigator, _events) = Navigator::channel();
        let controller = SearchController::new(self.store.clone(), navigator);
        controller.set_source_system(form.source_system);
        controller.set_risk_level(form.risk_level);
        controller.set_search_text(form.search_text);

        controller.submit().await;

        let state = controller.state();
        self.emit(&state, render::search)?;
        if let Some(err) = state.last_error {
            bail!("search failed: {}", err);
        }
        Ok(())
    }

    pub async fn trace(&self, decision_id: &str, verify: bool) -> Result<()> {
        let controller = TraceController::new(self.store.clone());
        controller.show(decision_id).await;
        if verify && controller.state().record().is_some() {
            controller.verify_integrity().await;
        }

        let state = controller.state();
        self.emit(&state, render::trace)?;
        if state.view() == TraceView::NotFound {
            bail!("decision {} not found", decision_id);
        }
        Ok(())
    }

    /// Submit a new decision, then follow navigation to its trace
    pub async fn ingest(&self, form: IngestForm) -> Result<()> {
        let (navigator, mut events) = Navigator::channel();
        let controller = IngestController::new(self.store.clone(), navigator);
        controller.edit(|current| *current = form);

        let submitted = controller.submit().await;
        self.emit(&controller.state(), render::ingest)?;
        if let Err(e) = submitted {
            bail!(e.user_message());
        }

        while let Ok(event) = events.try_recv() {
            log::info!("Navigating to {}", event.path());
            match event {
                NavigationEvent::OpenTrace { decision_id } => self.trace(&decision_id, false).await?,
            }
        }
        Ok(())
    }
}
