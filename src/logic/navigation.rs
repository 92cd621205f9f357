//! Navigation Events
//!
//! Controllers never route themselves; they emit events and the shell
//! (browser router, CLI) decides what to open.

use tokio::sync::mpsc;

/// Navigation requested by a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Open the trace view for one decision
    OpenTrace { decision_id: String },
}

impl NavigationEvent {
    /// Route path of the target view
    pub fn path(&self) -> String {
        match self {
            NavigationEvent::OpenTrace { decision_id } => format!("/decision/{}", decision_id),
        }
    }
}

/// Sending half of the navigation channel, cloned into each controller
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<NavigationEvent>,
}

impl Navigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavigationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: NavigationEvent) {
        if let Err(e) = self.tx.send(event) {
            // Silent fail - the shell may already be gone
            log::warn!("Navigation receiver dropped, event '{}' dropped", e.0.path());
        }
    }

    pub fn open_trace(&self, decision_id: &str) {
        self.emit(NavigationEvent::OpenTrace {
            decision_id: decision_id.to_string(),
        });
    }
}
