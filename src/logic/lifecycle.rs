//! Request Lifecycle Guard
//!
//! Every controller hands out a `Ticket` per request and only lets a
//! response touch view state while the ticket is still valid:
//! - `apply_if_current`: ticket is the latest one issued (search, trace)
//! - `apply_if_live`: ticket belongs to the current open epoch (dashboard)
//!
//! `close()` invalidates every outstanding ticket. The closure passed to
//! `apply_*` runs under the guard lock, so once `close()` returns no late
//! response can write.

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    seq: u64,
}

impl Ticket {
    /// Monotonic request number, unique per guard
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
struct GuardState {
    epoch: u64,
    latest: u64,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct RequestGuard {
    inner: Mutex<GuardState>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket
    pub fn issue(&self) -> Ticket {
        let mut state = self.inner.lock();
        state.latest += 1;
        Ticket {
            epoch: state.epoch,
            seq: state.latest,
        }
    }

    /// Invalidate all outstanding tickets and refuse further writes
    pub fn close(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        state.epoch += 1;
    }

    /// Accept writes again; tickets from before `close()` stay invalid
    pub fn reopen(&self) {
        self.inner.lock().closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn apply_if_current<R>(&self, ticket: Ticket, apply: impl FnOnce() -> R) -> Option<R> {
        let state = self.inner.lock();
        if Self::live(&state, ticket) && ticket.seq == state.latest {
            Some(apply())
        } else {
            None
        }
    }

    pub fn apply_if_live<R>(&self, ticket: Ticket, apply: impl FnOnce() -> R) -> Option<R> {
        let state = self.inner.lock();
        if Self::live(&state, ticket) {
            Some(apply())
        } else {
            None
        }
    }

    fn live(state: &GuardState, ticket: Ticket) -> bool {
        !state.closed && ticket.epoch == state.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_applies() {
        let guard = RequestGuard::new();
        let first = guard.issue();
        let second = guard.issue();

        assert!(second.seq() > first.seq());
        assert_eq!(guard.apply_if_current(first, || 1), None);
        assert_eq!(guard.apply_if_current(second, || 2), Some(2));
        assert_eq!(guard.apply_if_live(first, || 3), Some(3));
    }

    #[test]
    fn test_close_invalidates_outstanding_tickets() {
        let guard = RequestGuard::new();
        let before = guard.issue();
        guard.close();

        assert!(guard.is_closed());
        assert_eq!(guard.apply_if_live(before, || ()), None);
        assert_eq!(guard.apply_if_current(guard.issue(), || ()), None);

        guard.reopen();
        assert_eq!(guard.apply_if_live(before, || ()), None);
        let after = guard.issue();
        assert_eq!(guard.apply_if_current(after, || "fresh"), Some("fresh"));
    }
}
