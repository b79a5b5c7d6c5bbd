//! Ordering of in-flight weather requests.
//!
//! Requests are not cancelled once issued; instead each one carries a ticket
//! and only the newest ticket may update the page. Used by the dashboard's
//! search and locate handlers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Hands out tickets; the last one handed out wins.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier ticket.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no request was started after `ticket`.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ticket_is_current() {
        let seq = RequestSequencer::new();
        let t = seq.begin();
        assert!(seq.is_current(t));
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let seq = RequestSequencer::new();
        let older = seq.begin();
        let newer = seq.begin();
        assert!(!seq.is_current(older));
        assert!(seq.is_current(newer));
        assert!(newer > older);
    }

    #[test]
    fn ticket_stays_current_until_next_begin() {
        let seq = RequestSequencer::new();
        let t = seq.begin();
        assert!(seq.is_current(t));
        assert!(seq.is_current(t));
        seq.begin();
        assert!(!seq.is_current(t));
    }
}
