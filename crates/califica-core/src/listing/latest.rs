//! Latest-request-wins bookkeeping for searches that refetch as the user types.
//!
//! Every request takes a ticket before it starts. When its response arrives
//! it is offered to a slot together with the ticket, and the slot keeps it
//! only if no newer request has been issued since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

/// Identifies one issued request. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out increasing tickets. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: Arc<AtomicU64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Holds the result of the most recently issued request.
#[derive(Debug)]
pub struct LatestSlot<T> {
    sequencer: RequestSequencer,
    value: Mutex<Option<T>>,
}

impl<T: Clone> LatestSlot<T> {
    pub fn new(sequencer: RequestSequencer) -> Self {
        Self {
            sequencer,
            value: Mutex::new(None),
        }
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    /// Store `value` if `ticket` is still the latest one issued.
    /// Returns whether it was stored.
    pub fn offer(&self, ticket: Ticket, value: T) -> bool {
        if !self.sequencer.is_latest(ticket) {
            debug!(ticket = ticket.0, "Discarding stale response");
            return false;
        }
        *self.lock() = Some(value);
        true
    }

    pub fn get(&self) -> Option<T> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tickets_increase() {
        let seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.clone().issue();
        assert!(b > a);
        assert!(!seq.is_latest(a));
        assert!(seq.is_latest(b));
    }

    #[test]
    fn test_older_response_discarded() {
        let slot = LatestSlot::new(RequestSequencer::new());
        let ana = slot.sequencer().issue();
        let an = slot.sequencer().issue();

        assert!(slot.offer(an, "results for An"));
        assert!(!slot.offer(ana, "results for Ana"));
        assert_eq!(slot.get(), Some("results for An"));
    }

    #[tokio::test]
    async fn test_out_of_order_tasks_keep_latest() {
        let slot = Arc::new(LatestSlot::new(RequestSequencer::new()));

        let slow_ticket = slot.sequencer().issue();
        let slow = {
            let slot = slot.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                slot.offer(slow_ticket, vec!["Ana Ruiz".to_string()])
            })
        };

        let fast_ticket = slot.sequencer().issue();
        let fast = {
            let slot = slot.clone();
            tokio::spawn(async move {
                slot.offer(fast_ticket, vec!["Ana Ruiz".to_string(), "Andrés Paz".to_string()])
            })
        };

        assert!(fast.await.unwrap());
        assert!(!slow.await.unwrap());
        assert_eq!(slot.get().map(|v| v.len()), Some(2));
    }
}
