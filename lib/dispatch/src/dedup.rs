//! Redelivery detection.
//!
//! Telegram retries a webhook delivery until it is acknowledged, reusing
//! the same `update_id`. The ledger remembers a bounded window of recent
//! ids so a retried update is not processed twice.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};
use voice_relay_core::UpdateId;

/// Default number of update ids remembered.
pub const DEFAULT_LEDGER_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct LedgerState {
    seen: HashSet<UpdateId>,
    order: VecDeque<UpdateId>,
}

/// Bounded FIFO set of recently handled update ids.
#[derive(Debug)]
pub struct DeliveryLedger {
    capacity: usize,
    state: Mutex<LedgerState>,
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}

impl DeliveryLedger {
    /// Creates a ledger remembering up to `capacity` ids.
    ///
    /// A capacity of 0 disables de-duplication.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Records `id` and returns true if it had not been seen.
    pub fn first_delivery(&self, id: UpdateId) -> bool {
        if self.capacity == 0 {
            return true;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.seen.insert(id) {
            return false;
        }
        state.order.push_back(id);
        while state.order.len() > self.capacity {
            if let Some(evicted) = state.order.pop_front() {
                state.seen.remove(&evicted);
            }
        }
        true
    }

    /// Returns the number of ids currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_id_is_not_first() {
        let ledger = DeliveryLedger::default();

        assert!(ledger.first_delivery(UpdateId::new(1)));
        assert!(!ledger.first_delivery(UpdateId::new(1)));
        assert!(ledger.first_delivery(UpdateId::new(2)));
    }

    #[test]
    fn oldest_id_is_forgotten_past_capacity() {
        let ledger = DeliveryLedger::new(2);

        ledger.first_delivery(UpdateId::new(1));
        ledger.first_delivery(UpdateId::new(2));
        ledger.first_delivery(UpdateId::new(3));

        assert_eq!(ledger.len(), 2);
        assert!(ledger.first_delivery(UpdateId::new(1)));
        assert!(!ledger.first_delivery(UpdateId::new(3)));
    }

    #[test]
    fn zero_capacity_never_deduplicates() {
        let ledger = DeliveryLedger::new(0);

        assert!(ledger.first_delivery(UpdateId::new(7)));
        assert!(ledger.first_delivery(UpdateId::new(7)));
        assert!(ledger.is_empty());
    }
}
