// Bounded FIFO of pending on-chain actions.

use std::collections::VecDeque;

use crate::model::{BatchAction, MAX_BATCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueueOutcome {
    pub admitted: usize,
    pub dropped: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchQueue {
    items: VecDeque<BatchAction>,
}

impl BatchQueue {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn room(&self) -> usize {
        MAX_BATCH.saturating_sub(self.items.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchAction> {
        self.items.iter()
    }

    /// Appends in order until the cap is hit; the rest is dropped, nothing is rolled back.
    pub fn enqueue(&mut self, actions: impl IntoIterator<Item = BatchAction>) -> EnqueueOutcome {
        let mut outcome = EnqueueOutcome {
            admitted: 0,
            dropped: 0,
        };
        for action in actions {
            if self.items.len() >= MAX_BATCH {
                outcome.dropped += 1;
            } else {
                self.items.push_back(action);
                outcome.admitted += 1;
            }
        }
        outcome
    }

    pub fn front(&self) -> Option<BatchAction> {
        self.items.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<BatchAction> {
        self.items.pop_front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `(n/10)` counter text.
    pub fn counter(&self) -> String {
        format!("({}/{})", self.items.len(), MAX_BATCH)
    }
}
