//! Append-only trade tape. Records are never rewritten or deleted; the tape
//! is bounded so long-running books don't grow without limit.

use std::collections::VecDeque;

use crate::types::Trade;

const DEFAULT_CAPACITY: usize = 100_000;

pub struct Tape {
    capacity: usize,
    records: VecDeque<Trade>,
}

impl Tape {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::new(),
        }
    }

    /// Appends a trade, evicting the oldest record if at capacity. Eviction
    /// never rewrites an existing record, it only drops the oldest one.
    pub fn push(&mut self, trade: Trade) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(trade);
    }

    /// Returns up to the last `limit` trades, oldest first.
    pub fn last(&self, limit: usize) -> Vec<Trade> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}
