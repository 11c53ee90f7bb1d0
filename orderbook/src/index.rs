//! Global map from `order_id` to a stable handle: which side, which price
//! level, which arena slot. Presence in the index is equivalent to presence
//! in exactly one level.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::arena::Slot;
use crate::types::{OrderId, Side};

#[derive(Clone, Copy, Debug)]
pub(crate) struct IndexEntry {
    pub side: Side,
    pub price: Decimal,
    pub slot: Slot,
}

#[derive(Default)]
pub(crate) struct OrderIndex {
    entries: HashMap<OrderId, IndexEntry>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: OrderId, entry: IndexEntry) {
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: OrderId) -> Option<IndexEntry> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: OrderId) -> Option<IndexEntry> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
