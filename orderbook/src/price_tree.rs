//! Ordered price → level map for one side of a book. Backed by a
//! `BTreeMap`, which keeps keys in a strictly increasing sequence; min/max
//! access is O(log n) and empty levels are deleted eagerly.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use rust_decimal::Decimal;

use crate::arena::{Arena, OrderNode, Slot};
use crate::price_level::Level;
use crate::types::{Order, Side};

pub(crate) struct PriceTree {
    side: Side,
    levels: BTreeMap<Decimal, Level>,
    arena: Arena,
}

impl PriceTree {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            arena: Arena::new(),
        }
    }

    /// For asks the best price is the minimum key; for bids, the maximum.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Ask => self.levels.keys().next().copied(),
            Side::Bid => self.levels.keys().next_back().copied(),
        }
    }

    /// Best price not in `skip`, walked in the same best-first order as
    /// [`Self::best_price`]. Lets a taker walk past a level whose only
    /// resting orders were skipped for self-trade prevention instead of
    /// stopping there.
    pub fn best_price_excluding(&self, skip: &std::collections::HashSet<Decimal>) -> Option<Decimal> {
        match self.side {
            Side::Ask => self.levels.keys().find(|p| !skip.contains(p)).copied(),
            Side::Bid => self.levels.keys().rev().find(|p| !skip.contains(p)).copied(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_len(&self, price: Decimal) -> usize {
        self.levels.get(&price).map(|l| l.length).unwrap_or(0)
    }

    pub fn level_volume(&self, price: Decimal) -> Decimal {
        self.levels
            .get(&price)
            .map(|l| l.volume)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn total_volume(&self) -> Decimal {
        self.levels.values().map(|l| l.volume).sum()
    }

    pub fn total_orders(&self) -> usize {
        self.levels.values().map(|l| l.length).sum()
    }

    /// Inserts a resting order (its `price` field must be set) and returns
    /// the slot handle to record in the order index.
    pub fn insert_order(&mut self, order: Order) -> Slot {
        let price = order.price.expect("resting order must carry a price");
        let slot = self.arena.insert(OrderNode {
            order,
            prev: None,
            next: None,
        });
        self.levels.entry(price).or_default().append(&mut self.arena, slot);
        slot
    }

    /// First slot at `price` eligible to match against `exclude_account`
    /// (self-trade skip); with `exclude_account = None`, the FIFO head.
    pub fn find_match_slot(&self, price: Decimal, exclude_account: Option<Address>) -> Option<Slot> {
        self.levels
            .get(&price)?
            .first_eligible(&self.arena, exclude_account)
    }

    pub fn slot_order(&self, slot: Slot) -> &Order {
        &self.arena.get(slot).order
    }

    /// Reduces a resting slot's quantity in place without removing it from
    /// the FIFO (partial maker fill keeps its place in queue).
    pub fn decrement_slot(&mut self, price: Decimal, slot: Slot, fill: Decimal) {
        if let Some(level) = self.levels.get_mut(&price) {
            level.decrement(&mut self.arena, slot, fill);
        }
    }

    /// Removes `slot` entirely (full fill or cancel), deleting the price
    /// level if it becomes empty. Returns the removed order.
    pub fn remove_slot(&mut self, price: Decimal, slot: Slot) -> Option<Order> {
        let empty_after = {
            let level = self.levels.get_mut(&price)?;
            level.unlink(&mut self.arena, slot);
            level.is_empty()
        };
        let node = self.arena.remove(slot);
        if empty_after {
            self.levels.remove(&price);
        }
        Some(node.order)
    }

    /// Best-price-first iterator of `(price, aggregate_volume)` per level,
    /// used for snapshots and market depth.
    pub fn iter_levels_best_first(&self) -> Box<dyn Iterator<Item = (Decimal, Decimal)> + '_> {
        match self.side {
            Side::Ask => Box::new(self.levels.iter().map(|(p, l)| (*p, l.volume))),
            Side::Bid => Box::new(self.levels.iter().rev().map(|(p, l)| (*p, l.volume))),
        }
    }
}
