//! FIFO queue of resting orders at a single price. Backed by an
//! intrusive doubly-linked list over [`Arena`] slots so that `append` and
//! `unlink` are O(1) regardless of where in the queue a slot sits — needed
//! for self-trade skipping, which may unlink a non-head slot.

use rust_decimal::Decimal;

use crate::arena::{Arena, Slot};

#[derive(Debug, Default)]
pub(crate) struct Level {
    head: Option<Slot>,
    tail: Option<Slot>,
    pub volume: Decimal,
    pub length: usize,
}

impl Level {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn head(&self) -> Option<Slot> {
        self.head
    }

    /// Appends `slot` to the tail of the FIFO. `slot` must already carry its
    /// order in the arena with its quantity set.
    pub fn append(&mut self, arena: &mut Arena, slot: Slot) {
        let qty = arena.get(slot).order.quantity;
        {
            let node = arena.get_mut(slot);
            node.prev = self.tail;
            node.next = None;
        }
        match self.tail {
            Some(tail) => arena.get_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.volume += qty;
        self.length += 1;
    }

    /// Unlinks `slot` from the FIFO in O(1). Does not free the slot in the
    /// arena — the caller decides whether to remove it (full fill, cancel)
    /// or leave it resting elsewhere.
    pub fn unlink(&mut self, arena: &mut Arena, slot: Slot) {
        let (prev, next, qty) = {
            let node = arena.get(slot);
            (node.prev, node.next, node.order.quantity)
        };
        match prev {
            Some(p) => arena.get_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => arena.get_mut(n).prev = prev,
            None => self.tail = prev,
        }
        self.volume -= qty;
        self.length -= 1;
    }

    /// Reduces the resting quantity of `slot` in place (partial maker fill).
    /// `slot` stays at its position in the FIFO — it keeps time priority.
    pub fn decrement(&mut self, arena: &mut Arena, slot: Slot, fill: Decimal) {
        arena.get_mut(slot).order.quantity -= fill;
        self.volume -= fill;
    }

    /// Walks the FIFO from the head, returning the first slot whose order
    /// does not belong to `exclude_account` (self-trade skip). With
    /// `exclude_account = None` this always returns the head.
    pub fn first_eligible(
        &self,
        arena: &Arena,
        exclude_account: Option<alloy_primitives::Address>,
    ) -> Option<Slot> {
        let Some(exclude) = exclude_account else {
            return self.head;
        };
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = arena.get(slot);
            if node.order.account != exclude {
                return Some(slot);
            }
            cursor = node.next;
        }
        None
    }
}
