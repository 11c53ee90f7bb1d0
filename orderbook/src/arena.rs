//! Slab arena for resting order slots, breaking the cyclic reference a plain
//! linked list would need between a price level and the order index. A
//! [`Level`](crate::price_level::Level) holds the handle for its head/tail;
//! the order index holds the same handle for O(1) removal. Orders never
//! hold a pointer back into the book.

use crate::types::Order;

#[derive(Debug)]
pub(crate) struct OrderNode {
    pub order: Order,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

/// Stable handle into an [`Arena`]. Reused after removal, so callers must
/// not retain a handle past the point its owning order is removed.
pub type Slot = usize;

#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<OrderNode>>,
    free: Vec<Slot>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: OrderNode) -> Slot {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(node);
            slot
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    pub fn remove(&mut self, slot: Slot) -> OrderNode {
        let node = self.slots[slot]
            .take()
            .expect("slot removed while still linked");
        self.free.push(slot);
        node
    }

    pub fn get(&self, slot: Slot) -> &OrderNode {
        self.slots[slot]
            .as_ref()
            .expect("slot accessed after removal")
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut OrderNode {
        self.slots[slot]
            .as_mut()
            .expect("slot accessed after removal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NetworkId, OrderId, OrderType, Side};
    use alloy_primitives::Address;
    use rust_decimal::Decimal;

    fn sample_order(id: u64) -> Order {
        Order {
            id: OrderId(id),
            account: Address::repeat_byte(1),
            base_asset: "HBAR".into(),
            quote_asset: "USDT".into(),
            side: Side::Ask,
            kind: OrderType::Limit,
            price: Some(Decimal::ONE),
            quantity: Decimal::ONE,
            from_network: NetworkId(1),
            to_network: NetworkId(1),
            receive_wallet: Address::repeat_byte(2),
            timestamp: 0,
        }
    }

    #[test]
    fn reuses_freed_slots() {
        let mut arena = Arena::new();
        let a = arena.insert(OrderNode {
            order: sample_order(1),
            prev: None,
            next: None,
        });
        let b = arena.insert(OrderNode {
            order: sample_order(2),
            prev: None,
            next: None,
        });
        assert_ne!(a, b);
        arena.remove(a);
        let c = arena.insert(OrderNode {
            order: sample_order(3),
            prev: None,
            next: None,
        });
        assert_eq!(a, c, "freed slot should be recycled");
    }
}
