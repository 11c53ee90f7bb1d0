//! Core domain types shared by the matching engine: orders, trades and the
//! chain/asset identifiers that travel with them.

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed-precision price or quantity. Never a native float — see the
/// tick/rounding helpers in [`crate::decimal`].
pub type Amount = Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeId(pub u64);

/// EVM chain identifier (e.g. 1 for Ethereum mainnet, 8453 for Base).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

/// Request to admit a new order. The book assigns `id` and `timestamp` on
/// admission; a fully-formed [`Order`] never exists before that point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    pub account: Address,
    pub base_asset: String,
    pub quote_asset: String,
    pub side: Side,
    pub kind: OrderType,
    /// Required for `Limit`, ignored for `Market`.
    pub price: Option<Decimal>,
    pub quantity: Decimal,
    pub from_network: NetworkId,
    pub to_network: NetworkId,
    pub receive_wallet: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub account: Address,
    pub base_asset: String,
    pub quote_asset: String,
    pub side: Side,
    pub kind: OrderType,
    pub price: Option<Decimal>,
    pub quantity: Decimal,
    pub from_network: NetworkId,
    pub to_network: NetworkId,
    pub receive_wallet: Address,
    pub timestamp: u128,
}

impl Order {
    pub fn symbol(&self) -> String {
        format!("{}_{}", self.base_asset, self.quote_asset)
    }

    pub(crate) fn from_new(id: OrderId, new: NewOrder, timestamp: u128) -> Self {
        Self {
            id,
            account: new.account,
            base_asset: new.base_asset,
            quote_asset: new.quote_asset,
            side: new.side,
            kind: new.kind,
            price: new.price,
            quantity: new.quantity,
            from_network: new.from_network,
            to_network: new.to_network,
            receive_wallet: new.receive_wallet,
            timestamp,
        }
    }

    pub(crate) fn party(&self) -> Party {
        Party {
            account: self.account,
            side: self.side,
            order_id: self.id,
            receive_wallet: self.receive_wallet,
            from_network: self.from_network,
            to_network: self.to_network,
        }
    }
}

/// One side of a trade: who it belongs to and where settlement must land.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub account: Address,
    pub side: Side,
    pub order_id: OrderId,
    pub receive_wallet: Address,
    pub from_network: NetworkId,
    pub to_network: NetworkId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub symbol: String,
    pub timestamp: u128,
    pub price: Decimal,
    pub quantity: Decimal,
    pub maker: Party,
    pub taker: Party,
}

impl Trade {
    /// Same-chain trade: both parties' from/to network agree on one chain.
    pub fn is_same_chain(&self) -> bool {
        self.maker.from_network == self.maker.to_network
            && self.taker.from_network == self.taker.to_network
            && self.maker.from_network == self.taker.from_network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn symbol_formats_base_quote() {
        let order = Order {
            id: OrderId(1),
            account: addr(1),
            base_asset: "HBAR".into(),
            quote_asset: "USDT".into(),
            side: Side::Ask,
            kind: OrderType::Limit,
            price: Some(Decimal::new(5, 0)),
            quantity: Decimal::new(100, 0),
            from_network: NetworkId(1),
            to_network: NetworkId(1),
            receive_wallet: addr(2),
            timestamp: 1,
        };
        assert_eq!(order.symbol(), "HBAR_USDT");
    }

    #[test]
    fn same_chain_detection() {
        let maker = Party {
            account: addr(1),
            side: Side::Ask,
            order_id: OrderId(1),
            receive_wallet: addr(2),
            from_network: NetworkId(1),
            to_network: NetworkId(1),
        };
        let taker_same = Party {
            from_network: NetworkId(1),
            to_network: NetworkId(1),
            ..maker
        };
        let taker_cross = Party {
            from_network: NetworkId(2),
            to_network: NetworkId(1),
            ..maker
        };
        let trade_same = Trade {
            trade_id: TradeId(1),
            symbol: "HBAR_USDT".into(),
            timestamp: 0,
            price: Decimal::ONE,
            quantity: Decimal::ONE,
            maker,
            taker: taker_same,
        };
        assert!(trade_same.is_same_chain());

        let trade_cross = Trade {
            taker: taker_cross,
            ..trade_same
        };
        assert!(!trade_cross.is_same_chain());
    }
}
