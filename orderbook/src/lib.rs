//! In-memory limit order book with deterministic price-time priority
//! matching (C1-C4). Pure computation — no I/O, no async, no chain or
//! settlement awareness. Callers (the book registry, the exchange service)
//! own concurrency and persistence decisions.
//!
//! Module layout mirrors the book's own structure: an [`arena`] of order
//! slots backs per-price [`price_level`] FIFOs, which a [`price_tree`]
//! orders by price per side; a global [`index`] maps order ids to their
//! slot so cancellation is O(1). [`book`] ties these into the public
//! [`OrderBook`] API; [`tape`] is the append-only trade record.

mod arena;
pub mod book;
pub mod decimal;
pub mod error;
mod index;
mod price_level;
mod price_tree;
pub mod tape;
pub mod types;

pub use book::{BookSnapshot, MatchingConfig, OrderBook};
pub use decimal::TickConfig;
pub use error::BookError;
pub use tape::Tape;
pub use types::{Amount, NetworkId, NewOrder, Order, OrderId, OrderType, Party, Side, Trade, TradeId};
