//! Central limit order book with price-time priority matching.
//!
//! Not thread-safe on its own — the book registry wraps one of these per
//! symbol/venue in a lock; the match loop itself performs no I/O and never
//! suspends.

use rust_decimal::Decimal;

use crate::decimal::TickConfig;
use crate::error::BookError;
use crate::index::{IndexEntry, OrderIndex};
use crate::price_tree::PriceTree;
use crate::tape::Tape;
use crate::types::{NewOrder, Order, OrderId, OrderType, Side, Trade, TradeId};

/// Self-trade handling. Default permits self-matching; set
/// `allow_self_trade = false` to skip resting orders owned by the taker's
/// own account instead.
#[derive(Clone, Copy, Debug)]
pub struct MatchingConfig {
    pub allow_self_trade: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            allow_self_trade: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BookSnapshot {
    /// Descending by price.
    pub bids: Vec<(Decimal, Decimal)>,
    /// Ascending by price.
    pub asks: Vec<(Decimal, Decimal)>,
}

pub struct OrderBook {
    symbol: String,
    bids: PriceTree,
    asks: PriceTree,
    index: OrderIndex,
    tape: Tape,
    tick: TickConfig,
    config: MatchingConfig,
    next_order_seq: u64,
    next_trade_seq: u64,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>, tick: TickConfig, config: MatchingConfig) -> Self {
        Self {
            symbol: symbol.into(),
            bids: PriceTree::new(Side::Bid),
            asks: PriceTree::new(Side::Ask),
            index: OrderIndex::new(),
            tape: Tape::new(),
            tick,
            config,
            next_order_seq: 1,
            next_trade_seq: 1,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn next_order_id(&mut self) -> OrderId {
        let id = self.next_order_seq;
        self.next_order_seq += 1;
        OrderId(id)
    }

    fn next_trade_id(&mut self) -> TradeId {
        let id = self.next_trade_seq;
        self.next_trade_seq += 1;
        TradeId(id)
    }

    fn tree_mut(&mut self, side: Side) -> &mut PriceTree {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    fn tree_ref(&self, side: Side) -> &PriceTree {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Runs the matching loop for `taker` against the opposing side,
    /// appending every trade produced. `taker.quantity` reflects whatever
    /// remains unfilled once this returns.
    fn run_match(&mut self, taker: &mut Order, trades: &mut Vec<Trade>) {
        let opposing_side = taker.side.opposite();
        // Prices where every resting order belongs to the taker's own
        // account (self-trade skip) — walked past rather than stopped at,
        // so STP never masks crossable liquidity one level further out.
        let mut self_only_prices = std::collections::HashSet::new();
        loop {
            if taker.quantity.is_zero() {
                break;
            }
            let Some(best_price) = self
                .tree_ref(opposing_side)
                .best_price_excluding(&self_only_prices)
            else {
                break;
            };
            let crosses = match taker.kind {
                OrderType::Market => true,
                OrderType::Limit => {
                    let limit_price = taker.price.expect("validated at admission");
                    match taker.side {
                        Side::Bid => limit_price >= best_price,
                        Side::Ask => limit_price <= best_price,
                    }
                }
            };
            if !crosses {
                break;
            }

            let exclude = if self.config.allow_self_trade {
                None
            } else {
                Some(taker.account)
            };
            let opposing = self.tree_mut(opposing_side);
            let Some(slot) = opposing.find_match_slot(best_price, exclude) else {
                // Every resting order left at this price belongs to the
                // taker itself; keep walking to the next price level.
                self_only_prices.insert(best_price);
                continue;
            };

            let maker = opposing.slot_order(slot).clone();
            let fill = taker.quantity.min(maker.quantity);
            let trade_id = self.next_trade_id();

            if fill < maker.quantity {
                self.tree_mut(opposing_side)
                    .decrement_slot(best_price, slot, fill);
            } else {
                self.tree_mut(opposing_side).remove_slot(best_price, slot);
                self.index.remove(maker.id);
            }

            trades.push(Trade {
                trade_id,
                symbol: taker.symbol(),
                timestamp: taker.timestamp,
                price: best_price,
                quantity: fill,
                maker: maker.party(),
                taker: taker.party(),
            });

            taker.quantity -= fill;
        }
    }

    /// Admits a limit order. Matches immediately against the opposing side
    /// while price still crosses; any residual quantity rests at
    /// `order.price` on its own side.
    pub fn process_limit(
        &mut self,
        new: NewOrder,
        timestamp: u128,
    ) -> Result<(OrderId, Vec<Trade>, Option<Order>), BookError> {
        if new.kind != OrderType::Limit {
            return Err(BookError::MissingPrice);
        }
        let price = new.price.ok_or(BookError::MissingPrice)?;
        if !self.tick.is_on_tick(price) {
            return Err(BookError::TickMismatch);
        }
        if new.quantity <= Decimal::ZERO || !self.tick.meets_minimum(new.quantity) {
            return Err(BookError::InvalidQuantity);
        }

        let id = self.next_order_id();
        let mut order = Order::from_new(id, new, timestamp);
        let mut trades = Vec::new();
        self.run_match(&mut order, &mut trades);

        let remainder = if order.quantity > Decimal::ZERO {
            let side = order.side;
            let price = order.price.expect("limit order carries a price");
            let resting = order.clone();
            let slot = self.tree_mut(side).insert_order(order);
            self.index.insert(id, IndexEntry { side, price, slot });
            Some(resting)
        } else {
            None
        };

        for trade in &trades {
            self.tape.push(trade.clone());
        }
        Ok((id, trades, remainder))
    }

    /// Admits a market order: no price gate on crossing, no resting
    /// remainder. Returns the trades produced and whatever quantity could
    /// not be filled against available liquidity.
    pub fn process_market(
        &mut self,
        new: NewOrder,
        timestamp: u128,
    ) -> Result<(OrderId, Vec<Trade>, Decimal), BookError> {
        if new.kind != OrderType::Market {
            return Err(BookError::MissingPrice);
        }
        if new.quantity <= Decimal::ZERO {
            return Err(BookError::InvalidQuantity);
        }

        let id = self.next_order_id();
        let mut order = Order::from_new(id, new, timestamp);
        let mut trades = Vec::new();
        self.run_match(&mut order, &mut trades);

        for trade in &trades {
            self.tape.push(trade.clone());
        }
        Ok((id, trades, order.quantity))
    }

    /// Estimates the quote amount a market bid of `quantity` base units
    /// would cost against the current ask side, without mutating the book.
    /// Used by the settlement pre-check to size the submitter's required
    /// escrow before a market bid ever matches. For an ask (required = base
    /// quantity, independent of price) this always returns `quantity`
    /// unchanged.
    pub fn market_cost_estimate(&self, side: Side, quantity: Decimal) -> Decimal {
        if side == Side::Ask {
            return quantity;
        }
        let mut remaining = quantity;
        let mut total = Decimal::ZERO;
        for (price, volume) in self.asks.iter_levels_best_first() {
            if remaining <= Decimal::ZERO {
                break;
            }
            let take = remaining.min(volume);
            total += take * price;
            remaining -= take;
        }
        total
    }

    pub fn cancel(&mut self, id: OrderId) -> Result<(), BookError> {
        let entry = self.index.remove(id).ok_or(BookError::NotFound(id))?;
        self.tree_mut(entry.side).remove_slot(entry.price, entry.slot);
        Ok(())
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        let entry = self.index.get(id)?;
        Some(self.tree_ref(entry.side).slot_order(entry.slot).clone())
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.level_count()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.level_count()
    }

    pub fn bid_order_count(&self) -> usize {
        self.bids.total_orders()
    }

    pub fn ask_order_count(&self) -> usize {
        self.asks.total_orders()
    }

    pub fn snapshot(&self, depth: Option<usize>) -> BookSnapshot {
        let limit = depth.unwrap_or(usize::MAX);
        BookSnapshot {
            bids: self.bids.iter_levels_best_first().take(limit).collect(),
            asks: self.asks.iter_levels_best_first().take(limit).collect(),
        }
    }

    pub fn tape(&self, limit: usize) -> Vec<Trade> {
        self.tape.last(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetworkId;
    use alloy_primitives::Address;
    use rust_decimal_macros::dec;

    fn tick() -> TickConfig {
        TickConfig::new(dec!(0.01), dec!(0.000001))
    }

    fn new_order(account: u8, side: Side, price: Decimal, qty: Decimal) -> NewOrder {
        NewOrder {
            account: Address::repeat_byte(account),
            base_asset: "HBAR".into(),
            quote_asset: "USDT".into(),
            side,
            kind: OrderType::Limit,
            price: Some(price),
            quantity: qty,
            from_network: NetworkId(1),
            to_network: NetworkId(1),
            receive_wallet: Address::repeat_byte(account),
        }
    }

    /// Simple same-chain match with a partial maker remainder.
    #[test]
    fn simple_match_leaves_maker_remainder() {
        let mut book = OrderBook::new("HBAR_USDT", tick(), MatchingConfig::default());
        book.process_limit(new_order(1, Side::Ask, dec!(1.000000), dec!(10)), 1)
            .unwrap();
        let (_, trades, remainder) = book
            .process_limit(new_order(2, Side::Bid, dec!(1.000000), dec!(4)), 2)
            .unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, dec!(1.000000));
        assert_eq!(trades[0].quantity, dec!(4));
        assert!(remainder.is_none());
        assert_eq!(book.best_ask(), Some(dec!(1.000000)));
        assert_eq!(book.ask_order_count(), 1);
    }

    /// Walking two price levels, where a full fill leaves no residual.
    #[test]
    fn walks_the_book_across_levels() {
        let mut book = OrderBook::new("HBAR_USDT", tick(), MatchingConfig::default());
        book.process_limit(new_order(1, Side::Ask, dec!(1.00), dec!(3)), 1)
            .unwrap();
        book.process_limit(new_order(2, Side::Ask, dec!(1.01), dec!(5)), 2)
            .unwrap();

        let (_, trades, remainder) = book
            .process_limit(new_order(3, Side::Bid, dec!(1.02), dec!(6)), 3)
            .unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].price, dec!(1.00));
        assert_eq!(trades[0].quantity, dec!(3));
        assert_eq!(trades[1].price, dec!(1.01));
        assert_eq!(trades[1].quantity, dec!(3));
        assert!(remainder.is_none(), "6 fully filled across both levels");
        assert_eq!(book.best_ask(), Some(dec!(1.01)));
        assert_eq!(book.ask_levels(), 1);
    }

    /// Price-time priority within one level.
    #[test]
    fn price_time_priority_within_level() {
        let mut book = OrderBook::new("HBAR_USDT", tick(), MatchingConfig::default());
        book.process_limit(new_order(1, Side::Ask, dec!(1.00), dec!(2)), 1)
            .unwrap();
        book.process_limit(new_order(2, Side::Ask, dec!(1.00), dec!(2)), 2)
            .unwrap();
        book.process_limit(new_order(3, Side::Ask, dec!(1.00), dec!(2)), 3)
            .unwrap();

        let (_, trades, _) = book
            .process_limit(new_order(9, Side::Bid, dec!(1.00), dec!(3)), 4)
            .unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].maker.order_id, OrderId(1));
        assert_eq!(trades[0].quantity, dec!(2));
        assert_eq!(trades[1].maker.order_id, OrderId(2));
        assert_eq!(trades[1].quantity, dec!(1));
        assert_eq!(book.order(OrderId(2)).unwrap().quantity, dec!(1));
        assert_eq!(book.order(OrderId(3)).unwrap().quantity, dec!(2));
    }

    /// Cancelling the same order twice.
    #[test]
    fn cancel_then_cancel_again_not_found() {
        let mut book = OrderBook::new("HBAR_USDT", tick(), MatchingConfig::default());
        book.process_limit(new_order(1, Side::Ask, dec!(2.00), dec!(5)), 1)
            .unwrap();
        book.cancel(OrderId(1)).unwrap();
        assert_eq!(book.ask_levels(), 0);
        assert_eq!(book.cancel(OrderId(1)), Err(BookError::NotFound(OrderId(1))));
    }

    #[test]
    fn market_order_with_no_liquidity_returns_all_unfilled() {
        let mut book = OrderBook::new("HBAR_USDT", tick(), MatchingConfig::default());
        let new = NewOrder {
            kind: OrderType::Market,
            price: None,
            ..new_order(1, Side::Bid, dec!(1.00), dec!(10))
        };
        let (_, trades, unfilled) = book.process_market(new, 1).unwrap();
        assert!(trades.is_empty());
        assert_eq!(unfilled, dec!(10));
    }

    #[test]
    fn tick_mismatch_rejected_without_mutating_state() {
        let mut book = OrderBook::new("HBAR_USDT", tick(), MatchingConfig::default());
        let err = book
            .process_limit(new_order(1, Side::Ask, dec!(1.005), dec!(1)), 1)
            .unwrap_err();
        assert_eq!(err, BookError::TickMismatch);
        assert_eq!(book.ask_levels(), 0);
    }

    #[test]
    fn self_trade_prevention_skips_own_resting_order() {
        let mut book = OrderBook::new(
            "HBAR_USDT",
            tick(),
            MatchingConfig {
                allow_self_trade: false,
            },
        );
        // Account 1 rests an ask, then tries to cross it with its own bid.
        book.process_limit(new_order(1, Side::Ask, dec!(1.00), dec!(5)), 1)
            .unwrap();
        book.process_limit(new_order(2, Side::Ask, dec!(1.00), dec!(5)), 2)
            .unwrap();

        let (_, trades, remainder) = book
            .process_limit(new_order(1, Side::Bid, dec!(1.00), dec!(5)), 3)
            .unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker.order_id, OrderId(2));
        assert!(remainder.is_none());
        // Account 1's own resting ask is untouched.
        assert_eq!(book.order(OrderId(1)).unwrap().quantity, dec!(5));
    }

    /// When the best price level is entirely self-owned, STP must walk past
    /// it to a worse-but-crossing level instead of stopping there.
    #[test]
    fn self_trade_prevention_walks_past_a_fully_self_owned_level() {
        let mut book = OrderBook::new(
            "HBAR_USDT",
            tick(),
            MatchingConfig {
                allow_self_trade: false,
            },
        );
        // Best price (1.00) is entirely account 1's own asks.
        book.process_limit(new_order(1, Side::Ask, dec!(1.00), dec!(5)), 1)
            .unwrap();
        // A worse price (1.01) has a non-self maker, still crossable by a
        // bid at 1.01 or better.
        book.process_limit(new_order(2, Side::Ask, dec!(1.01), dec!(5)), 2)
            .unwrap();

        let (_, trades, remainder) = book
            .process_limit(new_order(1, Side::Bid, dec!(1.01), dec!(5)), 3)
            .unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker.order_id, OrderId(2));
        assert_eq!(trades[0].price, dec!(1.01));
        assert!(remainder.is_none());
        // Account 1's own resting ask at 1.00 is untouched.
        assert_eq!(book.order(OrderId(1)).unwrap().quantity, dec!(5));
    }
}
