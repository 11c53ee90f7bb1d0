//! Cross-chain exchange performance lab.
//!
//! Runs the matching engine's latency/throughput suite, then two demos
//! exercising the pieces the HTTP service wires together: a same-chain
//! limit-order walk and a cross-chain settlement round trip, driven
//! directly against [`settlement::SettlementOrchestrator`] and an
//! in-memory chain client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use escrow::MockChainClient;
use orderbook::decimal::TickConfig;
use orderbook::{MatchingConfig, NetworkId, NewOrder, OrderBook, OrderType, Side};
use rust_decimal_macros::dec;
use settlement::{SettlementOrchestrator, TokenResolver};

mod latency_test;

#[tokio::main]
async fn main() {
    println!("=== Cross-Chain Exchange Performance Lab ===");

    latency_test::run_latency_tests();
    latency_test::run_throughput_test();

    println!("\n=== 1-Minute Sustained Throughput Test ===");
    latency_test::run_throughput_test_1min();

    println!("\n=== Same-Chain Matching Demo ===");
    run_same_chain_demo();

    println!("\n=== Cross-Chain Settlement Demo ===");
    run_cross_chain_settlement_demo().await;
}

/// Demonstrates basic order book matching: a resting ask, a non-crossing
/// bid, then a bid that partially fills the ask.
fn run_same_chain_demo() {
    let tick = TickConfig::new(dec!(0.01), dec!(0.01));
    let mut book = OrderBook::new("AAPL_USDT", tick, MatchingConfig::default());

    let ask = NewOrder {
        account: Address::repeat_byte(1),
        base_asset: "AAPL".into(),
        quote_asset: "USDT".into(),
        side: Side::Ask,
        kind: OrderType::Limit,
        price: Some(dec!(150.00)),
        quantity: dec!(100),
        from_network: NetworkId(1),
        to_network: NetworkId(1),
        receive_wallet: Address::repeat_byte(1),
    };
    println!("Submitting ask: {} @ {}", ask.quantity, ask.price.unwrap());
    let (ask_id, _, _) = book.process_limit(ask, 1).unwrap();

    let bid = NewOrder {
        account: Address::repeat_byte(2),
        base_asset: "AAPL".into(),
        quote_asset: "USDT".into(),
        side: Side::Bid,
        kind: OrderType::Limit,
        price: Some(dec!(149.50)),
        quantity: dec!(50),
        from_network: NetworkId(1),
        to_network: NetworkId(1),
        receive_wallet: Address::repeat_byte(2),
    };
    println!("Submitting non-crossing bid: {} @ {}", bid.quantity, bid.price.unwrap());
    book.process_limit(bid, 2).unwrap();

    println!("Best bid: {:?}", book.best_bid());
    println!("Best ask: {:?}", book.best_ask());

    let crossing_bid = NewOrder {
        account: Address::repeat_byte(3),
        base_asset: "AAPL".into(),
        quote_asset: "USDT".into(),
        side: Side::Bid,
        kind: OrderType::Limit,
        price: Some(dec!(150.00)),
        quantity: dec!(75),
        from_network: NetworkId(1),
        to_network: NetworkId(1),
        receive_wallet: Address::repeat_byte(3),
    };
    println!("Submitting crossing bid: {} @ {}", crossing_bid.quantity, crossing_bid.price.unwrap());
    let (_, trades, _) = book.process_limit(crossing_bid, 3).unwrap();

    println!("Trades executed: {}", trades.len());
    for trade in &trades {
        println!(
            "  {} @ {} (maker order {:?}, taker order {:?})",
            trade.quantity, trade.price, trade.maker.order_id, trade.taker.order_id
        );
    }
    println!("Remaining ask ({:?}): {:?}", ask_id, book.order(ask_id).map(|o| o.quantity));
    println!("Final best bid: {:?}", book.best_bid());
    println!("Final best ask: {:?}", book.best_ask());
}

struct DemoResolver(HashMap<(String, NetworkId), (Address, Address)>);

impl TokenResolver for DemoResolver {
    fn resolve(&self, symbol: &str, network: NetworkId) -> Option<(Address, Address)> {
        self.0.get(&(symbol.to_string(), network)).copied()
    }
}

/// Walks a cross-chain trade: party A on chain X sells HBAR for USDT to
/// party B on chain Y, settled as two legs on two independent chain
/// clients.
async fn run_cross_chain_settlement_demo() {
    let chain_x = Arc::new(MockChainClient::new(NetworkId(1)));
    let chain_y = Arc::new(MockChainClient::new(NetworkId(2)));

    let hbar = Address::repeat_byte(0xA0);
    let usdt = Address::repeat_byte(0xB0);
    let party_a = Address::repeat_byte(0x0A);
    let party_b = Address::repeat_byte(0x0B);
    let wallet_a_on_y = Address::repeat_byte(0x1A);
    let wallet_b_on_x = Address::repeat_byte(0x1B);

    chain_x.seed_deposit(party_a, hbar, dec!(100)).unwrap();
    chain_y.seed_deposit(party_b, usdt, dec!(500)).unwrap();
    chain_x.lock(party_a, hbar, dec!(100), orderbook::OrderId(1)).await.unwrap();
    chain_y.lock(party_b, usdt, dec!(500), orderbook::OrderId(2)).await.unwrap();

    let orchestrator = SettlementOrchestrator::new(3, Duration::from_millis(10));
    orchestrator.register_chain(chain_x.clone());
    orchestrator.register_chain(chain_y.clone());

    let mut tokens = HashMap::new();
    tokens.insert(("HBAR_USDT".to_string(), NetworkId(1)), (hbar, Address::ZERO));
    tokens.insert(("HBAR_USDT".to_string(), NetworkId(2)), (Address::ZERO, usdt));
    let resolver = DemoResolver(tokens);

    let tick = TickConfig::new(dec!(0.01), dec!(0.01));
    let mut book = OrderBook::new("HBAR_USDT", tick, MatchingConfig::default());

    let ask = NewOrder {
        account: party_a,
        base_asset: "HBAR".into(),
        quote_asset: "USDT".into(),
        side: Side::Ask,
        kind: OrderType::Limit,
        price: Some(dec!(5.00)),
        quantity: dec!(100),
        from_network: NetworkId(1),
        to_network: NetworkId(2),
        receive_wallet: wallet_a_on_y,
    };
    book.process_limit(ask, 1).unwrap();

    let bid = NewOrder {
        account: party_b,
        base_asset: "HBAR".into(),
        quote_asset: "USDT".into(),
        side: Side::Bid,
        kind: OrderType::Limit,
        price: Some(dec!(5.00)),
        quantity: dec!(100),
        from_network: NetworkId(2),
        to_network: NetworkId(1),
        receive_wallet: wallet_b_on_x,
    };
    let (_, trades, _) = book.process_limit(bid, 2).unwrap();

    println!("Matched {} trade(s) across chains 1 and 2", trades.len());
    for trade in &trades {
        let info = orchestrator.dispatch_trade(trade, &resolver).await.unwrap();
        println!(
            "  trade {:?}: path={:?} state={:?}",
            trade.trade_id, info.path, info.state
        );
    }

    let wb_on_x = chain_x.escrow_of(wallet_b_on_x, hbar).await;
    let wa_on_y = chain_y.escrow_of(wallet_a_on_y, usdt).await;
    println!("Wb_on_X received: {} HBAR", wb_on_x.total);
    println!("Wa_on_Y received: {} USDT", wa_on_y.total);
}
