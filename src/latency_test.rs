//! Performance testing suite for the matching engine.
//!
//! Measures latency and throughput under various scenarios:
//! - Market data access, order submission, matching, cancellation
//! - Sustained throughput testing with mixed workload

use alloy_primitives::Address;
use orderbook::decimal::TickConfig;
use orderbook::{MatchingConfig, NetworkId, NewOrder, OrderBook, OrderType, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Instant;

/// Runs complete latency test suite.
pub fn run_latency_tests() {
    println!("Cross-chain exchange - matching engine latency tests\n");

    test_market_data_latency();
    test_order_submission_latency();
    test_order_matching_latency();
    test_cancellation_latency();
}

fn tick() -> TickConfig {
    TickConfig::new(dec!(0.01), dec!(0.0001))
}

fn new_book() -> OrderBook {
    OrderBook::new("AAPL_USDT", tick(), MatchingConfig::default())
}

/// Creates a resting limit order at `price`/`quantity`, both whole-cent
/// ticks, on a throwaway account.
fn limit_order(side: Side, price: Decimal, quantity: Decimal) -> NewOrder {
    NewOrder {
        account: Address::repeat_byte(1),
        base_asset: "AAPL".into(),
        quote_asset: "USDT".into(),
        side,
        kind: OrderType::Limit,
        price: Some(price),
        quantity,
        from_network: NetworkId(1),
        to_network: NetworkId(1),
        receive_wallet: Address::repeat_byte(1),
    }
}

/// Tests best bid/ask lookup performance.
fn test_market_data_latency() {
    println!("Market data latency test");

    let mut ob = new_book();
    for i in 0..100i64 {
        ob.process_limit(
            limit_order(Side::Ask, dec!(100.00) + Decimal::new(i, 2), dec!(100)),
            i as u128,
        )
        .unwrap();
        ob.process_limit(
            limit_order(Side::Bid, dec!(99.99) - Decimal::new(i, 2), dec!(100)),
            (i + 100) as u128,
        )
        .unwrap();
    }

    let iterations = 1_000_000;

    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(ob.best_bid());
    }
    let bid_duration = start.elapsed();

    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(ob.best_ask());
    }
    let ask_duration = start.elapsed();

    println!(
        "  Best bid lookup: {:.2} ns/call",
        bid_duration.as_nanos() as f64 / iterations as f64
    );
    println!(
        "  Best ask lookup: {:.2} ns/call",
        ask_duration.as_nanos() as f64 / iterations as f64
    );
    println!(
        "  Combined latency: {:.2} ns\n",
        (bid_duration.as_nanos() + ask_duration.as_nanos()) as f64 / iterations as f64
    );
}

/// Tests order submission latency for non-crossing orders.
fn test_order_submission_latency() {
    println!("Order submission latency test");

    let iterations = 10_000;
    let mut total_time = 0u128;

    for i in 0..iterations {
        let mut ob = new_book();
        let order = limit_order(Side::Bid, dec!(100.00) - Decimal::new(i as i64, 2), dec!(100));

        let start = Instant::now();
        ob.process_limit(order, i as u128).unwrap();
        total_time += start.elapsed().as_nanos();
    }

    let avg_latency = total_time as f64 / iterations as f64;
    println!("  Average order submission: {avg_latency:.2} ns");
    println!("  Throughput: {:.0} orders/second\n", 1_000_000_000.0 / avg_latency);
}

/// Tests order matching latency for crossing orders.
fn test_order_matching_latency() {
    println!("Order matching latency test");

    let iterations = 1_000;
    let mut total_setup_time = 0u128;
    let mut total_match_time = 0u128;

    for i in 0..iterations {
        let setup_start = Instant::now();
        let mut ob = new_book();

        for j in 0..10i64 {
            ob.process_limit(
                limit_order(Side::Ask, dec!(100.00) + Decimal::new(j, 2), dec!(100)),
                j as u128,
            )
            .unwrap();
        }
        total_setup_time += setup_start.elapsed().as_nanos();

        let crossing = limit_order(Side::Bid, dec!(100.05), dec!(500));

        let match_start = Instant::now();
        let (_, trades, _) = ob.process_limit(crossing, (1000 + i) as u128).unwrap();
        total_match_time += match_start.elapsed().as_nanos();

        std::hint::black_box(trades);
    }

    println!(
        "  Setup (10 resting orders): {:.2} ns",
        total_setup_time as f64 / iterations as f64
    );
    println!(
        "  Crossing order execution: {:.2} ns",
        total_match_time as f64 / iterations as f64
    );
    println!(
        "  Total order-to-trade: {:.2} ns\n",
        (total_setup_time + total_match_time) as f64 / iterations as f64
    );
}

/// Tests cancel-by-id latency. The arena + order-index design makes every
/// cancel an O(1) slot removal — there is no separate lazy-mark path left
/// to compare it against.
fn test_cancellation_latency() {
    println!("Cancellation latency test");

    let iterations = 1_000;
    let orders_per_test = 100u128;
    let mut total_time = 0u128;

    for i in 0..iterations {
        let mut ob = new_book();
        let mut order_ids = Vec::with_capacity(orders_per_test as usize);
        for j in 0..orders_per_test {
            let order = limit_order(Side::Bid, dec!(90.00), dec!(1));
            let (id, _, _) = ob.process_limit(order, i as u128 * orders_per_test + j).unwrap();
            order_ids.push(id);
        }

        let start = Instant::now();
        for &id in &order_ids {
            ob.cancel(id).unwrap();
        }
        total_time += start.elapsed().as_nanos();
    }

    println!(
        "  Cancel-by-id: {:.2} ns per order\n",
        total_time as f64 / (iterations as u128 * orders_per_test) as f64
    );
}

/// Runs sustained throughput test with a mixed workload for `duration`.
fn run_throughput_test_for(duration: std::time::Duration) {
    let mut ob = new_book();
    let mut order_id = 1u128;
    let mut orders_processed = 0u64;
    let mut trades_executed = 0u64;

    let start_time = Instant::now();
    while start_time.elapsed() < duration {
        match order_id % 4 {
            0 => {
                let order = limit_order(
                    Side::Bid,
                    dec!(99.99) - Decimal::new((order_id % 100) as i64, 2),
                    dec!(100),
                );
                ob.process_limit(order, order_id).unwrap();
            }
            1 => {
                let order = limit_order(
                    Side::Ask,
                    dec!(100.01) + Decimal::new((order_id % 100) as i64, 2),
                    dec!(100),
                );
                ob.process_limit(order, order_id).unwrap();
            }
            2 => {
                let order = limit_order(Side::Bid, dec!(100.01), dec!(50));
                let (_, trades, _) = ob.process_limit(order, order_id).unwrap();
                trades_executed += trades.len() as u64;
            }
            3 => {
                let order = limit_order(Side::Ask, dec!(99.99), dec!(50));
                let (_, trades, _) = ob.process_limit(order, order_id).unwrap();
                trades_executed += trades.len() as u64;
            }
            _ => unreachable!(),
        }

        order_id += 1;
        orders_processed += 1;

        if order_id % 100 == 0 {
            std::hint::black_box(ob.best_bid());
            std::hint::black_box(ob.best_ask());
        }
    }

    let elapsed = start_time.elapsed();
    let orders_per_sec = orders_processed as f64 / elapsed.as_secs_f64();
    let trades_per_sec = trades_executed as f64 / elapsed.as_secs_f64();

    println!("  Duration: {:.1} seconds", elapsed.as_secs_f64());
    println!("  Orders processed: {orders_processed}");
    println!("  Trades executed: {trades_executed}");
    println!("  Order throughput: {orders_per_sec:.0} orders/second");
    println!("  Trade throughput: {trades_per_sec:.0} trades/second");
    println!("  Final book state: bid={:?}, ask={:?}", ob.best_bid(), ob.best_ask());
}

/// Runs a 10-second sustained throughput test with mixed workload.
pub fn run_throughput_test() {
    println!("Sustained throughput test (10 seconds)");
    run_throughput_test_for(std::time::Duration::from_secs(10));
}

/// Runs a 60-second sustained throughput test with mixed workload.
pub fn run_throughput_test_1min() {
    println!("Sustained throughput test (60 seconds)");
    run_throughput_test_for(std::time::Duration::from_secs(60));
}
