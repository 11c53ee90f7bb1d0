use alloy_primitives::Address;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orderbook::decimal::TickConfig;
use orderbook::{MatchingConfig, NetworkId, NewOrder, OrderBook, OrderType, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn tick() -> TickConfig {
    TickConfig::new(dec!(0.01), dec!(0.0001))
}

fn new_book() -> OrderBook {
    OrderBook::new("AAPL_USDT", tick(), MatchingConfig::default())
}

fn limit_order(side: Side, price: Decimal, qty: Decimal) -> NewOrder {
    NewOrder {
        account: Address::repeat_byte(1),
        base_asset: "AAPL".into(),
        quote_asset: "USDT".into(),
        side,
        kind: OrderType::Limit,
        price: Some(price),
        quantity: qty,
        from_network: NetworkId(1),
        to_network: NetworkId(1),
        receive_wallet: Address::repeat_byte(1),
    }
}

fn bench_order_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_submission");

    for &num_orders in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::new("non_crossing_orders", num_orders),
            &num_orders,
            |b, &num_orders| {
                b.iter(|| {
                    let mut ob = new_book();
                    for i in 0..num_orders {
                        let (side, price) = if i % 2 == 0 {
                            (Side::Bid, dec!(100.00) - Decimal::new(i as i64, 2))
                        } else {
                            (Side::Ask, dec!(101.00) + Decimal::new(i as i64, 2))
                        };
                        let order = limit_order(side, price, dec!(1));
                        black_box(ob.process_limit(order, i as u128).unwrap());
                    }
                })
            },
        );
    }

    group.finish();
}

fn bench_order_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_matching");

    for &depth in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("crossing_orders", depth),
            &depth,
            |b, &depth| {
                b.iter_batched(
                    || {
                        let mut ob = new_book();
                        for i in 0..depth {
                            let ask = limit_order(
                                Side::Ask,
                                dec!(100.00) + Decimal::new(i as i64, 2),
                                dec!(1),
                            );
                            ob.process_limit(ask, i as u128).unwrap();

                            let bid = limit_order(
                                Side::Bid,
                                dec!(99.99) - Decimal::new(i as i64, 2),
                                dec!(1),
                            );
                            ob.process_limit(bid, (i + depth) as u128).unwrap();
                        }
                        ob
                    },
                    |mut ob| {
                        let crossing = limit_order(
                            Side::Bid,
                            dec!(100.00) + Decimal::new(depth as i64, 2),
                            Decimal::new(depth as i64, 1),
                        );
                        black_box(ob.process_limit(crossing, (depth * 2) as u128).unwrap())
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_market_data_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_data");

    let mut ob = new_book();
    for i in 0..1000 {
        let ask = limit_order(Side::Ask, dec!(100.00) + Decimal::new(i, 2), dec!(1));
        ob.process_limit(ask, i as u128).unwrap();
        let bid = limit_order(Side::Bid, dec!(99.99) - Decimal::new(i, 2), dec!(1));
        ob.process_limit(bid, (i + 1000) as u128).unwrap();
    }

    group.bench_function("best_bid", |b| b.iter(|| black_box(ob.best_bid())));

    group.bench_function("best_ask", |b| b.iter(|| black_box(ob.best_ask())));

    group.bench_function("snapshot_depth_10", |b| {
        b.iter(|| black_box(ob.snapshot(Some(10))))
    });

    group.finish();
}

fn bench_order_cancellation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancellation");

    for &num_orders in [100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("eager_remove", num_orders),
            &num_orders,
            |b, &num_orders| {
                b.iter_batched(
                    || {
                        let mut ob = new_book();
                        let mut order_ids = Vec::new();
                        for i in 0..num_orders {
                            let order = limit_order(Side::Bid, dec!(100.00), dec!(1));
                            let (_, _, remainder) = ob.process_limit(order, i as u128).unwrap();
                            order_ids.push(remainder.unwrap().id);
                        }
                        (ob, order_ids)
                    },
                    |(mut ob, order_ids)| {
                        for (i, &order_id) in order_ids.iter().enumerate() {
                            if i % 2 == 0 {
                                black_box(ob.cancel(order_id)).ok();
                            }
                        }
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_high_frequency_scenario(c: &mut Criterion) {
    let mut group = c.benchmark_group("hft_scenario");

    group.bench_function("rapid_order_flow", |b| {
        b.iter(|| {
            let mut ob = new_book();
            let mut ts = 0u128;

            for _ in 0..100 {
                for i in 0..5 {
                    let ask = limit_order(Side::Ask, dec!(100.00) + Decimal::new(i, 2), dec!(1));
                    ob.process_limit(ask, ts).unwrap();
                    ts += 1;

                    let bid = limit_order(Side::Bid, dec!(99.99) - Decimal::new(i, 2), dec!(1));
                    ob.process_limit(bid, ts).unwrap();
                    ts += 1;
                }

                let crossing = limit_order(Side::Bid, dec!(100.02), dec!(3));
                ob.process_limit(crossing, ts).unwrap();
                ts += 1;

                black_box(ob.best_bid());
                black_box(ob.best_ask());
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_order_submission,
    bench_order_matching,
    bench_market_data_access,
    bench_order_cancellation,
    bench_high_frequency_scenario
);

criterion_main!(benches);
