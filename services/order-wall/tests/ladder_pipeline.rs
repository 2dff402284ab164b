//! End-to-end ladder tests
//!
//! Drives raw wire payloads through validation, merging, delta tracking,
//! cumulative depth and the summary, tick after tick.
//!
//! Tests include:
//! - Multi-venue merge and ordering
//! - Delta across consecutive snapshots
//! - Lenient vs strict parsing of malformed payloads
//! - Identical output for shuffled input
//! - Oversized liquidity and unpriced rows

use order_wall::delta::PreviousBuckets;
use order_wall::pipeline::{rebuild_ladder, rebuild_ladder_filtered};
use order_wall::snapshot::{LiquiditySnapshot, SnapshotResponse};
use order_wall::FetchError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::prelude::*;

fn parse(json: &str, policy: NumericPolicy) -> Result<LiquiditySnapshot, FetchError> {
    let response: SnapshotResponse = serde_json::from_str(json).unwrap();
    response.into_snapshot(policy, 4)
}

const TICK_ONE: &str = r#"{
    "buyBuckets": [
        {"priceFloor": "1.2300", "priceLabel": "1.2300", "baseLiquidity": 100, "usdLiquidity": 100, "orders": 2, "source": "jupiter"},
        {"priceFloor": "1.2200", "priceLabel": "1.2200", "baseLiquidity": 50, "usdLiquidity": 61, "orders": 1, "source": "gate"},
        {"priceFloor": "1.2300", "priceLabel": "1.2300", "baseLiquidity": 40, "usdLiquidity": 49.2, "orders": 1, "source": "mexc"}
    ],
    "sellBuckets": [
        {"priceFloor": "1.2600", "priceLabel": "1.2600", "baseLiquidity": 10, "usdLiquidity": 12.6, "source": "gate"},
        {"priceFloor": "1.2500", "priceLabel": "1.2500", "baseLiquidity": 20, "usdLiquidity": 25, "source": "jupiter"}
    ],
    "decimals": 4
}"#;

const TICK_TWO: &str = r#"{
    "buyBuckets": [
        {"priceFloor": "1.2300", "priceLabel": "1.2300", "baseLiquidity": 120, "usdLiquidity": 150, "orders": 3, "source": "jupiter"},
        {"priceFloor": "1.2300", "priceLabel": "1.2300", "baseLiquidity": 40, "usdLiquidity": 49.2, "orders": 1, "source": "mexc"}
    ],
    "sellBuckets": [
        {"priceFloor": "1.2500", "priceLabel": "1.2500", "baseLiquidity": 20, "usdLiquidity": 25, "source": "jupiter"},
        {"priceFloor": "1.2700", "priceLabel": "1.2700", "baseLiquidity": 5, "usdLiquidity": 6.35, "source": "bitvavo"}
    ],
    "decimals": 4
}"#;

#[test]
fn test_multi_venue_ladder() {
    let snapshot = parse(TICK_ONE, NumericPolicy::Strict).unwrap();
    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());

    let buy_keys: Vec<String> = ladder.buys.iter().map(|r| r.key().to_string()).collect();
    assert_eq!(buy_keys, vec!["jupiter:1.2300", "mexc:1.2300", "gate:1.2200"]);

    let sell_keys: Vec<String> = ladder.sells.iter().map(|r| r.key().to_string()).collect();
    assert_eq!(sell_keys, vec!["jupiter:1.2500", "gate:1.2600"]);

    assert_eq!(ladder.buys[2].cumulative_base, dec!(190));
    assert_eq!(ladder.buys[2].cumulative_usd, dec!(210.2));
    assert_eq!(ladder.side_depth(Side::Sell), (dec!(30), dec!(37.6)));

    assert_eq!(ladder.summary.best_bid, dec!(1));
    assert_eq!(ladder.summary.best_ask, dec!(1.25));
    assert_eq!(ladder.summary.max_usd, dec!(100));
    assert_eq!(ladder.total_buy_base, dec!(190));
}

#[test]
fn test_price_ordering() {
    let at = |price: Decimal| LiquidityBucket::at_price("jupiter", price, dec!(1), price);
    let snapshot = LiquiditySnapshot::new(
        vec![at(dec!(1.0)), at(dec!(1.05)), at(dec!(0.98))],
        vec![at(dec!(1.10)), at(dec!(1.02)), at(dec!(1.20))],
        2,
    );
    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());

    let floors = |rows: &[order_wall::MergedBucket]| -> Vec<Decimal> {
        rows.iter().filter_map(|r| r.price_floor).collect()
    };
    assert_eq!(floors(&ladder.buys), vec![dec!(1.05), dec!(1.0), dec!(0.98)]);
    assert_eq!(floors(&ladder.sells), vec![dec!(1.02), dec!(1.10), dec!(1.20)]);
    assert_eq!(ladder.summary.best_bid, dec!(1.05));
    assert_eq!(ladder.summary.best_ask, dec!(1.02));
}

#[test]
fn test_consecutive_ticks() {
    let first = rebuild_ladder(
        &parse(TICK_ONE, NumericPolicy::Strict).unwrap(),
        &PreviousBuckets::new(),
    );
    assert!(first.buys.iter().all(|r| !r.is_new && r.delta_usd == Decimal::ZERO));

    let previous = PreviousBuckets::from_ladder(&first);
    let second = rebuild_ladder(&parse(TICK_TWO, NumericPolicy::Strict).unwrap(), &previous);

    let jupiter = &second.buys[0];
    assert_eq!(jupiter.key().to_string(), "jupiter:1.2300");
    assert_eq!(jupiter.delta_usd, dec!(50));
    assert_eq!(second.buys[1].delta_usd, Decimal::ZERO);

    let bitvavo = second.sells.iter().find(|r| r.source.as_str() == "bitvavo").unwrap();
    assert!(bitvavo.is_new);
    assert_eq!(bitvavo.delta_usd, Decimal::ZERO);

    let vanished = previous.vanished(Side::Buy, &second.buys);
    assert_eq!(vanished.len(), 1);
    assert_eq!(vanished[0].key().to_string(), "gate:1.2200");
}

#[test]
fn test_lenient_and_strict_payloads() {
    let payload = r#"{
        "buyBuckets": [
            {"priceFloor": 0.99, "baseLiquidity": "abc", "usdLiquidity": 10, "source": "gate"},
            {"priceFloor": 0.98, "baseLiquidity": -5, "usdLiquidity": 7, "source": "gate"}
        ]
    }"#;

    let snapshot = parse(payload, NumericPolicy::Lenient).unwrap();
    assert_eq!(snapshot.buy_buckets[0].base_liquidity, Decimal::ZERO);
    assert_eq!(snapshot.buy_buckets[1].base_liquidity, Decimal::ZERO);

    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());
    // No base liquidity means no unit price anywhere on the bid side
    assert!(ladder.buys.iter().all(|r| r.usd_per_base.is_none()));
    assert_eq!(ladder.summary.best_bid, Decimal::ZERO);

    let err = parse(payload, NumericPolicy::Strict).unwrap_err();
    assert!(matches!(err, FetchError::InvalidBucket { side: Side::Buy, index: 0, .. }));
}

#[test]
fn test_side_filter() {
    let snapshot = parse(TICK_ONE, NumericPolicy::Strict).unwrap();
    let ladder = rebuild_ladder_filtered(&snapshot, &PreviousBuckets::new(), SideFilter::Sell);

    assert!(ladder.buys.is_empty());
    assert_eq!(ladder.sells.len(), 2);
    assert_eq!(ladder.summary.mid_price, dec!(1.25));
    assert!(ladder.depth_chart.bids.is_empty());
}

#[test]
fn test_shuffled_input_builds_identical_ladder() {
    let buckets = vec![
        LiquidityBucket::at_price("jupiter", dec!(0.97), dec!(10), dec!(9.7)),
        LiquidityBucket::at_price("gate", dec!(0.99), dec!(3), dec!(2.97)),
        LiquidityBucket::at_price("mexc", dec!(0.98), dec!(8), dec!(7.84)),
        LiquidityBucket::at_price("jupiter", dec!(0.97), dec!(1), dec!(0.97)),
    ];
    let mut reversed = buckets.clone();
    reversed.reverse();

    let a = rebuild_ladder(&LiquiditySnapshot::new(buckets, Vec::new(), 2), &PreviousBuckets::new());
    let b = rebuild_ladder(&LiquiditySnapshot::new(reversed, Vec::new(), 2), &PreviousBuckets::new());

    assert_eq!(a.buys, b.buys);
    assert_eq!(a.summary, b.summary);
}

#[test]
fn test_empty_payload() {
    let snapshot = parse("{}", NumericPolicy::Strict).unwrap();
    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());

    assert!(ladder.is_empty());
    assert_eq!(ladder.summary.best_bid, Decimal::ZERO);
    assert_eq!(ladder.summary.best_ask, Decimal::ZERO);
    assert_eq!(ladder.summary.mid_price, Decimal::ZERO);
    assert_eq!(ladder.summary.max_base, Decimal::ONE);
    assert_eq!(ladder.summary.max_usd, Decimal::ONE);
}

#[test]
fn test_oversized_buckets_do_not_overflow() {
    let payload = r#"{
        "buyBuckets": [
            {"priceFloor": 1, "priceLabel": "1", "baseLiquidity": "50000000000000000000000000000", "usdLiquidity": 1, "source": "gate"},
            {"priceFloor": 1, "priceLabel": "1", "baseLiquidity": "50000000000000000000000000000", "usdLiquidity": 1, "source": "gate"}
        ]
    }"#;
    assert!(matches!(
        parse(payload, NumericPolicy::Strict),
        Err(FetchError::InvalidBucket { side: Side::Buy, index: 0, .. })
    ));

    let lenient = parse(payload, NumericPolicy::Lenient).unwrap();
    let ladder = rebuild_ladder(&lenient, &PreviousBuckets::new());
    assert_eq!(ladder.buys.len(), 1);
    assert_eq!(ladder.buys[0].base_liquidity, MAX_LIQUIDITY * Decimal::TWO);

    // Typed input skips the boundary cap; sums pin at the maximum
    let huge = Decimal::from_scientific("5e28").unwrap();
    let snapshot = LiquiditySnapshot::new(
        vec![
            LiquidityBucket::at_price("gate", dec!(1), huge, dec!(1)).with_label("1"),
            LiquidityBucket::at_price("gate", dec!(1), huge, dec!(1)).with_label("1"),
        ],
        Vec::new(),
        0,
    );
    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());
    assert_eq!(ladder.buys[0].key().to_string(), "gate:1");
    assert_eq!(ladder.buys[0].base_liquidity, Decimal::MAX);
    assert_eq!(ladder.side_depth(Side::Buy).0, Decimal::MAX);
    assert_eq!(ladder.total_buy_base, Decimal::MAX);

    let next = rebuild_ladder(&snapshot, &PreviousBuckets::from_ladder(&ladder));
    assert_eq!(next.buys[0].delta_usd, Decimal::ZERO);
}

#[test]
fn test_enormous_ask_price_summary() {
    let ask_usd = Decimal::from_scientific("1e26").unwrap();
    let snapshot = LiquiditySnapshot::new(
        vec![LiquidityBucket::at_price("jupiter", dec!(1), dec!(1), dec!(1))],
        vec![LiquidityBucket::at_price("gate", dec!(2), dec!(1), ask_usd)],
        2,
    );
    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());

    assert_eq!(ladder.summary.best_ask, ask_usd);
    assert_eq!(ladder.summary.spread_bps, dec!(20000));
    assert_eq!(ladder.bar_width(&ladder.sells[0]), dec!(100));
    assert!(ladder.bar_width(&ladder.buys[0]) < dec!(1));
}

#[test]
fn test_unpriced_ask_sits_below_priced_rows() {
    let payload = r#"{
        "sellBuckets": [
            {"priceFloor": "n/a", "priceLabel": "?", "baseLiquidity": 1, "usdLiquidity": 0.5, "source": "gate"},
            {"priceFloor": 1.05, "priceLabel": "1.05", "baseLiquidity": 10, "usdLiquidity": 10.5, "source": "jupiter"}
        ]
    }"#;
    let snapshot = parse(payload, NumericPolicy::Lenient).unwrap();
    let ladder = rebuild_ladder(&snapshot, &PreviousBuckets::new());

    assert_eq!(ladder.top(Side::Sell, 1)[0].key().to_string(), "jupiter:1.05");
    assert_eq!(ladder.sells[1].price_floor, None);
    assert_eq!(ladder.summary.best_ask, dec!(1.05));
    assert_eq!(ladder.sells[1].cumulative_base, dec!(11));
    assert_eq!(ladder.depth_chart.asks.len(), 1);
}
