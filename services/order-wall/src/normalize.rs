//! Bucket normalizer
//!
//! Canonicalizes a validated `LiquidityBucket` into ladder-row shape:
//! resolves the price label and source, and derives the unit price.

use rust_decimal::Decimal;
use types::bucket::LiquidityBucket;
use types::numeric::format_fixed;

use crate::level::{MergeKey, MergedBucket};

/// `usd / base` when both are strictly positive, otherwise `None`.
pub fn usd_per_base(base_liquidity: Decimal, usd_liquidity: Decimal) -> Option<Decimal> {
    if base_liquidity > Decimal::ZERO && usd_liquidity > Decimal::ZERO {
        usd_liquidity.checked_div(base_liquidity)
    } else {
        None
    }
}

/// Resolve the display label for a bucket.
///
/// Provided label, else the floor formatted to `decimals` places, else `"0"`.
pub fn price_label(bucket: &LiquidityBucket, decimals: u32) -> String {
    if let Some(label) = bucket.price_label.as_deref() {
        let label = label.trim();
        if !label.is_empty() {
            return label.to_string();
        }
    }
    match bucket.price_floor {
        Some(floor) => format_fixed(floor, decimals),
        None => "0".to_string(),
    }
}

/// Merge key of a bucket at the given display precision.
pub fn merge_key(bucket: &LiquidityBucket, decimals: u32) -> MergeKey {
    MergeKey::new(bucket.source.clone(), price_label(bucket, decimals))
}

/// Normalize a single bucket into a ladder row.
pub fn normalize(bucket: &LiquidityBucket, decimals: u32) -> MergedBucket {
    let mut row = MergedBucket::seeded(&merge_key(bucket, decimals));
    row.price_floor = bucket.price_floor;
    row.price_ceil = bucket.price_ceil;
    row.base_liquidity = bucket.base_liquidity;
    row.usd_liquidity = bucket.usd_liquidity;
    row.orders = bucket.orders;
    renormalize(&mut row);
    row
}

/// Re-derive `usd_per_base` from the row's own liquidity. Idempotent.
pub fn renormalize(row: &mut MergedBucket) {
    row.usd_per_base = usd_per_base(row.base_liquidity, row.usd_liquidity);
}
