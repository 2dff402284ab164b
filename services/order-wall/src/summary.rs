//! Ladder summary calculator
//!
//! Best prices, mid price, spread and the depth-bar normalization maxima
//! for a pair of sorted ladder sides.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::level::MergedBucket;

const BPS_SCALE: i64 = 10_000;
const BPS_DECIMALS: u32 = 2;

/// Headline numbers derived from both ladder sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderSummary {
    pub best_bid: Decimal,
    pub best_ask: Decimal,
    pub mid_price: Decimal,
    /// `best_ask - best_bid`; negative when venues are crossed.
    pub spread: Decimal,
    pub spread_bps: Decimal,
    /// Largest base liquidity on either side, at least 1.
    pub max_base: Decimal,
    /// Largest USD liquidity on either side, at least 1.
    pub max_usd: Decimal,
}

impl Default for LadderSummary {
    fn default() -> Self {
        summarize(&[], &[])
    }
}

/// Unit price of the first priced row, or zero.
pub fn best_price(rows: &[MergedBucket]) -> Decimal {
    rows.iter()
        .find_map(|row| row.usd_per_base)
        .unwrap_or(Decimal::ZERO)
}

/// Midpoint when both sides are priced, else the priced side, else zero.
pub fn mid_price(best_bid: Decimal, best_ask: Decimal) -> Decimal {
    match (best_bid > Decimal::ZERO, best_ask > Decimal::ZERO) {
        (true, true) => match best_bid.checked_add(best_ask) {
            Some(sum) => sum / Decimal::TWO,
            None => best_bid / Decimal::TWO + best_ask / Decimal::TWO,
        },
        (true, false) => best_bid,
        (false, true) => best_ask,
        (false, false) => Decimal::ZERO,
    }
}

/// Zero unless both sides are priced.
pub fn spread(best_bid: Decimal, best_ask: Decimal) -> Decimal {
    if best_bid > Decimal::ZERO && best_ask > Decimal::ZERO {
        best_ask - best_bid
    } else {
        Decimal::ZERO
    }
}

/// Spread in basis points of the mid price, zero when it cannot be
/// represented.
pub fn spread_bps(spread: Decimal, mid: Decimal) -> Decimal {
    if mid <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spread
        .checked_div(mid)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(BPS_SCALE)))
        .map(|bps| bps.round_dp(BPS_DECIMALS))
        .unwrap_or(Decimal::ZERO)
}

/// Largest value of `measure` over both sides, floored at 1.
fn max_of<F>(buys: &[MergedBucket], sells: &[MergedBucket], measure: F) -> Decimal
where
    F: Fn(&MergedBucket) -> Decimal,
{
    buys.iter()
        .chain(sells)
        .map(measure)
        .fold(Decimal::ONE, Decimal::max)
}

pub fn summarize(buys: &[MergedBucket], sells: &[MergedBucket]) -> LadderSummary {
    let best_bid = best_price(buys);
    let best_ask = best_price(sells);
    let mid = mid_price(best_bid, best_ask);
    let spread = spread(best_bid, best_ask);

    LadderSummary {
        best_bid,
        best_ask,
        mid_price: mid,
        spread,
        spread_bps: spread_bps(spread, mid),
        max_base: max_of(buys, sells, |row| row.base_liquidity),
        max_usd: max_of(buys, sells, |row| row.usd_liquidity),
    }
}

/// Depth-bar width in percent of `max`, clamped to `[0, 100]`.
pub fn depth_percent(value: Decimal, max: Decimal) -> Decimal {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if value >= max {
        return Decimal::ONE_HUNDRED;
    }
    // ratio < 1 here
    value
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::level::MergeKey;
    use proptest::prelude::*;
    use types::ids::Venue;

    fn arb_row() -> impl Strategy<Value = MergedBucket> {
        (0u32..1_000_000, 0u32..1_000_000).prop_map(|(base, usd)| {
            let mut row = MergedBucket::seeded(&MergeKey::new(Venue::jupiter(), "p"));
            row.base_liquidity = Decimal::new(base as i64, 3);
            row.usd_liquidity = Decimal::new(usd as i64, 3);
            crate::normalize::renormalize(&mut row);
            row
        })
    }

    proptest! {
        #[test]
        fn prop_maxima_bound_every_row(
            buys in prop::collection::vec(arb_row(), 0..20),
            sells in prop::collection::vec(arb_row(), 0..20),
        ) {
            let summary = summarize(&buys, &sells);
            prop_assert!(summary.max_base >= Decimal::ONE);
            prop_assert!(summary.max_usd >= Decimal::ONE);
            for row in buys.iter().chain(&sells) {
                let width = depth_percent(row.usd_liquidity, summary.max_usd);
                prop_assert!(width >= Decimal::ZERO && width <= Decimal::ONE_HUNDRED);
                prop_assert!(row.base_liquidity <= summary.max_base);
            }
        }
    }
}
