//! Cumulative ladder builder
//!
//! Sorts each side by price (bids descending, asks ascending) and fills in
//! running base/USD depth from the top of book outward. Sorting is stable so
//! rows at equal prices keep their merge order. Rows without a floor sit at
//! the far end of either side, below every priced row.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::Venue;
use types::side::Side;

use crate::level::MergedBucket;
use crate::snapshot::{DepthChart, DEFAULT_BASE_ASSET};
use crate::summary::{depth_percent, LadderSummary};

/// Order rows best price first, unpriced rows last.
pub fn sort_side(side: Side, rows: &mut [MergedBucket]) {
    rows.sort_by(|a, b| match (a.price_floor, b.price_floor) {
        (Some(x), Some(y)) => match side {
            Side::Buy => y.cmp(&x),
            Side::Sell => x.cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Fill cumulative totals as prefix sums over the current order.
///
/// Sums pin at `Decimal::MAX` rather than overflow.
pub fn accumulate(rows: &mut [MergedBucket]) {
    let mut running_base = Decimal::ZERO;
    let mut running_usd = Decimal::ZERO;
    for row in rows.iter_mut() {
        running_base = running_base.saturating_add(row.base_liquidity);
        running_usd = running_usd.saturating_add(row.usd_liquidity);
        row.cumulative_base = running_base;
        row.cumulative_usd = running_usd;
    }
}

/// Sort and accumulate one side.
pub fn build_side(side: Side, mut rows: Vec<MergedBucket>) -> Vec<MergedBucket> {
    sort_side(side, &mut rows);
    accumulate(&mut rows);
    rows
}

/// Both sides of the book, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ladder {
    pub buys: Vec<MergedBucket>,
    pub sells: Vec<MergedBucket>,
    #[serde(flatten)]
    pub summary: LadderSummary,
    pub decimals: u32,
    pub base: String,
    pub sources: Vec<Venue>,
    pub total_buy_base: Decimal,
    pub total_sell_base: Decimal,
    pub depth_chart: DepthChart,
    pub fetched_at: DateTime<Utc>,
}

impl Ladder {
    pub fn empty(decimals: u32) -> Self {
        Self {
            buys: Vec::new(),
            sells: Vec::new(),
            summary: LadderSummary::default(),
            decimals,
            base: DEFAULT_BASE_ASSET.to_string(),
            sources: Vec::new(),
            total_buy_base: Decimal::ZERO,
            total_sell_base: Decimal::ZERO,
            depth_chart: DepthChart::default(),
            fetched_at: Utc::now(),
        }
    }

    pub fn side(&self, side: Side) -> &[MergedBucket] {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    /// First `n` rows of a side, nearest the spread.
    pub fn top(&self, side: Side, n: usize) -> &[MergedBucket] {
        let rows = self.side(side);
        &rows[..n.min(rows.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Cumulative depth of a whole side.
    pub fn side_depth(&self, side: Side) -> (Decimal, Decimal) {
        self.side(side)
            .last()
            .map(|row| (row.cumulative_base, row.cumulative_usd))
            .unwrap_or((Decimal::ZERO, Decimal::ZERO))
    }

    /// Bar width of a row's USD liquidity, in percent of the widest row.
    pub fn bar_width(&self, row: &MergedBucket) -> Decimal {
        depth_percent(row.usd_liquidity, self.summary.max_usd)
    }
}
