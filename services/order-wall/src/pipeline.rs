//! Snapshot-to-ladder pipeline
//!
//! merge → delta → sort/accumulate → summarize, per side, with the depth
//! chart taken from the snapshot or derived from the built ladder.

use tracing::debug;
use types::bucket::LiquidityBucket;
use types::side::{Side, SideFilter};

use crate::delta::{apply_deltas, net_delta, PreviousBuckets};
use crate::ladder::{build_side, Ladder};
use crate::level::MergedBucket;
use crate::merge::merge_buckets;
use crate::snapshot::{DepthChart, LiquiditySnapshot};
use crate::summary::summarize;

/// Build a ladder from a snapshot, both sides included.
pub fn rebuild_ladder(snapshot: &LiquiditySnapshot, previous: &PreviousBuckets) -> Ladder {
    rebuild_ladder_filtered(snapshot, previous, SideFilter::Both)
}

/// Build a ladder keeping only the sides selected by `filter`.
///
/// An excluded side comes out empty and contributes nothing to the summary.
pub fn rebuild_ladder_filtered(
    snapshot: &LiquiditySnapshot,
    previous: &PreviousBuckets,
    filter: SideFilter,
) -> Ladder {
    let buys = build_ladder_side(Side::Buy, snapshot, previous, filter);
    let sells = build_ladder_side(Side::Sell, snapshot, previous, filter);
    let summary = summarize(&buys, &sells);

    let mut depth_chart = match &snapshot.depth_chart {
        Some(chart) if !chart.is_empty() => chart.clone(),
        _ => DepthChart::from_rows(&buys, &sells),
    };
    depth_chart.retain_sides(filter);

    debug!(
        buys = buys.len(),
        sells = sells.len(),
        vanished_buys = previous.vanished(Side::Buy, &buys).len(),
        vanished_sells = previous.vanished(Side::Sell, &sells).len(),
        net_delta_usd = %(net_delta(&buys).saturating_add(net_delta(&sells))),
        mid_price = %summary.mid_price,
        "Rebuilt ladder"
    );

    Ladder {
        buys,
        sells,
        summary,
        decimals: snapshot.decimals,
        base: snapshot.base.clone(),
        sources: snapshot.sources.clone(),
        total_buy_base: snapshot.total_buy_base,
        total_sell_base: snapshot.total_sell_base,
        depth_chart,
        fetched_at: snapshot.fetched_at,
    }
}

fn build_ladder_side(
    side: Side,
    snapshot: &LiquiditySnapshot,
    previous: &PreviousBuckets,
    filter: SideFilter,
) -> Vec<MergedBucket> {
    let buckets: &[LiquidityBucket] = if filter.includes(side) {
        snapshot.buckets(side)
    } else {
        &[]
    };

    let mut rows = merge_buckets(buckets, snapshot.decimals);
    apply_deltas(side, &mut rows, previous);
    build_side(side, rows)
}
