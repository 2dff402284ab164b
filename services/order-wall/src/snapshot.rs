//! Liquidity snapshot payloads
//!
//! `SnapshotResponse` is the wire shape returned by the snapshot API.
//! `into_snapshot` runs every bucket through the parse boundary and yields a
//! typed `LiquiditySnapshot` for the ladder pipeline.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::bucket::{LiquidityBucket, RawLiquidityBucket};
use types::ids::Venue;
use types::numeric::{saturating_sum, NumericField, NumericPolicy, MAX_DECIMALS};
use types::side::{Side, SideFilter};

use crate::error::FetchError;
use crate::level::MergedBucket;

/// Base asset assumed when the payload omits it.
pub const DEFAULT_BASE_ASSET: &str = "NOS";

/// One point of a cumulative depth chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthPoint {
    pub price: Decimal,
    pub liquidity: Decimal,
}

/// Cumulative depth curve per side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthChart {
    pub bids: Vec<DepthPoint>,
    pub asks: Vec<DepthPoint>,
}

impl DepthChart {
    /// Derive a chart from sorted, accumulated ladder rows.
    ///
    /// Rows without a floor have no place on the price axis and are skipped.
    pub fn from_rows(buys: &[MergedBucket], sells: &[MergedBucket]) -> Self {
        let points = |rows: &[MergedBucket]| -> Vec<DepthPoint> {
            rows.iter()
                .filter_map(|r| {
                    r.price_floor.map(|price| DepthPoint {
                        price,
                        liquidity: r.cumulative_base,
                    })
                })
                .collect()
        };
        Self {
            bids: points(buys),
            asks: points(sells),
        }
    }

    /// Drop the points of any side excluded by `filter`.
    pub fn retain_sides(&mut self, filter: SideFilter) {
        if !filter.includes(Side::Buy) {
            self.bids.clear();
        }
        if !filter.includes(Side::Sell) {
            self.asks.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Wire form of a depth chart point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDepthPoint {
    #[serde(default)]
    pub price: Option<NumericField>,
    #[serde(default, alias = "size", alias = "depth", alias = "value")]
    pub liquidity: Option<NumericField>,
}

/// Wire form of a depth chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDepthChart {
    #[serde(default)]
    pub bids: Vec<RawDepthPoint>,
    #[serde(default)]
    pub asks: Vec<RawDepthPoint>,
}

impl RawDepthChart {
    /// Points with an unreadable price or liquidity are dropped.
    fn into_chart(self) -> DepthChart {
        let points = |raw: Vec<RawDepthPoint>| -> Vec<DepthPoint> {
            raw.into_iter()
                .filter_map(|p| {
                    let price = p.price?.to_decimal().ok()?;
                    let liquidity = p.liquidity?.to_decimal().ok()?;
                    Some(DepthPoint { price, liquidity })
                })
                .collect()
        };
        DepthChart {
            bids: points(self.bids),
            asks: points(self.asks),
        }
    }
}

/// Response body of the liquidity snapshot endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    #[serde(default)]
    pub buy_buckets: Vec<RawLiquidityBucket>,
    #[serde(default)]
    pub sell_buckets: Vec<RawLiquidityBucket>,
    #[serde(default)]
    pub decimals: Option<NumericField>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub total_buy_base: Option<NumericField>,
    #[serde(default)]
    pub total_sell_base: Option<NumericField>,
    #[serde(default)]
    pub depth_chart: Option<RawDepthChart>,
}

impl SnapshotResponse {
    /// Validate every bucket and build a typed snapshot.
    ///
    /// `requested_decimals` is used when the payload does not echo a usable
    /// precision. Lenient coercions are logged, strict rejections fail the
    /// whole snapshot.
    pub fn into_snapshot(
        self,
        policy: NumericPolicy,
        requested_decimals: u32,
    ) -> Result<LiquiditySnapshot, FetchError> {
        let buy_buckets = validate_side(Side::Buy, self.buy_buckets, policy)?;
        let sell_buckets = validate_side(Side::Sell, self.sell_buckets, policy)?;

        let decimals = self
            .decimals
            .and_then(|d| d.to_decimal().ok())
            .and_then(|d| d.to_u32())
            .map(|d| d.min(MAX_DECIMALS))
            .unwrap_or(requested_decimals);

        let total_buy_base = read_total(self.total_buy_base, &buy_buckets);
        let total_sell_base = read_total(self.total_sell_base, &sell_buckets);

        let sources = if self.sources.is_empty() {
            sources_of(&buy_buckets, &sell_buckets)
        } else {
            self.sources.into_iter().map(Venue::new).collect()
        };

        Ok(LiquiditySnapshot {
            buy_buckets,
            sell_buckets,
            decimals,
            base: self
                .base
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_ASSET.to_string()),
            sources,
            total_buy_base,
            total_sell_base,
            depth_chart: self.depth_chart.map(RawDepthChart::into_chart),
            fetched_at: Utc::now(),
        })
    }
}

/// A validated snapshot, input to the ladder pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySnapshot {
    pub buy_buckets: Vec<LiquidityBucket>,
    pub sell_buckets: Vec<LiquidityBucket>,
    pub decimals: u32,
    pub base: String,
    pub sources: Vec<Venue>,
    pub total_buy_base: Decimal,
    pub total_sell_base: Decimal,
    pub depth_chart: Option<DepthChart>,
    pub fetched_at: DateTime<Utc>,
}

impl LiquiditySnapshot {
    /// Snapshot from typed buckets, with totals and sources derived.
    pub fn new(
        buy_buckets: Vec<LiquidityBucket>,
        sell_buckets: Vec<LiquidityBucket>,
        decimals: u32,
    ) -> Self {
        Self {
            total_buy_base: base_total(&buy_buckets),
            total_sell_base: base_total(&sell_buckets),
            sources: sources_of(&buy_buckets, &sell_buckets),
            buy_buckets,
            sell_buckets,
            decimals,
            base: DEFAULT_BASE_ASSET.to_string(),
            depth_chart: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn buckets(&self, side: Side) -> &[LiquidityBucket] {
        match side {
            Side::Buy => &self.buy_buckets,
            Side::Sell => &self.sell_buckets,
        }
    }
}

fn validate_side(
    side: Side,
    raw: Vec<RawLiquidityBucket>,
    policy: NumericPolicy,
) -> Result<Vec<LiquidityBucket>, FetchError> {
    let mut buckets = Vec::with_capacity(raw.len());
    for (index, raw_bucket) in raw.into_iter().enumerate() {
        let validated = raw_bucket.validate(policy).map_err(|source| {
            warn!(
                side = %side,
                index,
                field = source.field().unwrap_or("-"),
                error = %source,
                "Rejected snapshot bucket"
            );
            FetchError::InvalidBucket { side, index, source }
        })?;

        for coercion in &validated.coercions {
            warn!(
                side = %side,
                index,
                field = coercion.field,
                coercion = ?coercion.kind,
                "Coerced malformed bucket field"
            );
        }
        buckets.push(validated.bucket);
    }
    debug!(side = %side, buckets = buckets.len(), "Validated snapshot side");
    Ok(buckets)
}

fn read_total(total: Option<NumericField>, buckets: &[LiquidityBucket]) -> Decimal {
    total
        .and_then(|t| t.to_decimal().ok())
        .filter(|t| *t >= Decimal::ZERO)
        .unwrap_or_else(|| base_total(buckets))
}

fn base_total(buckets: &[LiquidityBucket]) -> Decimal {
    saturating_sum(buckets.iter().map(|b| b.base_liquidity))
}

/// Distinct venues in first-seen order.
fn sources_of(buys: &[LiquidityBucket], sells: &[LiquidityBucket]) -> Vec<Venue> {
    let mut sources: Vec<Venue> = Vec::new();
    for bucket in buys.iter().chain(sells) {
        if !sources.contains(&bucket.source) {
            sources.push(bucket.source.clone());
        }
    }
    sources
}
