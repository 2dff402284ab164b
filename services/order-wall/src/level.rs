//! Ladder rows: merged buckets and their merge key
//!
//! A `MergedBucket` is one row of the ladder. It carries the summed
//! liquidity of every raw bucket sharing its `source:priceLabel` key, the
//! derived unit price, the USD delta against the previous poll and the
//! cumulative depth once the side has been sorted.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::Venue;

/// Identifies one ladder row: `source:priceLabel`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeKey {
    pub source: Venue,
    pub price_label: String,
}

impl MergeKey {
    pub fn new(source: Venue, price_label: impl Into<String>) -> Self {
        Self {
            source,
            price_label: price_label.into(),
        }
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.price_label)
    }
}

/// Highlight direction for a row's liquidity change since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaDirection {
    Up,
    Down,
    Unchanged,
}

/// A single ladder row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedBucket {
    pub source: Venue,
    pub price_label: String,
    /// Most recent non-null floor seen for this key.
    pub price_floor: Option<Decimal>,
    /// Most recent non-null ceil seen for this key.
    pub price_ceil: Option<Decimal>,
    pub base_liquidity: Decimal,
    pub usd_liquidity: Decimal,
    pub orders: u64,
    /// `usd_liquidity / base_liquidity` when both are positive.
    pub usd_per_base: Option<Decimal>,
    /// Signed USD liquidity change against the previous snapshot.
    pub delta_usd: Decimal,
    /// Key was absent from a non-empty previous snapshot.
    pub is_new: bool,
    pub cumulative_base: Decimal,
    pub cumulative_usd: Decimal,
}

impl MergedBucket {
    /// Zeroed row seeded at `key`.
    pub fn seeded(key: &MergeKey) -> Self {
        Self {
            source: key.source.clone(),
            price_label: key.price_label.clone(),
            price_floor: None,
            price_ceil: None,
            base_liquidity: Decimal::ZERO,
            usd_liquidity: Decimal::ZERO,
            orders: 0,
            usd_per_base: None,
            delta_usd: Decimal::ZERO,
            is_new: false,
            cumulative_base: Decimal::ZERO,
            cumulative_usd: Decimal::ZERO,
        }
    }

    pub fn key(&self) -> MergeKey {
        MergeKey::new(self.source.clone(), self.price_label.clone())
    }

    pub fn delta_direction(&self) -> DeltaDirection {
        if self.delta_usd > Decimal::ZERO {
            DeltaDirection::Up
        } else if self.delta_usd < Decimal::ZERO {
            DeltaDirection::Down
        } else {
            DeltaDirection::Unchanged
        }
    }
}
