//! Cross-exchange merger
//!
//! Folds buckets that share a `source:priceLabel` key into one ladder row.
//! Two buckets from the same venue at the same label are summed as
//! same-book depth. Rows come out in first-seen key order, unsorted; the
//! cumulative builder relies on that order for stable tie-breaking.

use std::collections::BTreeMap;

use types::bucket::LiquidityBucket;

use crate::level::{MergeKey, MergedBucket};
use crate::normalize::{normalize, renormalize};

/// Accumulates the buckets of one side for one refresh tick.
#[derive(Debug, Clone)]
pub struct BucketMerger {
    /// Display precision used to label buckets without a price label.
    decimals: u32,
    /// Merge key → position in `rows`.
    index: BTreeMap<MergeKey, usize>,
    /// Merged rows in first-seen order.
    rows: Vec<MergedBucket>,
}

impl BucketMerger {
    pub fn new(decimals: u32) -> Self {
        Self {
            decimals,
            index: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    /// Fold one bucket into its row, seeding a zeroed row for an unseen key.
    pub fn push(&mut self, bucket: &LiquidityBucket) {
        let incoming = normalize(bucket, self.decimals);
        let key = incoming.key();

        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                self.rows.push(MergedBucket::seeded(&key));
                let position = self.rows.len() - 1;
                self.index.insert(key, position);
                position
            }
        };

        absorb(&mut self.rows[position], &incoming);
    }

    /// Number of distinct keys merged so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Merged rows in first-seen order.
    pub fn finish(self) -> Vec<MergedBucket> {
        self.rows
    }
}

impl<'a> Extend<&'a LiquidityBucket> for BucketMerger {
    fn extend<I: IntoIterator<Item = &'a LiquidityBucket>>(&mut self, iter: I) {
        for bucket in iter {
            self.push(bucket);
        }
    }
}

/// Merge one side's buckets at the given display precision.
pub fn merge_buckets<'a, I>(buckets: I, decimals: u32) -> Vec<MergedBucket>
where
    I: IntoIterator<Item = &'a LiquidityBucket>,
{
    let mut merger = BucketMerger::new(decimals);
    merger.extend(buckets);
    merger.finish()
}

/// Add `incoming` liquidity to `row` and refresh its unit price.
///
/// Liquidity sums pin at `Decimal::MAX` rather than overflow.
fn absorb(row: &mut MergedBucket, incoming: &MergedBucket) {
    row.base_liquidity = row.base_liquidity.saturating_add(incoming.base_liquidity);
    row.usd_liquidity = row.usd_liquidity.saturating_add(incoming.usd_liquidity);
    row.orders = row.orders.saturating_add(incoming.orders);

    if incoming.price_floor.is_some() {
        row.price_floor = incoming.price_floor;
    }
    if incoming.price_ceil.is_some() {
        row.price_ceil = incoming.price_ceil;
    }

    renormalize(row);
}
