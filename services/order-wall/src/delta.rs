//! Delta tracker for poll-to-poll liquidity changes
//!
//! Compares each merged row against the row with the same key and side from
//! the previous snapshot, and annotates it with the net USD liquidity change.
//! Deltas drive highlighting only; they never affect ranking or cumulative
//! totals.
//!
//! Delta flow:
//! 1. Carry the previous ladder's rows forward as a `PreviousBuckets` map
//! 2. Merge the new tick's buckets
//! 3. Annotate each merged row against its previous counterpart
//! 4. Replace the map with the new ladder's rows

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use types::numeric::saturating_sum;
use types::side::Side;

use crate::ladder::Ladder;
use crate::level::{MergeKey, MergedBucket};

/// Merged rows from the previous tick, keyed per side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousBuckets {
    buys: BTreeMap<MergeKey, MergedBucket>,
    sells: BTreeMap<MergeKey, MergedBucket>,
}

impl PreviousBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the rows of a ladder for the next tick's deltas.
    pub fn from_ladder(ladder: &Ladder) -> Self {
        let mut previous = Self::new();
        previous.record(Side::Buy, &ladder.buys);
        previous.record(Side::Sell, &ladder.sells);
        previous
    }

    /// Replace the stored rows for `side`.
    pub fn record(&mut self, side: Side, rows: &[MergedBucket]) {
        let map = self.side_mut(side);
        map.clear();
        for row in rows {
            map.insert(row.key(), row.clone());
        }
    }

    pub fn get(&self, side: Side, key: &MergeKey) -> Option<&MergedBucket> {
        self.side(side).get(key)
    }

    /// Rows present last tick on `side` but absent from `current`.
    pub fn vanished<'a>(&'a self, side: Side, current: &[MergedBucket]) -> Vec<&'a MergedBucket> {
        let live: BTreeSet<MergeKey> = current.iter().map(MergedBucket::key).collect();
        self.side(side)
            .iter()
            .filter(|(key, _)| !live.contains(*key))
            .map(|(_, row)| row)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    pub fn clear(&mut self) {
        self.buys.clear();
        self.sells.clear();
    }

    fn side(&self, side: Side) -> &BTreeMap<MergeKey, MergedBucket> {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<MergeKey, MergedBucket> {
        match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        }
    }
}

/// Add the USD change against `previous` to the row's delta.
///
/// Without a previous row the delta keeps whatever the merger produced.
pub fn track_delta(row: &mut MergedBucket, previous: Option<&MergedBucket>) {
    if let Some(previous) = previous {
        let change = row.usd_liquidity.saturating_sub(previous.usd_liquidity);
        row.delta_usd = row.delta_usd.saturating_add(change);
    }
}

/// Annotate every row of one side against the previous snapshot.
///
/// Rows without a counterpart are flagged `is_new` unless there was no
/// previous snapshot at all (first tick).
pub fn apply_deltas(side: Side, rows: &mut [MergedBucket], previous: &PreviousBuckets) {
    let first_tick = previous.is_empty();
    for row in rows.iter_mut() {
        let prior = previous.get(side, &row.key());
        row.is_new = prior.is_none() && !first_tick;
        track_delta(row, prior);
    }
}

/// Net USD change across a set of rows.
pub fn net_delta(rows: &[MergedBucket]) -> Decimal {
    saturating_sum(rows.iter().map(|r| r.delta_usd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_buckets;
    use rust_decimal_macros::dec;
    use types::bucket::LiquidityBucket;

    fn rows(buckets: &[LiquidityBucket]) -> Vec<MergedBucket> {
        merge_buckets(buckets, 2)
    }

    fn jupiter(label: &str, usd: Decimal) -> LiquidityBucket {
        LiquidityBucket::at_price("jupiter", dec!(1.23), usd, usd).with_label(label)
    }

    #[test]
    fn test_delta_against_previous() {
        let mut previous = PreviousBuckets::new();
        previous.record(Side::Buy, &rows(&[jupiter("1.23", dec!(100))]));

        let mut current = rows(&[jupiter("1.23", dec!(150))]);
        apply_deltas(Side::Buy, &mut current, &previous);

        assert_eq!(current[0].delta_usd, dec!(50));
        assert!(!current[0].is_new);
    }

    #[test]
    fn test_no_previous_match_keeps_zero() {
        let mut previous = PreviousBuckets::new();
        previous.record(Side::Buy, &rows(&[jupiter("1.20", dec!(100))]));

        let mut current = rows(&[jupiter("1.23", dec!(150))]);
        apply_deltas(Side::Buy, &mut current, &previous);

        assert_eq!(current[0].delta_usd, Decimal::ZERO);
        assert!(current[0].is_new);
    }

    #[test]
    fn test_first_tick_marks_nothing_new() {
        let mut current = rows(&[jupiter("1.23", dec!(150))]);
        apply_deltas(Side::Buy, &mut current, &PreviousBuckets::new());

        assert_eq!(current[0].delta_usd, Decimal::ZERO);
        assert!(!current[0].is_new);
    }

    #[test]
    fn test_sides_are_tracked_separately() {
        let mut previous = PreviousBuckets::new();
        previous.record(Side::Sell, &rows(&[jupiter("1.23", dec!(100))]));

        let mut current = rows(&[jupiter("1.23", dec!(150))]);
        apply_deltas(Side::Buy, &mut current, &previous);

        // Same key on the other side is not a counterpart
        assert_eq!(current[0].delta_usd, Decimal::ZERO);
        assert!(current[0].is_new);
    }

    #[test]
    fn test_vanished_levels() {
        let mut previous = PreviousBuckets::new();
        previous.record(
            Side::Buy,
            &rows(&[jupiter("1.23", dec!(100)), jupiter("1.22", dec!(80))]),
        );

        let current = rows(&[jupiter("1.23", dec!(100))]);
        let vanished = previous.vanished(Side::Buy, &current);

        assert_eq!(vanished.len(), 1);
        assert_eq!(vanished[0].price_label, "1.22");
    }

    #[test]
    fn test_net_delta() {
        let mut previous = PreviousBuckets::new();
        previous.record(
            Side::Sell,
            &rows(&[jupiter("1.30", dec!(100)), jupiter("1.31", dec!(100))]),
        );

        let mut current = rows(&[jupiter("1.30", dec!(70)), jupiter("1.31", dec!(120))]);
        apply_deltas(Side::Sell, &mut current, &previous);

        assert_eq!(net_delta(&current), dec!(-10));
        assert_eq!(previous.len(), 2);
    }

    #[test]
    fn test_extreme_deltas_saturate() {
        let huge = Decimal::from_scientific("7e28").unwrap();
        let mut previous = PreviousBuckets::new();
        previous.record(
            Side::Buy,
            &rows(&[jupiter("1.30", Decimal::ZERO), jupiter("1.31", Decimal::ZERO)]),
        );

        let mut current = rows(&[jupiter("1.30", huge), jupiter("1.31", huge)]);
        apply_deltas(Side::Buy, &mut current, &previous);

        assert_eq!(current[0].delta_usd, huge);
        assert_eq!(net_delta(&current), Decimal::MAX);
    }
}
