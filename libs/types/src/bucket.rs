//! Liquidity bucket types and the parse-and-validate boundary
//!
//! `RawLiquidityBucket` mirrors the wire payload, where every numeric field
//! may arrive as a number, a string, or not at all. `validate` turns it into
//! a typed `LiquidityBucket` under a [`NumericPolicy`]:
//!
//! - Lenient: malformed numbers become zero/absent, negative liquidity is
//!   clamped to zero, liquidity above [`MAX_LIQUIDITY`] is clamped to the cap
//!   and an inverted band is reordered. Each adjustment is
//!   recorded as a [`Coercion`].
//! - Strict: any of those conditions rejects the bucket.
//!
//! Missing fields are not malformed: absent liquidity reads as zero and an
//! absent price bound stays `None` under both policies.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::BucketError;
use crate::ids::Venue;
use crate::numeric::{NumericField, NumericPolicy, MAX_LIQUIDITY};

/// A price-banded aggregate of order liquidity at one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityBucket {
    /// Lower bound of the bucket's price band.
    pub price_floor: Option<Decimal>,
    /// Upper bound of the bucket's price band.
    pub price_ceil: Option<Decimal>,
    /// Display string for the bucket's price, part of the merge key.
    pub price_label: Option<String>,
    /// Liquidity in base-asset units.
    pub base_liquidity: Decimal,
    /// Liquidity in quote (USD-equivalent) units.
    pub usd_liquidity: Decimal,
    /// Number of orders contributing to the bucket.
    pub orders: u64,
    /// Venue the bucket was sourced from.
    pub source: Venue,
}

impl LiquidityBucket {
    /// Single-price bucket with one order and no explicit label.
    pub fn at_price(
        source: impl Into<Venue>,
        price: Decimal,
        base_liquidity: Decimal,
        usd_liquidity: Decimal,
    ) -> Self {
        Self {
            price_floor: Some(price),
            price_ceil: Some(price),
            price_label: None,
            base_liquidity,
            usd_liquidity,
            orders: 1,
            source: source.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.price_label = Some(label.into());
        self
    }

    pub fn with_orders(mut self, orders: u64) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_band(mut self, floor: Option<Decimal>, ceil: Option<Decimal>) -> Self {
        self.price_floor = floor;
        self.price_ceil = ceil;
        self
    }
}

/// Wire form of a liquidity bucket, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLiquidityBucket {
    #[serde(default)]
    pub price_floor: Option<NumericField>,
    #[serde(default)]
    pub price_ceil: Option<NumericField>,
    #[serde(default)]
    pub price_label: Option<NumericField>,
    #[serde(default)]
    pub base_liquidity: Option<NumericField>,
    #[serde(default)]
    pub usd_liquidity: Option<NumericField>,
    #[serde(default)]
    pub orders: Option<NumericField>,
    #[serde(default)]
    pub source: Option<String>,
}

/// What the lenient policy did to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionKind {
    /// Unparseable text replaced by zero/absent.
    Malformed(String),
    /// Negative value clamped to zero.
    ClampedNegative(String),
    /// Liquidity above the accepted maximum clamped to the cap.
    ClampedExcessive(String),
    /// Fractional order count truncated.
    Truncated(String),
    /// Floor and ceil swapped.
    ReorderedBand,
}

/// One adjustment applied while validating a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercion {
    pub field: &'static str,
    pub kind: CoercionKind,
}

/// A typed bucket plus the coercions applied to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBucket {
    pub bucket: LiquidityBucket,
    pub coercions: Vec<Coercion>,
}

impl ValidatedBucket {
    pub fn is_clean(&self) -> bool {
        self.coercions.is_empty()
    }
}

impl RawLiquidityBucket {
    /// Validate into a typed bucket under `policy`.
    pub fn validate(self, policy: NumericPolicy) -> Result<ValidatedBucket, BucketError> {
        let mut reader = FieldReader::new(policy);

        let mut price_floor = reader.optional_decimal("priceFloor", self.price_floor.as_ref())?;
        let mut price_ceil = reader.optional_decimal("priceCeil", self.price_ceil.as_ref())?;

        if let (Some(floor), Some(ceil)) = (price_floor, price_ceil) {
            if floor > ceil {
                if policy.is_strict() {
                    return Err(BucketError::InvertedBand {
                        floor: floor.to_string(),
                        ceil: ceil.to_string(),
                    });
                }
                reader.record("priceFloor", CoercionKind::ReorderedBand);
                price_floor = Some(ceil);
                price_ceil = Some(floor);
            }
        }

        let base_liquidity = reader.liquidity("baseLiquidity", self.base_liquidity.as_ref())?;
        let usd_liquidity = reader.liquidity("usdLiquidity", self.usd_liquidity.as_ref())?;
        let orders = reader.order_count(self.orders.as_ref())?;

        let bucket = LiquidityBucket {
            price_floor,
            price_ceil,
            price_label: self.price_label.as_ref().and_then(NumericField::as_label),
            base_liquidity,
            usd_liquidity,
            orders,
            source: self.source.map(Venue::new).unwrap_or_default(),
        };

        Ok(ValidatedBucket {
            bucket,
            coercions: reader.coercions,
        })
    }
}

impl From<&LiquidityBucket> for RawLiquidityBucket {
    fn from(bucket: &LiquidityBucket) -> Self {
        Self {
            price_floor: bucket.price_floor.map(NumericField::from),
            price_ceil: bucket.price_ceil.map(NumericField::from),
            price_label: bucket.price_label.as_deref().map(NumericField::from),
            base_liquidity: Some(bucket.base_liquidity.into()),
            usd_liquidity: Some(bucket.usd_liquidity.into()),
            orders: Some(bucket.orders.into()),
            source: Some(bucket.source.as_str().to_string()),
        }
    }
}

/// Applies the numeric policy field by field and collects coercions.
struct FieldReader {
    policy: NumericPolicy,
    coercions: Vec<Coercion>,
}

impl FieldReader {
    fn new(policy: NumericPolicy) -> Self {
        Self {
            policy,
            coercions: Vec::new(),
        }
    }

    fn record(&mut self, field: &'static str, kind: CoercionKind) {
        self.coercions.push(Coercion { field, kind });
    }

    fn optional_decimal(
        &mut self,
        field: &'static str,
        value: Option<&NumericField>,
    ) -> Result<Option<Decimal>, BucketError> {
        let Some(value) = value else {
            return Ok(None);
        };
        match value.to_decimal() {
            Ok(d) => Ok(Some(d)),
            Err(source) if self.policy.is_strict() => {
                Err(BucketError::Malformed { field, source })
            }
            Err(source) => {
                self.record(field, CoercionKind::Malformed(source.to_string()));
                Ok(None)
            }
        }
    }

    fn liquidity(
        &mut self,
        field: &'static str,
        value: Option<&NumericField>,
    ) -> Result<Decimal, BucketError> {
        let amount = self.optional_decimal(field, value)?.unwrap_or(Decimal::ZERO);
        if amount < Decimal::ZERO {
            if self.policy.is_strict() {
                return Err(BucketError::NegativeLiquidity {
                    field,
                    value: amount.to_string(),
                });
            }
            self.record(field, CoercionKind::ClampedNegative(amount.to_string()));
            return Ok(Decimal::ZERO);
        }
        if amount > MAX_LIQUIDITY {
            if self.policy.is_strict() {
                return Err(BucketError::ExcessiveLiquidity {
                    field,
                    value: amount.to_string(),
                });
            }
            self.record(field, CoercionKind::ClampedExcessive(amount.to_string()));
            return Ok(MAX_LIQUIDITY);
        }
        Ok(amount)
    }

    fn order_count(&mut self, value: Option<&NumericField>) -> Result<u64, BucketError> {
        let count = self.optional_decimal("orders", value)?.unwrap_or(Decimal::ZERO);

        if count < Decimal::ZERO {
            if self.policy.is_strict() {
                return Err(BucketError::InvalidOrderCount(count.to_string()));
            }
            self.record("orders", CoercionKind::ClampedNegative(count.to_string()));
            return Ok(0);
        }

        if !count.fract().is_zero() {
            if self.policy.is_strict() {
                return Err(BucketError::InvalidOrderCount(count.to_string()));
            }
            self.record("orders", CoercionKind::Truncated(count.to_string()));
        }

        match count.trunc().to_u64() {
            Some(n) => Ok(n),
            None if self.policy.is_strict() => {
                Err(BucketError::InvalidOrderCount(count.to_string()))
            }
            None => {
                self.record("orders", CoercionKind::Malformed(count.to_string()));
                Ok(0)
            }
        }
    }
}
