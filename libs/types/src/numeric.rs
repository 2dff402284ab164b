//! Decimal parsing for loosely typed wire numbers
//!
//! The snapshot API sends numbers and numeric strings interchangeably.
//! Everything is read into `rust_decimal::Decimal` so sums are exact and
//! independent of input order.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{NumericError, ParseError};

/// Largest scale `Decimal` can represent.
pub const MAX_DECIMALS: u32 = 28;

/// Largest liquidity amount accepted from the wire (1e24).
///
/// Sums of capped amounts stay far inside `Decimal`'s range (about 7.9e28).
pub const MAX_LIQUIDITY: Decimal =
    Decimal::from_parts(2_701_131_776, 466_537_709, 54_210, false, 0);

/// How the parse boundary treats malformed or out-of-range numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Coerce to zero/absent and report the coercion.
    #[default]
    Lenient,
    /// Reject the bucket.
    Strict,
}

impl NumericPolicy {
    pub fn is_strict(&self) -> bool {
        matches!(self, NumericPolicy::Strict)
    }
}

impl fmt::Display for NumericPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericPolicy::Lenient => f.write_str("lenient"),
            NumericPolicy::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for NumericPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(NumericPolicy::Lenient),
            "strict" => Ok(NumericPolicy::Strict),
            other => Err(ParseError::UnknownNumericPolicy(other.to_string())),
        }
    }
}

/// A JSON value that should hold a number
///
/// Accepts JSON numbers and strings. Anything else deserializes into
/// `Other` so a single odd field does not fail the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl NumericField {
    /// Parse into a decimal.
    pub fn to_decimal(&self) -> Result<Decimal, NumericError> {
        match self {
            NumericField::Number(n) => parse_decimal(&n.to_string()),
            NumericField::Text(s) => parse_decimal(s),
            NumericField::Other(v) => Err(NumericError::Malformed(v.to_string())),
        }
    }

    /// Render as a display label (used for `priceLabel`).
    pub fn as_label(&self) -> Option<String> {
        let label = match self {
            NumericField::Number(n) => n.to_string(),
            NumericField::Text(s) => s.trim().to_string(),
            NumericField::Other(_) => return None,
        };
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}

impl From<Decimal> for NumericField {
    fn from(value: Decimal) -> Self {
        NumericField::Text(value.to_string())
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        NumericField::Text(value.to_string())
    }
}

impl From<u64> for NumericField {
    fn from(value: u64) -> Self {
        NumericField::Number(value.into())
    }
}

/// Parse decimal text, accepting plain and scientific notation.
pub fn parse_decimal(text: &str) -> Result<Decimal, NumericError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NumericError::Empty);
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(|d| d.normalize())
        .map_err(|_| NumericError::Malformed(trimmed.to_string()))
}

/// Sum that pins at `Decimal::MAX` instead of overflowing.
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Format a price with exactly `decimals` fractional digits (HALF_UP).
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let mut rounded =
        value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain_and_scientific() {
        assert_eq!(parse_decimal("1.25").unwrap(), dec!(1.25));
        assert_eq!(parse_decimal(" 42 ").unwrap(), dec!(42));
        assert_eq!(parse_decimal("1e-7").unwrap(), dec!(0.0000001));
        assert_eq!(parse_decimal("2.5E3").unwrap(), dec!(2500));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_decimal(""), Err(NumericError::Empty));
        assert_eq!(
            parse_decimal("abc"),
            Err(NumericError::Malformed("abc".to_string()))
        );
        assert!(parse_decimal("NaN").is_err());
    }

    #[test]
    fn test_numeric_field_from_json() {
        let field: NumericField = serde_json::from_str("0.015").unwrap();
        assert_eq!(field.to_decimal().unwrap(), dec!(0.015));

        let field: NumericField = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(field.to_decimal().unwrap(), dec!(12.5));

        let field: NumericField = serde_json::from_str("true").unwrap();
        assert!(matches!(field, NumericField::Other(_)));
        assert!(field.to_decimal().is_err());
    }

    #[test]
    fn test_numeric_field_label() {
        let field: NumericField = serde_json::from_str("1.23").unwrap();
        assert_eq!(field.as_label().as_deref(), Some("1.23"));
        assert_eq!(NumericField::from("  ").as_label(), None);
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(dec!(1.2), 3), "1.200");
        assert_eq!(format_fixed(dec!(1.2345), 3), "1.235");
        assert_eq!(format_fixed(dec!(0.98), 0), "1");
        assert_eq!(format_fixed(dec!(7), 2), "7.00");
    }

    #[test]
    fn test_liquidity_cap_value() {
        assert_eq!(MAX_LIQUIDITY, Decimal::from_scientific("1e24").unwrap());
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([dec!(1.5), dec!(2.5)]), dec!(4));
        assert_eq!(saturating_sum(Vec::new()), Decimal::ZERO);
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("STRICT".parse::<NumericPolicy>().unwrap(), NumericPolicy::Strict);
        assert_eq!(NumericPolicy::default(), NumericPolicy::Lenient);
        assert!("loose".parse::<NumericPolicy>().is_err());
    }
}
