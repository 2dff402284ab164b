//! Error types for bucket parsing and validation
//!
//! Error taxonomy using thiserror

use thiserror::Error;

/// A single numeric field could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("empty value")]
    Empty,

    #[error("not a number: {0}")]
    Malformed(String),
}

/// Raw bucket rejected at the parse boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BucketError {
    #[error("Malformed field {field}: {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: NumericError,
    },

    #[error("Negative liquidity in {field}: {value}")]
    NegativeLiquidity { field: &'static str, value: String },

    #[error("Liquidity in {field} above the accepted maximum: {value}")]
    ExcessiveLiquidity { field: &'static str, value: String },

    #[error("Inverted price band: floor {floor} above ceil {ceil}")]
    InvertedBand { floor: String, ceil: String },

    #[error("Invalid order count: {0}")]
    InvalidOrderCount(String),
}

impl BucketError {
    /// Wire name of the field that caused the rejection, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            BucketError::Malformed { field, .. } => Some(field),
            BucketError::NegativeLiquidity { field, .. } => Some(field),
            BucketError::ExcessiveLiquidity { field, .. } => Some(field),
            BucketError::InvertedBand { .. } => Some("priceFloor"),
            BucketError::InvalidOrderCount(_) => Some("orders"),
        }
    }
}

/// Unrecognised enumerated value in configuration or query text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown side filter: {0}")]
    UnknownSideFilter(String),

    #[error("Unknown numeric policy: {0}")]
    UnknownNumericPolicy(String),
}
