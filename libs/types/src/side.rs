//! Book side types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

/// Book side (bid or ask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid liquidity
    Buy,
    /// Ask liquidity
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sides of the book a snapshot request asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideFilter {
    #[default]
    Both,
    Buy,
    Sell,
}

impl SideFilter {
    /// Whether buckets on `side` survive this filter.
    pub fn includes(&self, side: Side) -> bool {
        match self {
            SideFilter::Both => true,
            SideFilter::Buy => side == Side::Buy,
            SideFilter::Sell => side == Side::Sell,
        }
    }

    /// Query-string form used by the snapshot API.
    pub fn as_str(&self) -> &'static str {
        match self {
            SideFilter::Both => "both",
            SideFilter::Buy => "buy",
            SideFilter::Sell => "sell",
        }
    }
}

impl fmt::Display for SideFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SideFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" | "all" | "" => Ok(SideFilter::Both),
            "buy" | "bid" | "bids" => Ok(SideFilter::Buy),
            "sell" | "ask" | "asks" => Ok(SideFilter::Sell),
            other => Err(ParseError::UnknownSideFilter(other.to_string())),
        }
    }
}
