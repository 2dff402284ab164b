//! Identifier types for liquidity venues and snapshot requests
//!
//! Request IDs use UUID v7 so fetches sort chronologically in logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Venues the order wall knows how to label.
pub const KNOWN_VENUES: [&str; 4] = ["jupiter", "gate", "mexc", "bitvavo"];

/// Identifier for a single snapshot fetch
///
/// A new RequestId is minted for every request the poller issues, so an
/// aborted fetch and its replacement can be told apart in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new RequestId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Liquidity venue identifier (e.g., "jupiter", "gate", "mexc")
///
/// Names are trimmed and lowercased on construction. A blank name falls back
/// to [`Venue::DEFAULT`], which is also what buckets without a source use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Venue(String);

impl Venue {
    /// Venue assumed for buckets that do not name their source.
    pub const DEFAULT: &'static str = "jupiter";

    pub fn new(name: impl AsRef<str>) -> Self {
        let normalized = name.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            Self::jupiter()
        } else {
            Self(normalized)
        }
    }

    pub fn jupiter() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Get the venue name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this venue is one of [`KNOWN_VENUES`].
    pub fn is_known(&self) -> bool {
        KNOWN_VENUES.contains(&self.0.as_str())
    }
}

impl Default for Venue {
    fn default() -> Self {
        Self::jupiter()
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Venue {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Venue {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_creation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "RequestIds should be unique");
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_venue_normalization() {
        assert_eq!(Venue::new("  MEXC ").as_str(), "mexc");
        assert_eq!(Venue::from("Gate").as_str(), "gate");
    }

    #[test]
    fn test_blank_venue_defaults_to_jupiter() {
        assert_eq!(Venue::new(""), Venue::jupiter());
        assert_eq!(Venue::new("   ").as_str(), "jupiter");
        assert_eq!(Venue::default().as_str(), Venue::DEFAULT);
    }

    #[test]
    fn test_known_venues() {
        assert!(Venue::new("bitvavo").is_known());
        assert!(!Venue::new("kraken").is_known());
    }

    #[test]
    fn test_venue_serialization() {
        let venue = Venue::new("gate");
        let json = serde_json::to_string(&venue).unwrap();
        assert_eq!(json, "\"gate\"");
    }
}
