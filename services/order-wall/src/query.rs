//! Snapshot query parameters

use serde::{Deserialize, Serialize};
use types::ids::{Venue, KNOWN_VENUES};
use types::numeric::MAX_DECIMALS;
use types::side::SideFilter;

pub const DEFAULT_DECIMALS: u32 = 4;
pub const DEFAULT_QUOTE: &str = "USD";

/// Parameters of one snapshot request.
///
/// Changing any of them makes in-flight requests stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    pub side: SideFilter,
    pub decimals: u32,
    pub quote: String,
    pub sources: Vec<Venue>,
}

impl Default for SnapshotQuery {
    fn default() -> Self {
        Self {
            side: SideFilter::Both,
            decimals: DEFAULT_DECIMALS,
            quote: DEFAULT_QUOTE.to_string(),
            sources: KNOWN_VENUES.iter().map(Venue::new).collect(),
        }
    }
}

impl SnapshotQuery {
    pub fn with_side(mut self, side: SideFilter) -> Self {
        self.side = side;
        self
    }

    /// Precision is capped at the decimal type's scale limit.
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals.min(MAX_DECIMALS);
        self
    }

    pub fn with_sources<I, V>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Venue>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// URL query pairs. Sources are sent comma-joined and omitted when empty.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("side", self.side.as_str().to_string()),
            ("decimals", self.decimals.to_string()),
            ("quote", self.quote.clone()),
        ];
        if !self.sources.is_empty() {
            let sources: Vec<&str> = self.sources.iter().map(Venue::as_str).collect();
            pairs.push(("sources", sources.join(",")));
        }
        pairs
    }
}
