//! Order Wall Service
//!
//! Turns per-venue liquidity snapshots for the NOS token into a merged,
//! price-ordered order book ladder:
//! - Normalizes raw buckets into ladder rows with a derived unit price
//! - Merges rows across venues by `source:priceLabel`
//! - Annotates rows with their USD change since the previous poll
//! - Sorts each side and accumulates cumulative depth
//! - Summarizes best bid/ask, mid price, spread and depth-bar maxima
//! - Polls the snapshot API on an interval with abortable requests
//!
//! # Architecture
//!
//! ```text
//!   Snapshot API
//!        │
//!   ┌────▼─────┐
//!   │ Client   │  ← validates buckets, aborts on cancel
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐   ┌──────────┐
//!   │ Merge    │◄──│Normalize │
//!   └────┬─────┘   └──────────┘
//!        │
//!   ┌────▼─────┐
//!   │ Delta    │  ← previous tick's rows
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐
//!   │ Ladder   │  ← sort + cumulative depth
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐
//!   │ Summary  │
//!   └────┬─────┘
//!        │
//!   ┌────▼─────────────┐
//!   │ Session / Poller │ → watch channel
//!   └──────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod delta;
pub mod error;
pub mod ladder;
pub mod level;
pub mod merge;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod poller;
pub mod query;
pub mod session;
pub mod snapshot;
pub mod summary;

pub use client::{fetch_cancellable, SnapshotClient, SnapshotSource};
pub use config::OrderWallConfig;
pub use delta::PreviousBuckets;
pub use error::{ConfigError, FetchError};
pub use ladder::Ladder;
pub use level::{DeltaDirection, MergeKey, MergedBucket};
pub use pipeline::{rebuild_ladder, rebuild_ladder_filtered};
pub use poller::{spawn_poller, PollerHandle};
pub use query::SnapshotQuery;
pub use session::{LadderSession, LadderState, LadderView, SessionUpdate};
pub use snapshot::{DepthChart, DepthPoint, LiquiditySnapshot, SnapshotResponse};
pub use summary::LadderSummary;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
