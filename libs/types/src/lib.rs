//! Types library for the order wall
//!
//! Core type definitions shared by the ladder pipeline and the snapshot
//! client: venues, book sides, decimal parsing and the liquidity bucket
//! parse boundary.
//!
//! # Modules
//! - `ids`: Identifiers (RequestId, Venue)
//! - `side`: Book side and side filter
//! - `numeric`: Decimal parsing of loosely typed wire numbers
//! - `bucket`: Liquidity buckets and their validation
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod side;
pub mod numeric;
pub mod bucket;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::side::*;
    pub use crate::numeric::*;
    pub use crate::bucket::*;
    pub use crate::errors::*;
}
