//! Error types for the snapshot client and configuration

use std::time::Duration;

use thiserror::Error;
use types::errors::BucketError;
use types::side::Side;

/// Failure of a single snapshot fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Superseded or torn down. Never shown to the user.
    #[error("request aborted")]
    Aborted,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("snapshot API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed snapshot payload: {0}")]
    Decode(String),

    #[error("invalid {side} bucket #{index}: {source}")]
    InvalidBucket {
        side: Side,
        index: usize,
        #[source]
        source: BucketError,
    },
}

impl FetchError {
    pub fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }

    /// Single human-readable line for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Aborted => String::new(),
            FetchError::Timeout(_) => "Order book request timed out".to_string(),
            FetchError::Transport(_) => "Could not reach the liquidity service".to_string(),
            FetchError::Status { status, .. } => {
                format!("Liquidity service responded with status {}", status)
            }
            FetchError::Decode(_) | FetchError::InvalidBucket { .. } => {
                "Liquidity service returned an unreadable order book".to_string()
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Invalid environment configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(var: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}
