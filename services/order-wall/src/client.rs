//! Snapshot API client
//!
//! `SnapshotSource` is the seam between the poller and the network: the
//! production `SnapshotClient` issues `GET {endpoint}?side=&decimals=&quote=&sources=`
//! and validates the body, tests substitute an in-memory source.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use types::ids::RequestId;
use types::numeric::NumericPolicy;

use crate::config::OrderWallConfig;
use crate::error::FetchError;
use crate::query::SnapshotQuery;
use crate::snapshot::{LiquiditySnapshot, SnapshotResponse};

/// Longest error body kept on a non-2xx response.
const MAX_ERROR_BODY: usize = 256;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Anything that can produce a validated liquidity snapshot.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshot(
        &self,
        query: &SnapshotQuery,
        request_id: RequestId,
    ) -> impl Future<Output = Result<LiquiditySnapshot, FetchError>> + Send;
}

/// HTTP client for the liquidity snapshot endpoint.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    policy: NumericPolicy,
}

impl SnapshotClient {
    pub fn new(config: &OrderWallConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("order-wall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            timeout: config.request_timeout,
            policy: config.numeric_policy,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SnapshotSource for SnapshotClient {
    async fn fetch_snapshot(
        &self,
        query: &SnapshotQuery,
        request_id: RequestId,
    ) -> Result<LiquiditySnapshot, FetchError> {
        debug!(%request_id, endpoint = %self.endpoint, side = %query.side, "Fetching snapshot");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&query.to_pairs())
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            warn!(%request_id, status = status.as_u16(), "Snapshot request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;
        let payload: SnapshotResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        payload.into_snapshot(self.policy, query.decimals)
    }
}

/// Run a fetch that resolves to `Aborted` once `cancel` fires.
///
/// A result that lands after cancellation is also reported as aborted.
pub async fn fetch_cancellable<S>(
    source: &S,
    query: &SnapshotQuery,
    request_id: RequestId,
    cancel: &CancellationToken,
) -> Result<LiquiditySnapshot, FetchError>
where
    S: SnapshotSource + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(FetchError::Aborted);
    }

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Aborted),
        result = source.fetch_snapshot(query, request_id) => result,
    };

    if cancel.is_cancelled() {
        return Err(FetchError::Aborted);
    }
    outcome
}
