//! Ladder session: one view of the order wall across refresh ticks
//!
//! Owns the current query, the previous tick's rows and the single
//! in-flight request. Outcomes are applied in request order only:
//! a result for anything but the active request is discarded.
//!
//! Outcome handling:
//! - abort: nothing changes
//! - failure: the error replaces the ladder, previous rows are kept
//! - success: ladder and previous rows are both replaced

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use types::ids::RequestId;

use crate::delta::PreviousBuckets;
use crate::error::FetchError;
use crate::ladder::Ladder;
use crate::pipeline::rebuild_ladder_filtered;
use crate::query::SnapshotQuery;
use crate::snapshot::LiquiditySnapshot;

/// What the session currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LadderView {
    /// Nothing fetched yet.
    #[default]
    Idle,
    Ready(Ladder),
    Failed(FetchError),
}

impl LadderView {
    pub fn ladder(&self) -> Option<&Ladder> {
        match self {
            LadderView::Ready(ladder) => Some(ladder),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            LadderView::Failed(err) => Some(err.user_message()),
            _ => None,
        }
    }
}

/// Handle for one issued request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    pub id: RequestId,
    pub query: SnapshotQuery,
    pub cancel: CancellationToken,
}

/// Result of applying an outcome to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    Rebuilt,
    Failed,
    Aborted,
    /// Outcome of a superseded request.
    Discarded,
}

#[derive(Debug)]
struct ActiveRequest {
    id: RequestId,
    cancel: CancellationToken,
}

/// Published snapshot of session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderState {
    pub view: LadderView,
    pub query: SnapshotQuery,
    pub loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LadderState {
    pub fn idle(query: SnapshotQuery) -> Self {
        Self {
            view: LadderView::Idle,
            query,
            loading: false,
            updated_at: None,
        }
    }
}

#[derive(Debug)]
pub struct LadderSession {
    query: SnapshotQuery,
    previous: PreviousBuckets,
    active: Option<ActiveRequest>,
    view: LadderView,
    updated_at: Option<DateTime<Utc>>,
}

impl LadderSession {
    pub fn new(query: SnapshotQuery) -> Self {
        Self {
            query,
            previous: PreviousBuckets::new(),
            active: None,
            view: LadderView::Idle,
            updated_at: None,
        }
    }

    pub fn query(&self) -> &SnapshotQuery {
        &self.query
    }

    pub fn view(&self) -> &LadderView {
        &self.view
    }

    pub fn previous(&self) -> &PreviousBuckets {
        &self.previous
    }

    pub fn is_loading(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> LadderState {
        LadderState {
            view: self.view.clone(),
            query: self.query.clone(),
            loading: self.is_loading(),
            updated_at: self.updated_at,
        }
    }

    /// Issue a new request, cancelling the one in flight.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.cancel_active();

        let ticket = RequestTicket {
            id: RequestId::new(),
            query: self.query.clone(),
            cancel: CancellationToken::new(),
        };
        self.active = Some(ActiveRequest {
            id: ticket.id,
            cancel: ticket.cancel.clone(),
        });
        ticket
    }

    /// Cancel the in-flight request, if any.
    pub fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(request_id = %active.id, "Cancelling in-flight request");
            active.cancel.cancel();
        }
    }

    /// Switch query parameters. Returns whether anything changed.
    ///
    /// A change cancels the in-flight request and forgets the previous rows,
    /// so the next ladder starts without deltas.
    pub fn set_query(&mut self, query: SnapshotQuery) -> bool {
        if query == self.query {
            return false;
        }
        info!(
            side = %query.side,
            decimals = query.decimals,
            sources = query.sources.len(),
            "Query parameters changed"
        );
        self.cancel_active();
        self.previous.clear();
        self.query = query;
        true
    }

    /// Apply the outcome of request `id`.
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<LiquiditySnapshot, FetchError>,
    ) -> SessionUpdate {
        match &self.active {
            Some(active) if active.id == id => {}
            _ => {
                debug!(request_id = %id, "Discarding stale outcome");
                return SessionUpdate::Discarded;
            }
        }
        self.active = None;

        match outcome {
            Ok(snapshot) => {
                let ladder = rebuild_ladder_filtered(&snapshot, &self.previous, self.query.side);
                self.previous = PreviousBuckets::from_ladder(&ladder);
                self.updated_at = Some(ladder.fetched_at);
                self.view = LadderView::Ready(ladder);
                SessionUpdate::Rebuilt
            }
            Err(err) if err.is_abort() => SessionUpdate::Aborted,
            Err(err) => {
                warn!(request_id = %id, error = %err, "Snapshot fetch failed");
                self.view = LadderView::Failed(err);
                SessionUpdate::Failed
            }
        }
    }
}
