//! Background refresh loop
//!
//! Polls the snapshot source on a fixed interval and publishes every state
//! change on a watch channel. A query change aborts the in-flight fetch and
//! refetches immediately; the shutdown token aborts it and ends the task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use types::ids::RequestId;

use crate::client::{fetch_cancellable, SnapshotSource};
use crate::error::FetchError;
use crate::metrics::PollerMetrics;
use crate::query::SnapshotQuery;
use crate::session::{LadderSession, LadderState, SessionUpdate};
use crate::snapshot::LiquiditySnapshot;

/// Consecutive failed fetches after which the poller reports degradation.
pub const DEGRADED_AFTER_FAILURES: u64 = 3;

/// Control surface for a running poller.
pub struct PollerHandle {
    query_tx: watch::Sender<SnapshotQuery>,
    state_rx: watch::Receiver<LadderState>,
    shutdown: CancellationToken,
    metrics: Arc<PollerMetrics>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Change query parameters. Returns false when they are unchanged.
    pub fn update_query(&self, query: SnapshotQuery) -> bool {
        self.query_tx.send_if_modified(|current| {
            if *current == query {
                false
            } else {
                *current = query;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<LadderState> {
        self.state_rx.clone()
    }

    pub fn metrics(&self) -> Arc<PollerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Stop polling and wait for the task to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(err) = self.task.await {
            warn!(error = %err, "Poller task ended abnormally");
        }
    }
}

/// Spawn a poller on the current runtime. The first fetch starts at once.
pub fn spawn_poller<S>(source: S, query: SnapshotQuery, poll_interval: Duration) -> PollerHandle
where
    S: SnapshotSource + 'static,
{
    let (query_tx, query_rx) = watch::channel(query.clone());
    let (state_tx, state_rx) = watch::channel(LadderState::idle(query.clone()));
    let shutdown = CancellationToken::new();
    let metrics = Arc::new(PollerMetrics::new());

    let poller = Poller {
        source,
        session: LadderSession::new(query),
        query_rx,
        state_tx,
        shutdown: shutdown.clone(),
        metrics: Arc::clone(&metrics),
        poll_interval,
    };
    let task = tokio::spawn(poller.run());

    PollerHandle {
        query_tx,
        state_rx,
        shutdown,
        metrics,
        task,
    }
}

enum Wake {
    Shutdown,
    QueryChanged,
    Fetched(Result<LiquiditySnapshot, FetchError>),
}

struct Poller<S> {
    source: S,
    session: LadderSession,
    query_rx: watch::Receiver<SnapshotQuery>,
    state_tx: watch::Sender<LadderState>,
    shutdown: CancellationToken,
    metrics: Arc<PollerMetrics>,
    poll_interval: Duration,
}

impl<S: SnapshotSource> Poller<S> {
    async fn run(mut self) {
        info!(interval_ms = self.poll_interval.as_millis() as u64, "Order wall poller started");

        let period = self.poll_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let ticket = self.session.begin_request();
            self.metrics.record_poll();
            self.publish();

            let wake = {
                let fetch =
                    fetch_cancellable(&self.source, &ticket.query, ticket.id, &ticket.cancel);
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => Wake::Shutdown,
                    changed = self.query_rx.changed() => match changed {
                        Ok(()) => Wake::QueryChanged,
                        Err(_) => Wake::Shutdown,
                    },
                    outcome = fetch => Wake::Fetched(outcome),
                }
            };

            match wake {
                Wake::Shutdown => {
                    self.session.cancel_active();
                    self.metrics.record_abort();
                    break;
                }
                Wake::QueryChanged => {
                    self.metrics.record_abort();
                    self.apply_query_change();
                    ticker.reset();
                    continue;
                }
                Wake::Fetched(outcome) => self.apply(ticket.id, outcome),
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                changed = self.query_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.apply_query_change();
                    ticker.reset();
                }
                _ = ticker.tick() => {}
            }
        }

        self.publish();
        info!(metrics = ?self.metrics.export(), "Order wall poller stopped");
    }

    fn apply(&mut self, id: RequestId, outcome: Result<LiquiditySnapshot, FetchError>) {
        let started = Instant::now();
        let update = self.session.complete(id, outcome);
        match update {
            SessionUpdate::Rebuilt => {
                let micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
                self.metrics.record_applied(micros);
                if let Some(ladder) = self.session.view().ladder() {
                    debug!(
                        request_id = %id,
                        buys = ladder.buys.len(),
                        sells = ladder.sells.len(),
                        mid_price = %ladder.summary.mid_price,
                        rebuild_us = micros,
                        "Applied snapshot"
                    );
                }
            }
            SessionUpdate::Failed => {
                self.metrics.record_failure();
                if self.metrics.is_degraded(DEGRADED_AFTER_FAILURES) {
                    warn!(
                        consecutive_failures = self.metrics.consecutive_failures(),
                        "Snapshot API failing repeatedly"
                    );
                }
            }
            SessionUpdate::Aborted => self.metrics.record_abort(),
            SessionUpdate::Discarded => self.metrics.record_stale(),
        }
        self.publish();
    }

    fn apply_query_change(&mut self) {
        let query = self.query_rx.borrow_and_update().clone();
        self.session.set_query(query);
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.session.state());
    }
}
