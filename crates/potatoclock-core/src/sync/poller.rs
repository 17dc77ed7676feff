//! Display-side snapshot holder.
//!
//! Responses can arrive out of order and reads can fail. The poller keeps the
//! last good snapshot, drops anything older than it, and tracks the event
//! cursor so each one-shot event is handed out once.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::client::SyncClient;
use super::wire::StateResponse;
use crate::error::SyncError;
use crate::events::SequencedEvent;

/// Shortest period [`SnapshotPoller::watch`] polls at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What happened to one poll result.
#[derive(Debug)]
pub enum PollUpdate {
    /// Became the held snapshot.
    Accepted,
    /// Older than the held snapshot; dropped.
    Stale,
    /// Read failed; the held snapshot is unchanged.
    Failed(SyncError),
}

#[derive(Debug, Default)]
pub struct SnapshotPoller {
    current: Option<StateResponse>,
    cursor: u64,
}

impl SnapshotPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last accepted snapshot.
    pub fn current(&self) -> Option<&StateResponse> {
        self.current.as_ref()
    }

    /// Sequence number of the newest event already handed out.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Events that arrived with the held snapshot and were not seen before.
    pub fn fresh_events(&self) -> &[SequencedEvent] {
        self.current
            .as_ref()
            .map(|s| s.events.as_slice())
            .unwrap_or_default()
    }

    pub fn apply(&mut self, result: Result<StateResponse, SyncError>) -> PollUpdate {
        let mut incoming = match result {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!(error = %e, "poll failed, keeping last snapshot");
                return PollUpdate::Failed(e);
            }
        };
        if let Some(held) = &self.current {
            if incoming.order_key() < held.order_key() {
                debug!(
                    revision = incoming.state.revision,
                    held = held.state.revision,
                    "dropping out-of-order snapshot"
                );
                return PollUpdate::Stale;
            }
        }
        let cursor = self.cursor;
        incoming.events.retain(|e| e.seq > cursor);
        self.cursor = self.cursor.max(incoming.state.last_event_seq);
        self.current = Some(incoming);
        PollUpdate::Accepted
    }

    /// Poll `client` every `every` until `on_update` breaks. A zero period
    /// is raised to [`MIN_POLL_INTERVAL`].
    pub async fn watch<F>(&mut self, client: &SyncClient, every: Duration, mut on_update: F)
    where
        F: FnMut(&PollUpdate, &SnapshotPoller) -> ControlFlow<()>,
    {
        let mut ticker = tokio::time::interval(every.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let result = client.state(self.cursor).await;
            let update = self.apply(result);
            if on_update(&update, self).is_break() {
                break;
            }
        }
    }
}
