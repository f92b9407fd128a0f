//! Submit-then-poll query session
//!
//! A session tracks one filter query by its [`QueryId`]. Status only moves
//! forward (see [`QueryStatus::advance`]); results are a separate fetch
//! once the query is complete.

use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use super::status::QueryStatus;
use crate::client::ChemSpider;
use crate::errors::{ChemSpiderError, ChemSpiderResult};
use crate::models::{FilterStatus, QueryId, RecordId};
use crate::observability::{log_event_with_fields, Event};

/// Last observed state of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status: QueryStatus,
    pub count: Option<u64>,
    pub message: Option<String>,
    pub elapsed: Option<Duration>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: QueryStatus::Created,
            count: None,
            message: None,
            elapsed: None,
        }
    }
}

/// Handle on a submitted filter query
pub struct QuerySession {
    client: ChemSpider,
    query_id: QueryId,
    state: Mutex<SessionState>,
}

impl QuerySession {
    /// Track `query_id`; no I/O until the first poll
    pub fn new(client: ChemSpider, query_id: QueryId) -> Self {
        Self {
            client,
            query_id,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn query_id(&self) -> QueryId {
        self.query_id
    }

    /// Last observed status; no I/O
    pub fn status(&self) -> QueryStatus {
        self.state().status
    }

    /// Copy of the last observed state
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    /// True once a terminal status has been observed; no I/O
    pub fn ready(&self) -> bool {
        self.status().is_terminal()
    }

    /// Fetch the current status once and apply it
    pub fn poll(&self) -> ChemSpiderResult<QueryStatus> {
        let reported = self.client.filter_status(self.query_id)?;
        Ok(self.apply(&reported))
    }

    /// Apply a status report; returns the resulting status
    pub fn apply(&self, reported: &FilterStatus) -> QueryStatus {
        let observed = QueryStatus::from_wire(&reported.status);
        let mut state = self.state();
        let before = state.status;
        state.status = before.advance(observed);

        if state.status == observed {
            if reported.count.is_some() {
                state.count = reported.count;
            }
            if let Some(message) = reported.message.as_ref().filter(|m| !m.is_empty()) {
                state.message = Some(message.clone());
            }
            if let Some(elapsed) = reported.elapsed() {
                state.elapsed = Some(elapsed);
            }
        }
        let status = state.status;
        drop(state);

        let query_id = self.query_id.to_string();
        log_event_with_fields(
            Event::QueryStatus,
            &[
                ("observed", reported.status.as_str()),
                ("query_id", query_id.as_str()),
                ("status", status.as_str()),
            ],
        );
        if status != before && status.is_terminal() {
            let event = if status.is_failure() {
                Event::QueryFailed
            } else {
                Event::QueryComplete
            };
            log_event_with_fields(
                event,
                &[("query_id", query_id.as_str()), ("status", status.as_str())],
            );
        }
        status
    }

    /// Poll until a terminal status or until `timeout` elapses
    ///
    /// Backs off exponentially from the configured poll interval up to the
    /// configured maximum, with random jitter. Hitting the deadline returns
    /// `Timeout`; the remote query keeps running.
    pub fn wait(&self, timeout: Duration) -> ChemSpiderResult<QueryStatus> {
        let config = self.client.config();
        let deadline = Instant::now() + timeout;
        let mut backoff = config.poll_interval().max(Duration::from_millis(1));
        let max_backoff = config.max_backoff().max(backoff);

        loop {
            let status = self.poll()?;
            if status.is_terminal() {
                return Ok(status);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ChemSpiderError::Timeout(format!(
                    "Query {} still {} after {:?}",
                    self.query_id, status, timeout
                )));
            }

            thread::sleep(with_jitter(backoff).min(deadline - now));
            backoff = (backoff * 2).min(max_backoff);
        }
    }

    /// Result IDs of a complete query
    pub fn results(&self, start: Option<u64>, count: Option<u64>) -> ChemSpiderResult<Vec<RecordId>> {
        self.require(QueryStatus::is_terminal)?;
        self.client.filter_results(self.query_id, start, count)
    }

    /// Result IDs available so far
    ///
    /// Only allowed while `Suspended`, `PartialResultReady` or `Complete`.
    pub fn partial_results(
        &self,
        start: Option<u64>,
        count: Option<u64>,
    ) -> ChemSpiderResult<Vec<RecordId>> {
        self.require(QueryStatus::allows_partial)?;
        self.client.filter_results(self.query_id, start, count)
    }

    /// All results as gzipped SDF
    pub fn results_sdf(&self) -> ChemSpiderResult<Vec<u8>> {
        self.require(QueryStatus::is_terminal)?;
        self.client.filter_results_sdf(self.query_id)
    }

    fn require(&self, allowed: fn(&QueryStatus) -> bool) -> ChemSpiderResult<()> {
        let state = self.snapshot();
        if state.status.is_failure() {
            return Err(ChemSpiderError::QueryFailed {
                status: state.status.as_str().to_string(),
                message: state
                    .message
                    .unwrap_or_else(|| failure_message(state.status).to_string()),
            });
        }
        if allowed(&state.status) {
            Ok(())
        } else {
            Err(ChemSpiderError::Validation(format!(
                "Query {} is {}; results are not available yet",
                self.query_id, state.status
            )))
        }
    }
}

impl std::fmt::Debug for QuerySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySession")
            .field("query_id", &self.query_id)
            .field("state", &self.snapshot())
            .finish()
    }
}

pub(crate) fn failure_message(status: QueryStatus) -> &'static str {
    match status {
        QueryStatus::TooManyRecords => "Too many records",
        _ => "Search failed",
    }
}

/// Add up to 25% random jitter
fn with_jitter(base: Duration) -> Duration {
    let base_ms = base.as_millis() as u64;
    let jitter = if base_ms >= 4 {
        rand::thread_rng().gen_range(0..=base_ms / 4)
    } else {
        0
    };
    Duration::from_millis(base_ms + jitter)
}
