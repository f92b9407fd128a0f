//! Search results, produced on the calling thread or in the background
//!
//! Both modes run [`run_search`]; the only difference is which thread
//! calls it. Foreground readers see snapshots of the shared state under a
//! mutex and block on the condvar until the worker finishes.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::request::{SearchMode, SearchRequest};
use super::session::{failure_message, QuerySession};
use super::status::QueryStatus;
use crate::client::ChemSpider;
use crate::compound::Compound;
use crate::errors::{ChemSpiderError, ChemSpiderResult};
use crate::models::{QueryId, RecordId};
use crate::observability::{log_event_with_fields, Event, ObservationScope};

const SEARCH_THREAD_NAME: &str = "chemspider-search";

#[derive(Debug)]
struct SearchState {
    finished: bool,
    status: QueryStatus,
    query_id: Option<QueryId>,
    message: Option<String>,
    duration: Option<Duration>,
    compounds: Vec<Compound>,
    error: Option<ChemSpiderError>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            finished: false,
            status: QueryStatus::Created,
            query_id: None,
            message: None,
            duration: None,
            compounds: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<SearchState>,
    done: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut SearchState)) {
        f(&mut self.lock());
    }

    fn finish(&self, outcome: ChemSpiderResult<Vec<Compound>>) {
        let mut state = self.lock();
        match outcome {
            Ok(compounds) => {
                if compounds.is_empty() && state.message.is_none() {
                    state.message = Some("No results found".to_string());
                }
                state.compounds = compounds;
            }
            Err(err) => state.error = Some(err),
        }
        state.finished = true;
        drop(state);
        self.done.notify_all();
    }
}

/// Ordered result collection of one search
///
/// Cheap to clone; clones observe the same search.
#[derive(Debug, Clone)]
pub struct Results {
    shared: Arc<Shared>,
}

impl Results {
    /// Start `request` in the given mode
    pub fn start(client: &ChemSpider, request: SearchRequest, mode: SearchMode) -> Self {
        let shared = Arc::new(Shared::default());

        match mode {
            SearchMode::Blocking => run_search(client, &request, &shared),
            SearchMode::Background => {
                let worker_client = client.clone();
                let worker_shared = Arc::clone(&shared);
                let spawned = thread::Builder::new()
                    .name(SEARCH_THREAD_NAME.to_string())
                    .spawn(move || run_search(&worker_client, &request, &worker_shared));
                if let Err(e) = spawned {
                    shared.finish(Err(ChemSpiderError::Transport(format!(
                        "Failed to start search thread: {}",
                        e
                    ))));
                }
            }
        }

        Self { shared }
    }

    /// True once the search has finished, successfully or not
    pub fn ready(&self) -> bool {
        self.shared.lock().finished
    }

    /// True once the search has finished without error
    pub fn success(&self) -> bool {
        let state = self.shared.lock();
        state.finished && state.error.is_none()
    }

    /// Block until the search has finished
    pub fn wait(&self) {
        let mut state = self.shared.lock();
        while !state.finished {
            state = self.shared.done.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Block up to `timeout`; returns whether the search has finished
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .done
            .wait_timeout_while(state, timeout, |s| !s.finished)
            .unwrap_or_else(|e| e.into_inner());
        state.finished
    }

    fn finished(&self) -> MutexGuard<'_, SearchState> {
        self.wait();
        self.shared.lock()
    }

    /// Last status reported by the service; does not block
    pub fn status(&self) -> QueryStatus {
        self.shared.lock().status
    }

    /// Query ID, once the filter has been submitted; does not block
    pub fn query_id(&self) -> Option<QueryId> {
        self.shared.lock().query_id
    }

    /// Contextual message from the service; blocks
    pub fn message(&self) -> Option<String> {
        self.finished().message.clone()
    }

    /// Server-side elapsed time; blocks
    pub fn duration(&self) -> Option<Duration> {
        self.finished().duration
    }

    /// Error that ended the search, if any; blocks
    pub fn error(&self) -> Option<ChemSpiderError> {
        self.finished().error.clone()
    }

    /// Number of results; 0 for a failed search. Blocks.
    pub fn len(&self) -> usize {
        self.finished().compounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alias of [`Results::len`]
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Result at `index`; blocks
    pub fn get(&self, index: usize) -> Option<Compound> {
        self.finished().compounds.get(index).cloned()
    }

    /// All results in service order, or the error that ended the search
    pub fn compounds(&self) -> ChemSpiderResult<Vec<Compound>> {
        let state = self.finished();
        match &state.error {
            Some(err) => Err(err.clone()),
            None => Ok(state.compounds.clone()),
        }
    }

    /// Result record IDs in service order
    pub fn ids(&self) -> ChemSpiderResult<Vec<RecordId>> {
        Ok(self.compounds()?.iter().map(Compound::record_id).collect())
    }

    /// Iterate over a snapshot of the results; empty for a failed search
    pub fn iter(&self) -> std::vec::IntoIter<Compound> {
        self.finished().compounds.clone().into_iter()
    }
}

/// Finishes the search with an error if the worker unwinds before `finish`
struct FinishGuard<'a> {
    shared: &'a Shared,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        let finished = self.shared.lock().finished;
        if !finished {
            self.shared.finish(Err(ChemSpiderError::Transport(
                "search worker panicked".to_string(),
            )));
        }
    }
}

/// Submit, poll until terminal, then fetch result IDs
fn run_search(client: &ChemSpider, request: &SearchRequest, shared: &Shared) {
    let _guard = FinishGuard { shared };
    let scope = ObservationScope::with_fields("SEARCH", &[("kind", request.kind())]);
    let outcome = search(client, request, shared);
    match &outcome {
        Ok(compounds) => {
            let count = compounds.len().to_string();
            scope.complete_with_fields(&[("count", count.as_str())]);
        }
        Err(err) => scope.fail(&err.to_string()),
    }
    shared.finish(outcome);
}

fn search(
    client: &ChemSpider,
    request: &SearchRequest,
    shared: &Shared,
) -> ChemSpiderResult<Vec<Compound>> {
    let query_id = request.submit(client)?;
    shared.update(|s| s.query_id = Some(query_id));

    let config = client.config();
    let session = QuerySession::new(client.clone(), query_id);
    let mut status = QueryStatus::Created;

    for attempt in 0..config.max_poll_requests {
        status = session.poll()?;
        let observed = session.snapshot();
        shared.update(|s| {
            s.status = observed.status;
            if observed.message.is_some() {
                s.message = observed.message.clone();
            }
            if observed.elapsed.is_some() {
                s.duration = observed.elapsed;
            }
        });

        if status.is_terminal() {
            break;
        }
        if attempt + 1 < config.max_poll_requests {
            thread::sleep(config.poll_interval());
        }
    }

    match status {
        QueryStatus::Complete => {}
        failed if failed.is_failure() => {
            let message = session
                .snapshot()
                .message
                .unwrap_or_else(|| failure_message(failed).to_string());
            return Err(ChemSpiderError::QueryFailed {
                status: failed.as_str().to_string(),
                message,
            });
        }
        _ => {
            let query = query_id.to_string();
            log_event_with_fields(
                Event::QueryFailed,
                &[("query_id", query.as_str()), ("reason", "poll limit reached")],
            );
            return Err(ChemSpiderError::Timeout(format!(
                "Query {} not complete after {} status checks",
                query_id, config.max_poll_requests
            )));
        }
    }

    if session.snapshot().count == Some(0) {
        return Ok(Vec::new());
    }
    let ids = session.results(None, None)?;
    Ok(client.get_compounds(&ids))
}
