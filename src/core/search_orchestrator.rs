/*
 * Runs search sessions off the interactive thread and hands their updates back.
 *
 * Each accepted query gets a fresh `SessionId`, a fresh `CancellationFlag` and its
 * own worker thread. The worker owns the session and its match accumulator; the
 * only thing crossing back is `SearchUpdate` messages on a channel, the last of
 * which carries the whole result batch. Starting a new search or calling `cancel`
 * raises the flag of the running session and forgets its id, so anything it still
 * sends is discarded by `poll_updates`.
 */
use super::file_system::FileEnumeratorOperations;
use super::models::SearchQuery;
use super::search_progress::{SearchOutcome, SearchUpdate, SearchUpdateKind, SessionId};
use super::search_session::{CancellationFlag, Result, SearchError, SearchSession};
use super::text_content::TextContentOperations;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Running(SessionId),
    Completed(SessionId),
    Cancelled(SessionId),
    Failed(SessionId),
}

struct ActiveSession {
    id: SessionId,
    cancellation: CancellationFlag,
    worker: JoinHandle<()>,
}

pub struct SearchOrchestrator {
    enumerator: Arc<dyn FileEnumeratorOperations>,
    content: Arc<dyn TextContentOperations>,
    update_sender: Sender<SearchUpdate>,
    update_receiver: Receiver<SearchUpdate>,
    active: Option<ActiveSession>,
    next_session_id: u64,
    state: SearchState,
}

impl SearchOrchestrator {
    pub fn new(
        enumerator: Arc<dyn FileEnumeratorOperations>,
        content: Arc<dyn TextContentOperations>,
    ) -> Self {
        let (update_sender, update_receiver) = mpsc::channel();
        SearchOrchestrator {
            enumerator,
            content,
            update_sender,
            update_receiver,
            active: None,
            next_session_id: 1,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|active| active.id)
    }

    /*
     * Validates `raw_query` and starts a session over `root_path` on a new worker
     * thread. A blank query is rejected with `SearchError::EmptyQuery` before
     * anything else happens, including cancellation of the running session.
     */
    pub fn start_search(&mut self, raw_query: &str, root_path: &Path) -> Result<SessionId> {
        let query = SearchQuery::parse(raw_query).ok_or(SearchError::EmptyQuery)?;
        if let Some(previous) = self.cancel() {
            log::debug!("SearchOrchestrator: Session {previous:?} superseded by a new search.");
        }

        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        let cancellation = CancellationFlag::new();
        let mut session = SearchSession::new(
            id,
            query,
            root_path.to_path_buf(),
            cancellation.clone(),
        );

        let enumerator = Arc::clone(&self.enumerator);
        let content = Arc::clone(&self.content);
        let sender = self.update_sender.clone();

        let worker = thread::Builder::new()
            .name(format!("text-search-{}", id.0))
            .spawn(move || {
                let progress_sender = sender.clone();
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    session.run(enumerator.as_ref(), content.as_ref(), &mut |progress| {
                        // A closed channel only means nobody is listening any more.
                        let _ = progress_sender.send(SearchUpdate {
                            session_id: id,
                            kind: SearchUpdateKind::Progress(progress),
                        });
                    })
                }));
                log::debug!(
                    "SearchOrchestrator: Session {id:?} scanned {} of {} files.",
                    session.files_processed(),
                    session.total_files()
                );
                let outcome = result.unwrap_or_else(|payload| {
                    let error = SearchError::WorkerPanicked(panic_message(payload.as_ref()));
                    log::error!("SearchOrchestrator: Session {id:?}: {error}");
                    SearchOutcome::failed(error)
                });
                if sender
                    .send(SearchUpdate {
                        session_id: id,
                        kind: SearchUpdateKind::Finished(outcome),
                    })
                    .is_err()
                {
                    log::debug!("SearchOrchestrator: Session {id:?} finished with no receiver.");
                }
            })
            .map_err(SearchError::WorkerSpawn)?;

        log::debug!("SearchOrchestrator: Started session {id:?}.");
        self.active = Some(ActiveSession {
            id,
            cancellation,
            worker,
        });
        self.state = SearchState::Running(id);
        Ok(id)
    }

    // Requests cancellation of the running session, if any, and returns its id.
    pub fn cancel(&mut self) -> Option<SessionId> {
        let active = self.active.take()?;
        active.cancellation.cancel();
        self.state = SearchState::Cancelled(active.id);
        log::info!("SearchOrchestrator: Cancellation requested for {:?}.", active.id);
        // The worker is detached; it stops at the next file boundary.
        drop(active.worker);
        Some(active.id)
    }

    // Drains pending updates without blocking, keeping only those of the running session.
    pub fn poll_updates(&mut self) -> Vec<SearchUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.update_receiver.try_recv() {
            if let Some(update) = self.accept(update) {
                updates.push(update);
            }
        }
        updates
    }

    // Blocks for the next update of the running session, up to `timeout`.
    pub fn wait_for_update(&mut self, timeout: Duration) -> Option<SearchUpdate> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let update = self.update_receiver.recv_timeout(remaining).ok()?;
            if let Some(update) = self.accept(update) {
                return Some(update);
            }
        }
    }

    fn accept(&mut self, update: SearchUpdate) -> Option<SearchUpdate> {
        if self.active_session_id() != Some(update.session_id) {
            log::trace!(
                "SearchOrchestrator: Dropping update from stale session {:?}.",
                update.session_id
            );
            return None;
        }

        if let SearchUpdateKind::Finished(outcome) = &update.kind {
            let id = update.session_id;
            self.state = match outcome {
                SearchOutcome::Completed { .. } => SearchState::Completed(id),
                SearchOutcome::Cancelled => SearchState::Cancelled(id),
                SearchOutcome::Failed { .. } => SearchState::Failed(id),
            };
            if let Some(active) = self.active.take() {
                // The final message is the worker's last action, so this join is short.
                if active.worker.join().is_err() {
                    log::warn!("SearchOrchestrator: Worker for {id:?} ended abnormally.");
                }
            }
        }
        Some(update)
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
