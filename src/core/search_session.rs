/*
 * One end-to-end search invocation. A `SearchSession` owns the query, a
 * cancellation flag, progress counters and the match accumulator. `run` enumerates
 * the project, scans each file in enumeration order and checks the flag between
 * files, so cancellation takes effect after at most one more file.
 *
 * `run` is synchronous; `SearchOrchestrator` is what moves it onto a worker thread.
 */
use super::file_system::{FileEnumeratorOperations, FileSystemError};
use super::line_scanner;
use super::models::{MatchRecord, SearchQuery};
use super::search_progress::{SearchOutcome, SearchProgress, SessionId};
use super::text_content::TextContentOperations;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub enum SearchError {
    EmptyQuery,
    Enumeration(FileSystemError),
    WorkerSpawn(io::Error),
    WorkerPanicked(String),
}

impl From<FileSystemError> for SearchError {
    fn from(err: FileSystemError) -> Self {
        SearchError::Enumeration(err)
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::EmptyQuery => write!(f, "Search query is empty"),
            SearchError::Enumeration(e) => write!(f, "Failed to enumerate project files: {e}"),
            SearchError::WorkerSpawn(e) => write!(f, "Failed to start search worker: {e}"),
            SearchError::WorkerPanicked(msg) => write!(f, "Search worker panicked: {msg}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Enumeration(e) => Some(e),
            SearchError::WorkerSpawn(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

// Cooperative cancellation signal shared between the interactive side and a worker.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct SearchSession {
    id: SessionId,
    query: SearchQuery,
    root_path: PathBuf,
    cancellation: CancellationFlag,
    files_processed: usize,
    total_files: usize,
    matches: Vec<MatchRecord>,
}

impl SearchSession {
    pub fn new(
        id: SessionId,
        query: SearchQuery,
        root_path: PathBuf,
        cancellation: CancellationFlag,
    ) -> Self {
        SearchSession {
            id,
            query,
            root_path,
            cancellation,
            files_processed: 0,
            total_files: 0,
            matches: Vec::new(),
        }
    }

    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /*
     * Runs the session to a terminal outcome. `on_progress` receives a snapshot
     * before each file is scanned and a final 1.0 snapshot after the last one.
     * On cancellation the accumulated matches are discarded and `Cancelled` is
     * returned. Per-file read problems never fail the session; a failure to
     * enumerate the project does.
     */
    pub fn run(
        &mut self,
        enumerator: &dyn FileEnumeratorOperations,
        content: &dyn TextContentOperations,
        on_progress: &mut dyn FnMut(SearchProgress),
    ) -> SearchOutcome {
        log::info!(
            "SearchSession {:?}: Searching {:?} for '{}'.",
            self.id,
            self.root_path,
            self.query
        );

        let files = match enumerator.enumerate(&self.root_path) {
            Ok(files) => files,
            Err(e) => {
                let error = SearchError::from(e);
                log::error!("SearchSession {:?}: {error}", self.id);
                return SearchOutcome::failed(error);
            }
        };
        self.total_files = files.len();

        for (index, file) in files.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                return self.cancelled();
            }
            on_progress(SearchProgress::new(
                index,
                self.total_files,
                file.name().to_string(),
            ));

            let records = line_scanner::scan(file, &self.query, content);
            if !records.is_empty() {
                log::trace!(
                    "SearchSession {:?}: {} matches in {:?}.",
                    self.id,
                    records.len(),
                    file.path()
                );
            }
            self.matches.extend(records);
            self.files_processed = index + 1;
        }

        if self.cancellation.is_cancelled() {
            return self.cancelled();
        }
        on_progress(SearchProgress::new(
            self.total_files,
            self.total_files,
            String::new(),
        ));

        log::info!(
            "SearchSession {:?}: Completed with {} matches in {} files.",
            self.id,
            self.matches.len(),
            self.total_files
        );
        SearchOutcome::completed(std::mem::take(&mut self.matches))
    }

    fn cancelled(&mut self) -> SearchOutcome {
        log::info!(
            "SearchSession {:?}: Cancelled after {} of {} files.",
            self.id,
            self.files_processed,
            self.total_files
        );
        self.matches.clear();
        SearchOutcome::Cancelled
    }
}
