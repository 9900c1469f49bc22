/*
 * Defines the messages exchanged between the background search worker and the
 * interactive side. A session streams `SearchProgress` snapshots while it runs and
 * ends with exactly one `SearchOutcome`. Every message is tagged with the session
 * that produced it so that updates from a superseded session can be dropped.
 */
use super::models::MatchRecord;

pub const STATUS_NO_RESULTS: &str = "No results found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/*
 * A snapshot of how far a running session has come.
 * `fraction` is `files_processed / total_files` in 0.0..=1.0 and
 * `current_file_name` is the display name of the file being scanned.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SearchProgress {
    pub fraction: f64,
    pub current_file_name: String,
    pub files_processed: usize,
    pub total_files: usize,
}

impl SearchProgress {
    pub fn new(files_processed: usize, total_files: usize, current_file_name: String) -> Self {
        let fraction = if total_files == 0 {
            1.0
        } else {
            (files_processed as f64 / total_files as f64).clamp(0.0, 1.0)
        };
        SearchProgress {
            fraction,
            current_file_name,
            files_processed,
            total_files,
        }
    }

    // Status line shown while the session runs, e.g. "Searching... (12 files)".
    pub fn status_text(&self) -> String {
        format!("Searching... ({} files)", self.total_files)
    }
}

// Terminal state of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed {
        matches: Vec<MatchRecord>,
        summary: String,
    },
    Cancelled,
    Failed {
        message: String,
    },
}

impl SearchOutcome {
    pub fn completed(matches: Vec<MatchRecord>) -> Self {
        let summary = summarize_match_count(matches.len());
        SearchOutcome::Completed { matches, summary }
    }

    pub fn failed(detail: impl std::fmt::Display) -> Self {
        SearchOutcome::Failed {
            message: failure_message(detail),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SearchOutcome::Completed { .. })
    }
}

// User-facing text for a search that could not finish.
pub fn failure_message(detail: impl std::fmt::Display) -> String {
    format!("Error during search: {detail}")
}

pub fn summarize_match_count(count: usize) -> String {
    match count {
        0 => STATUS_NO_RESULTS.to_string(),
        1 => "1 result found".to_string(),
        n => format!("{n} results found"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdateKind {
    Progress(SearchProgress),
    Finished(SearchOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchUpdate {
    pub session_id: SessionId,
    pub kind: SearchUpdateKind,
}
