/*
 * This module consolidates the core, platform-agnostic logic of the text search.
 * It re-exports the data model (`FileHandle`, `MatchRecord`, `SearchQuery`), the
 * service abstractions (`FileEnumeratorOperations`, `TextContentOperations`,
 * `ConfigManagerOperations`) with their core implementations, and the background
 * search machinery (`SearchSession`, `SearchOrchestrator`) together with the
 * messages it sends back to the presenter.
 */
pub mod config;
pub mod file_system;
pub mod line_scanner;
pub mod models;
pub mod path_utils;
pub mod search_orchestrator;
pub mod search_progress;
pub mod search_session;
pub mod text_content;

#[cfg(test)]
pub(crate) mod test_doubles;

pub use models::{FileHandle, MatchRecord, SearchQuery};

pub use file_system::{
    CoreFileEnumerator, EnumerationOptions, FileEnumeratorOperations, FileSystemError,
};

pub use text_content::{
    ContentError, CoreTextContentProvider, LineIndex, TextContentOperations, TextDocument,
};

pub use config::{ConfigError, ConfigManagerOperations, CoreConfigManager, SearchSettings};

pub use search_progress::{
    SearchOutcome, SearchProgress, SearchUpdate, SearchUpdateKind, SessionId,
};

pub use search_session::{CancellationFlag, SearchError, SearchSession};

pub use search_orchestrator::{SearchOrchestrator, SearchState};
