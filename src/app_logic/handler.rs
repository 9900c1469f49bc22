use crate::core::{
    CoreFileEnumerator, CoreTextContentProvider, FileEnumeratorOperations, SearchError,
    SearchOrchestrator, SearchOutcome, SearchProgress, SearchSettings, SearchUpdate,
    SearchUpdateKind, TextContentOperations, search_progress::failure_message,
};
use crate::platform_layer::{
    AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler, WindowId,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::search_dialog_ui_state::SearchDialogUiState;
use super::ui_constants::{
    PROGRESS_BAR_ID, RESULT_LIST_ID, SEARCH_BUTTON_ID, SEARCH_INPUT_ID, STATUS_CANCELLED,
    STATUS_ENTER_QUERY, STATUS_LABEL_ID, STATUS_NO_PROJECT, STATUS_SEARCHING,
};

/*
 * The "open text search" action is only offered while a project is open.
 */
pub fn is_search_action_enabled(project_root: Option<&Path>) -> bool {
    project_root.is_some()
}

/*
 * Presenter for the text search dialog, written against the platform-agnostic
 * `AppEvent`/`PlatformCommand` contract. It validates queries, starts and cancels
 * searches through a `SearchOrchestrator`, and turns the orchestrator's updates
 * into commands. Updates are pulled whenever the host drains commands, so all UI
 * state is touched only on the host's thread.
 */
pub struct SearchDialogLogic {
    project_root: Option<PathBuf>,
    orchestrator: SearchOrchestrator,
    ui_state: Option<SearchDialogUiState>,
    synchronous_command_queue: VecDeque<PlatformCommand>,
}

impl SearchDialogLogic {
    pub fn new(
        project_root: Option<PathBuf>,
        enumerator: Arc<dyn FileEnumeratorOperations>,
        content: Arc<dyn TextContentOperations>,
    ) -> Self {
        SearchDialogLogic {
            project_root,
            orchestrator: SearchOrchestrator::new(enumerator, content),
            ui_state: None,
            synchronous_command_queue: VecDeque::new(),
        }
    }

    // Wires the core enumerator and content provider using persisted settings.
    pub fn from_settings(project_root: Option<PathBuf>, settings: &SearchSettings) -> Self {
        Self::new(
            project_root,
            Arc::new(CoreFileEnumerator::new(settings.enumeration_options())),
            Arc::new(CoreTextContentProvider::new(settings.max_file_size_bytes)),
        )
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn is_search_running(&self) -> bool {
        self.orchestrator.is_running()
    }

    #[cfg(test)]
    pub(crate) fn ui_state(&self) -> Option<&SearchDialogUiState> {
        self.ui_state.as_ref()
    }

    /*
     * Blocks until the running search, if any, reaches a terminal outcome or
     * `timeout` expires, queueing the resulting commands. Returns whether the
     * search has settled. Meant for hosts without an idle loop, and for tests.
     */
    pub fn wait_for_search(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.orchestrator.is_running() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            match self.orchestrator.wait_for_update(remaining) {
                Some(update) => self.apply_search_update(update),
                None => break,
            }
        }
        !self.orchestrator.is_running()
    }

    fn enqueue_command(&mut self, command: PlatformCommand) {
        self.synchronous_command_queue.push_back(command);
    }

    fn set_status(&mut self, text: &str, severity: MessageSeverity) {
        let Some(ui_state) = self.ui_state.as_mut() else {
            return;
        };
        ui_state.status_text = text.to_string();
        ui_state.status_severity = severity;
        let window_id = ui_state.window_id;
        self.enqueue_command(PlatformCommand::UpdateLabelText {
            window_id,
            control_id: STATUS_LABEL_ID,
            text: text.to_string(),
            severity,
        });
    }

    fn set_progress_visible(&mut self, window_id: WindowId, visible: bool) {
        self.enqueue_command(PlatformCommand::SetControlVisible {
            window_id,
            control_id: PROGRESS_BAR_ID,
            visible,
        });
    }

    fn populate_results(&mut self, window_id: WindowId) {
        let items = self
            .ui_state
            .as_ref()
            .map(|state| state.result_descriptors())
            .unwrap_or_default();
        self.enqueue_command(PlatformCommand::PopulateResultList {
            window_id,
            control_id: RESULT_LIST_ID,
            items,
        });
    }

    fn is_our_window(&self, window_id: WindowId) -> bool {
        self.ui_state
            .as_ref()
            .is_some_and(|state| state.window_id == window_id)
    }

    fn handle_dialog_opened(&mut self, window_id: WindowId) {
        log::debug!("SearchDialogLogic: Dialog {window_id:?} opened.");
        self.orchestrator.cancel();
        self.ui_state = Some(SearchDialogUiState::new(window_id));

        let title = SearchDialogUiState::compose_window_title(self.project_root());
        self.enqueue_command(PlatformCommand::SetWindowTitle { window_id, title });
        self.populate_results(window_id);
        self.set_progress_visible(window_id, false);
        if self.project_root.is_some() {
            self.set_status(STATUS_ENTER_QUERY, MessageSeverity::Information);
        } else {
            self.set_status(STATUS_NO_PROJECT, MessageSeverity::Warning);
            for control_id in [SEARCH_INPUT_ID, SEARCH_BUTTON_ID] {
                self.enqueue_command(PlatformCommand::SetControlEnabled {
                    window_id,
                    control_id,
                    enabled: false,
                });
            }
        }
        self.enqueue_command(PlatformCommand::ShowWindow { window_id });
    }

    fn handle_search_submitted(&mut self, window_id: WindowId, text: &str) {
        let Some(root) = self.project_root.clone() else {
            log::warn!("SearchDialogLogic: Search submitted without an open project.");
            self.set_status(STATUS_NO_PROJECT, MessageSeverity::Warning);
            return;
        };

        match self.orchestrator.start_search(text, &root) {
            Ok(session_id) => {
                if let Some(ui_state) = self.ui_state.as_mut() {
                    ui_state.begin_session(session_id);
                }
                self.populate_results(window_id);
                self.set_status(STATUS_SEARCHING, MessageSeverity::Information);
                self.set_progress_visible(window_id, true);
            }
            Err(SearchError::EmptyQuery) => {
                log::debug!("SearchDialogLogic: Ignoring blank query.");
                self.set_status(STATUS_ENTER_QUERY, MessageSeverity::Information);
            }
            Err(e) => {
                log::error!("SearchDialogLogic: Could not start search: {e}");
                self.set_status(&failure_message(&e), MessageSeverity::Error);
            }
        }
    }

    fn handle_result_activated(&mut self, index: usize) {
        let Some(ui_state) = self.ui_state.as_mut() else {
            return;
        };
        let Some(record) = ui_state.result_at(index) else {
            log::warn!("SearchDialogLogic: Activated result {index} does not exist.");
            return;
        };
        let command = PlatformCommand::OpenFileAtLocation {
            path: record.file.path().to_path_buf(),
            line_number: record.line_number,
            column_number: record.column_number,
        };
        ui_state.selected_index = Some(index);
        log::debug!("SearchDialogLogic: Opening result {index}: {command:?}");
        self.enqueue_command(command);
    }

    fn cancel_running_search(&mut self) -> bool {
        let Some(session_id) = self.orchestrator.cancel() else {
            return false;
        };
        log::debug!("SearchDialogLogic: Cancelled session {session_id:?}.");
        if let Some(ui_state) = self.ui_state.as_mut() {
            ui_state.pending_session = None;
        }
        true
    }

    fn pump_search_updates(&mut self) {
        for update in self.orchestrator.poll_updates() {
            self.apply_search_update(update);
        }
    }

    fn apply_search_update(&mut self, update: SearchUpdate) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        if ui_state.pending_session != Some(update.session_id) {
            log::trace!(
                "SearchDialogLogic: Ignoring update for {:?}.",
                update.session_id
            );
            return;
        }
        let window_id = ui_state.window_id;

        match update.kind {
            SearchUpdateKind::Progress(progress) => self.apply_progress(window_id, progress),
            SearchUpdateKind::Finished(outcome) => self.apply_outcome(window_id, outcome),
        }
    }

    fn apply_progress(&mut self, window_id: WindowId, progress: SearchProgress) {
        let announce = self
            .ui_state
            .as_ref()
            .is_some_and(|state| !state.file_count_announced)
            && progress.total_files > 0;
        if announce {
            if let Some(ui_state) = self.ui_state.as_mut() {
                ui_state.file_count_announced = true;
            }
            self.set_status(&progress.status_text(), MessageSeverity::Information);
        }
        self.enqueue_command(PlatformCommand::UpdateProgress {
            window_id,
            control_id: PROGRESS_BAR_ID,
            fraction: progress.fraction,
            current_file_name: progress.current_file_name,
        });
    }

    fn apply_outcome(&mut self, window_id: WindowId, outcome: SearchOutcome) {
        if let Some(ui_state) = self.ui_state.as_mut() {
            ui_state.pending_session = None;
        }
        self.set_progress_visible(window_id, false);

        match outcome {
            SearchOutcome::Completed { matches, summary } => {
                log::info!("SearchDialogLogic: {summary}");
                if let Some(ui_state) = self.ui_state.as_mut() {
                    ui_state.results = matches;
                }
                self.populate_results(window_id);
                self.set_status(&summary, MessageSeverity::Information);
            }
            SearchOutcome::Failed { message } => {
                self.set_status(&message, MessageSeverity::Error);
            }
            SearchOutcome::Cancelled => {
                /*
                 * Not reached through `SearchOrchestrator`: `cancel` forgets the
                 * session before its worker reports, so this message is dropped as
                 * stale. The cancel handler sets the status itself.
                 */
                self.set_status(STATUS_CANCELLED, MessageSeverity::Information);
            }
        }
    }
}

impl PlatformEventHandler for SearchDialogLogic {
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchDialogOpened { window_id } => self.handle_dialog_opened(window_id),
            AppEvent::SearchSubmitted { window_id, text } => {
                if self.is_our_window(window_id) {
                    self.handle_search_submitted(window_id, &text);
                }
            }
            AppEvent::ResultActivated { window_id, index } => {
                if self.is_our_window(window_id) {
                    self.handle_result_activated(index);
                }
            }
            AppEvent::CancelSearchRequested { window_id } => {
                if self.is_our_window(window_id) && self.cancel_running_search() {
                    self.set_progress_visible(window_id, false);
                    self.set_status(STATUS_CANCELLED, MessageSeverity::Information);
                }
            }
            AppEvent::WindowCloseRequestedByUser { window_id } => {
                if self.is_our_window(window_id) {
                    log::debug!("SearchDialogLogic: Close requested for {window_id:?}.");
                    self.cancel_running_search();
                    self.enqueue_command(PlatformCommand::CloseWindow { window_id });
                }
            }
            AppEvent::WindowDestroyed { window_id } => {
                if self.is_our_window(window_id) {
                    self.cancel_running_search();
                    self.ui_state = None;
                }
            }
        }
    }

    fn on_quit(&mut self) {
        log::debug!("SearchDialogLogic: on_quit, cancelling any running search.");
        self.cancel_running_search();
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        if self.synchronous_command_queue.is_empty() {
            self.pump_search_updates();
        }
        self.synchronous_command_queue.pop_front()
    }
}
