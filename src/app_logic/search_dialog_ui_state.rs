/*
 * This module defines the SearchDialogUiState struct.
 * SearchDialogUiState holds state that only exists while the search dialog is
 * open: the window identifier, the match list currently shown (in display
 * order, so a list index maps straight to a record), the selected row, the
 * session whose results the dialog is waiting for, and the last status text.
 */
use crate::core::{MatchRecord, SessionId};
use crate::platform_layer::{MessageSeverity, ResultItemDescriptor, WindowId};
use std::path::Path;

use super::ui_constants::{DIALOG_TITLE, STATUS_ENTER_QUERY};

#[derive(Debug)]
pub struct SearchDialogUiState {
    pub window_id: WindowId,
    /* Records backing the result list; replaced wholesale when a session completes. */
    pub results: Vec<MatchRecord>,
    pub selected_index: Option<usize>,
    /* Session the dialog is waiting on. `None` when idle. */
    pub pending_session: Option<SessionId>,
    /* Set once the "Searching... (N files)" text has been shown for the pending session. */
    pub file_count_announced: bool,
    pub status_text: String,
    pub status_severity: MessageSeverity,
}

impl SearchDialogUiState {
    pub fn new(window_id: WindowId) -> Self {
        log::debug!("SearchDialogUiState::new called for window_id: {window_id:?}");
        SearchDialogUiState {
            window_id,
            results: Vec::new(),
            selected_index: None,
            pending_session: None,
            file_count_announced: false,
            status_text: STATUS_ENTER_QUERY.to_string(),
            status_severity: MessageSeverity::Information,
        }
    }

    // Builds list rows for the current results.
    pub fn result_descriptors(&self) -> Vec<ResultItemDescriptor> {
        self.results
            .iter()
            .enumerate()
            .map(|(index, record)| ResultItemDescriptor {
                index,
                text: record.display_label(),
            })
            .collect()
    }

    pub fn result_at(&self, index: usize) -> Option<&MatchRecord> {
        self.results.get(index)
    }

    pub fn begin_session(&mut self, session_id: SessionId) {
        self.results.clear();
        self.selected_index = None;
        self.pending_session = Some(session_id);
        self.file_count_announced = false;
    }

    pub fn compose_window_title(project_root: Option<&Path>) -> String {
        match project_root {
            Some(root) => format!("{DIALOG_TITLE} - [{}]", root.display()),
            None => format!("{DIALOG_TITLE} - [No Project]"),
        }
    }
}
