/*
 * This module provides the application logic layer of the search dialog,
 * centered around `SearchDialogLogic`, which acts as the Presenter. It also
 * includes `SearchDialogUiState` for state that lives only while the dialog is
 * open. Unit tests for `SearchDialogLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod search_dialog_ui_state;
pub mod ui_constants;

#[cfg(test)]
mod handler_tests;

pub use handler::{SearchDialogLogic, is_search_action_enabled};
pub use search_dialog_ui_state::SearchDialogUiState;
