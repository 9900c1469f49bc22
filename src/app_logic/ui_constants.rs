/*
 * Defines shared constants for the search dialog: logical control identifiers
 * that the host maps to native widgets, and the user-facing texts the presenter
 * puts into them.
 */

use crate::platform_layer::ControlId;

pub const APP_NAME: &str = "TextFinder";

pub const DIALOG_TITLE: &str = "Text Search";

// --- Control IDs ---
pub const SEARCH_INPUT_ID: ControlId = ControlId::new(2001);

pub const SEARCH_BUTTON_ID: ControlId = ControlId::new(2002);

pub const RESULT_LIST_ID: ControlId = ControlId::new(2003);

// Label at the bottom of the dialog showing prompts, progress and result counts.
pub const STATUS_LABEL_ID: ControlId = ControlId::new(2004);

pub const PROGRESS_BAR_ID: ControlId = ControlId::new(2005);

// --- Status texts ---
pub const STATUS_ENTER_QUERY: &str = "Enter a search query";

pub const STATUS_SEARCHING: &str = "Searching...";

pub const STATUS_CANCELLED: &str = "Search cancelled";

pub const STATUS_NO_PROJECT: &str = "No project is open";
