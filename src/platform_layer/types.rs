/*
 * This module defines the data types exchanged between the search dialog's
 * application logic and whatever host shell renders it. It includes identifiers
 * for windows and controls, platform-agnostic input events (`AppEvent`), the
 * commands the host must carry out (`PlatformCommand`), severity levels for
 * status messages, and the `PlatformEventHandler` trait the application logic
 * implements. No toolkit type appears here.
 */

use std::path::PathBuf;

// An opaque identifier for a host window.
//
// The application logic uses it to address commands to the dialog and to
// recognize which dialog an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub(crate) usize);

impl WindowId {
    pub const fn new(raw: usize) -> Self {
        WindowId(raw)
    }
}

// A logical identifier for a control inside a window, mapped by the host to a native widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(u32);

impl ControlId {
    pub const fn new(raw: u32) -> Self {
        ControlId(raw)
    }
}

// One row of the result list. `index` is the position in the delivered match list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItemDescriptor {
    pub index: usize,
    pub text: String,
}

// --- Events from the host to App Logic ---

/*
 * User input and window lifecycle notifications, translated by the host into a
 * platform-agnostic form. "Submit" covers both the search button and pressing
 * Enter in the query field; "activate" is the host's select-and-open gesture,
 * typically a double-click.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // The dialog's widgets exist and it is ready to be populated and shown.
    SearchDialogOpened {
        window_id: WindowId,
    },
    SearchSubmitted {
        window_id: WindowId,
        text: String,
    },
    ResultActivated {
        window_id: WindowId,
        index: usize,
    },
    CancelSearchRequested {
        window_id: WindowId,
    },
    WindowCloseRequestedByUser {
        window_id: WindowId,
    },
    // The `WindowId` should be considered invalid after this event.
    WindowDestroyed {
        window_id: WindowId,
    },
}

// Defines the severity of a status message. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    None,
    Information,
    Warning,
    Error,
}

// Commands sent from the application logic to the host.
//
// Presentation commands target a control of the dialog; `OpenFileAtLocation`
// is the navigation request and is not tied to the dialog window.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCommand {
    SetWindowTitle {
        window_id: WindowId,
        title: String,
    },
    ShowWindow {
        window_id: WindowId,
    },
    CloseWindow {
        window_id: WindowId,
    },
    UpdateLabelText {
        window_id: WindowId,
        control_id: ControlId,
        text: String,
        severity: MessageSeverity,
    },
    // Replaces the whole content of a result list in one step.
    PopulateResultList {
        window_id: WindowId,
        control_id: ControlId,
        items: Vec<ResultItemDescriptor>,
    },
    UpdateProgress {
        window_id: WindowId,
        control_id: ControlId,
        fraction: f64,
        current_file_name: String,
    },
    SetControlVisible {
        window_id: WindowId,
        control_id: ControlId,
        visible: bool,
    },
    SetControlEnabled {
        window_id: WindowId,
        control_id: ControlId,
        enabled: bool,
    },
    /*
     * Opens `path` in an editor, places the caret at the start of line
     * `line_number` plus `column_number` characters, and scrolls it into view.
     * Both numbers are 0-based.
     */
    OpenFileAtLocation {
        path: PathBuf,
        line_number: usize,
        column_number: usize,
    },
}

// --- Trait for App Logic to Handle Events ---

// Implemented by the application logic; driven by the host's event loop.
//
// The host forwards every `AppEvent` to `handle_event` and then drains commands
// with `try_dequeue_command` until it returns `None`. Draining is also how
// results from a background search reach the host, so the loop must keep
// calling it while the dialog is open.
pub trait PlatformEventHandler: Send + 'static {
    fn handle_event(&mut self, event: AppEvent);

    // Called when the host is about to exit its loop.
    fn on_quit(&mut self) {}

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
