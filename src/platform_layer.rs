pub mod types;

pub use types::{
    AppEvent, ControlId, MessageSeverity, PlatformCommand, PlatformEventHandler,
    ResultItemDescriptor, WindowId,
};
