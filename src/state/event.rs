use super::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    CaptureSucceeded,
    EnterBrowse,
    ImageLoaded,
    /// A browsed image could not be decoded; the cursor stays on it.
    ImageUnreadable,
    BrowseFailed,
    Navigate,
    ExitBrowse,
    ConfirmSend,
    SendSucceeded,
    SendFailed,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<AppState>,
    pub event: AppEvent,
    pub to: AppState,
}

impl StateTransition {
    pub const fn new(from: Option<AppState>, event: AppEvent, to: AppState) -> Self {
        Self { from, event, to }
    }
}
