/// Top-level mode of the appliance. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Live camera feed, waiting for input.
    #[default]
    LivePreview,
    /// Blocking request to the vision API in flight.
    Sending,
    /// Browse cursor moving; a stored image is being loaded.
    Browsing,
    /// A browsed image is on screen and queued for sending on ok.
    PromptArmed,
    /// A result panel covers the screen.
    ResultView,
}

impl AppState {
    /// Prompt selection is frozen while a send or its result is on screen.
    pub const fn allows_prompt_change(self) -> bool {
        matches!(self, Self::LivePreview | Self::Browsing | Self::PromptArmed)
    }

    pub const fn shows_live_feed(self) -> bool {
        matches!(self, Self::LivePreview)
    }

    pub const fn is_browsing(self) -> bool {
        matches!(self, Self::Browsing | Self::PromptArmed)
    }
}
