use std::collections::VecDeque;

use super::error::{StateError, StateResult};
use super::{event::StateTransition, AppEvent, AppState};

/// Transitions kept for diagnostics; the device loop runs indefinitely.
const HISTORY_LIMIT: usize = 32;

#[derive(Debug)]
pub struct StateMachine {
    state: AppState,
    transition_history: VecDeque<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            transition_history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn can_transition(&self, event: AppEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: AppEvent) -> Option<AppState> {
        use AppEvent::*;
        match (self.state, event) {
            (AppState::LivePreview, CaptureSucceeded) => Some(AppState::Sending),
            (AppState::LivePreview, EnterBrowse) => Some(AppState::Browsing),
            (AppState::Browsing, ImageLoaded) => Some(AppState::PromptArmed),
            (AppState::Browsing, ImageUnreadable) => Some(AppState::PromptArmed),
            (AppState::Browsing, BrowseFailed) => Some(AppState::LivePreview),
            (AppState::PromptArmed, Navigate) => Some(AppState::Browsing),
            (AppState::PromptArmed, ExitBrowse) => Some(AppState::LivePreview),
            (AppState::PromptArmed, ConfirmSend) => Some(AppState::Sending),
            (AppState::Sending, SendSucceeded) => Some(AppState::ResultView),
            (AppState::Sending, SendFailed) => Some(AppState::LivePreview),
            (AppState::ResultView, Dismiss) => Some(AppState::LivePreview),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: AppEvent) -> StateResult<AppState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        if self.transition_history.len() == HISTORY_LIMIT {
            self.transition_history.pop_front();
        }
        self.transition_history.push_back(record);

        Ok(self.state)
    }

    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.transition_history.back()
    }
}

#[cfg(test)]
impl StateMachine {
    fn history(&self) -> Vec<StateTransition> {
        self.transition_history.iter().copied().collect()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppState::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_transition_tracks_valid_and_invalid_events() {
        let mut machine = StateMachine::new();
        assert!(machine.can_transition(AppEvent::CaptureSucceeded));
        assert!(machine.can_transition(AppEvent::EnterBrowse));
        assert!(!machine.can_transition(AppEvent::Dismiss));

        let _ = machine
            .transition(AppEvent::EnterBrowse)
            .expect("live preview -> browsing should transition");

        assert!(machine.can_transition(AppEvent::ImageLoaded));
        assert!(machine.can_transition(AppEvent::BrowseFailed));
        assert!(!machine.can_transition(AppEvent::ConfirmSend));
    }

    #[test]
    fn browse_and_send_records_history_with_ordered_entries() {
        let mut machine = StateMachine::new();
        for event in [
            AppEvent::EnterBrowse,
            AppEvent::ImageLoaded,
            AppEvent::Navigate,
            AppEvent::ImageLoaded,
            AppEvent::ConfirmSend,
            AppEvent::SendSucceeded,
            AppEvent::Dismiss,
        ] {
            machine
                .transition(event)
                .unwrap_or_else(|err| panic!("{event:?} should transition: {err}"));
        }

        assert_eq!(machine.state(), AppState::LivePreview);
        let history = machine.history();
        assert_eq!(history.len(), 7);
        assert_eq!(
            history[0],
            StateTransition::new(
                Some(AppState::LivePreview),
                AppEvent::EnterBrowse,
                AppState::Browsing
            )
        );
        assert_eq!(
            history[2],
            StateTransition::new(
                Some(AppState::PromptArmed),
                AppEvent::Navigate,
                AppState::Browsing
            )
        );
        assert_eq!(
            history[4],
            StateTransition::new(
                Some(AppState::PromptArmed),
                AppEvent::ConfirmSend,
                AppState::Sending
            )
        );
        assert_eq!(
            machine.last_transition().map(|record| record.event),
            Some(AppEvent::Dismiss)
        );
    }

    #[test]
    fn unreadable_image_keeps_the_browse_session() {
        let mut machine = StateMachine::new();
        for event in [
            AppEvent::EnterBrowse,
            AppEvent::ImageLoaded,
            AppEvent::Navigate,
            AppEvent::ImageUnreadable,
        ] {
            machine
                .transition(event)
                .unwrap_or_else(|err| panic!("{event:?} should transition: {err}"));
        }
        assert_eq!(machine.state(), AppState::PromptArmed);
        assert!(machine.can_transition(AppEvent::Navigate));
        assert!(!StateMachine::new().can_transition(AppEvent::ImageUnreadable));
    }

    #[test]
    fn failed_send_returns_to_live_preview() {
        let mut machine = StateMachine::new();
        machine
            .transition(AppEvent::CaptureSucceeded)
            .expect("capture should start a send");
        assert_eq!(machine.state(), AppState::Sending);
        machine
            .transition(AppEvent::SendFailed)
            .expect("send failure should be accepted");
        assert_eq!(machine.state(), AppState::LivePreview);
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(AppEvent::Dismiss)
            .expect_err("live preview -> dismiss should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: AppState::LivePreview,
                event: AppEvent::Dismiss
            }
        ));
        assert_eq!(machine.state(), AppState::LivePreview);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let mut machine = StateMachine::new();
        for _ in 0..HISTORY_LIMIT {
            machine
                .transition(AppEvent::EnterBrowse)
                .expect("enter browse");
            machine
                .transition(AppEvent::BrowseFailed)
                .expect("browse failed");
        }
        assert_eq!(machine.history().len(), HISTORY_LIMIT);
        assert_eq!(
            machine.last_transition().map(|record| record.to),
            Some(AppState::LivePreview)
        );
    }
}
