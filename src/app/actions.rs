//! Maps a debounced button edge to the work it triggers in the current state.

use crate::input::ButtonEvent;
use crate::prompt::Direction;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ControllerAction {
    Capture,
    Autofocus,
    ChangePrompt(Direction),
    EnterBrowse,
    Navigate(Direction),
    ExitBrowse,
    ConfirmSend,
    Dismiss,
}

pub(super) fn resolve_action(state: AppState, event: ButtonEvent) -> Option<ControllerAction> {
    use ButtonEvent::*;
    use ControllerAction as Action;

    let action = match (state, event) {
        (AppState::LivePreview, ShutterShort) => Action::Capture,
        (AppState::LivePreview, ShutterLong) => Action::Autofocus,
        (AppState::LivePreview, Up | Left) => Action::ChangePrompt(Direction::Backward),
        (AppState::LivePreview, Down | Right) => Action::ChangePrompt(Direction::Forward),
        (AppState::LivePreview, Select) => Action::EnterBrowse,

        (AppState::Browsing | AppState::PromptArmed, Up) => {
            Action::ChangePrompt(Direction::Backward)
        }
        (AppState::Browsing | AppState::PromptArmed, Down) => {
            Action::ChangePrompt(Direction::Forward)
        }
        (AppState::PromptArmed, Left) => Action::Navigate(Direction::Backward),
        (AppState::PromptArmed, Right) => Action::Navigate(Direction::Forward),
        (AppState::PromptArmed, Select) => Action::ExitBrowse,
        (AppState::PromptArmed, Ok) => Action::ConfirmSend,

        (AppState::ResultView, Ok) => Action::Dismiss,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_preview_maps_every_control() {
        let state = AppState::LivePreview;
        assert_eq!(
            resolve_action(state, ButtonEvent::ShutterShort),
            Some(ControllerAction::Capture)
        );
        assert_eq!(
            resolve_action(state, ButtonEvent::ShutterLong),
            Some(ControllerAction::Autofocus)
        );
        assert_eq!(
            resolve_action(state, ButtonEvent::Right),
            Some(ControllerAction::ChangePrompt(Direction::Forward))
        );
        assert_eq!(
            resolve_action(state, ButtonEvent::Select),
            Some(ControllerAction::EnterBrowse)
        );
        assert_eq!(resolve_action(state, ButtonEvent::Ok), None);
    }

    #[test]
    fn armed_image_uses_left_right_for_the_cursor() {
        let state = AppState::PromptArmed;
        assert_eq!(
            resolve_action(state, ButtonEvent::Left),
            Some(ControllerAction::Navigate(Direction::Backward))
        );
        assert_eq!(
            resolve_action(state, ButtonEvent::Down),
            Some(ControllerAction::ChangePrompt(Direction::Forward))
        );
        assert_eq!(
            resolve_action(state, ButtonEvent::Ok),
            Some(ControllerAction::ConfirmSend)
        );
        assert_eq!(resolve_action(state, ButtonEvent::ShutterShort), None);
    }

    #[test]
    fn sending_and_result_view_freeze_prompt_selection() {
        for event in [
            ButtonEvent::Up,
            ButtonEvent::Down,
            ButtonEvent::Left,
            ButtonEvent::Right,
        ] {
            assert_eq!(resolve_action(AppState::Sending, event), None);
            assert_eq!(resolve_action(AppState::ResultView, event), None);
        }
        assert_eq!(
            resolve_action(AppState::ResultView, ButtonEvent::Ok),
            Some(ControllerAction::Dismiss)
        );
    }
}
