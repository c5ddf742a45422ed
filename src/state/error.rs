use super::event::AppEvent;
use super::model::AppState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

/// A transition the device state machine does not define. Reaching one means
/// the controller dispatched an event in the wrong mode.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("no transition from {from:?} on {event:?}")]
    InvalidStateTransition { from: AppState, event: AppEvent },
}
