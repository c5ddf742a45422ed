use crate::config::ConfigError;
use crate::network::NetworkError;
use crate::overlay::OverlayError;
use crate::state::StateError;
use crate::storage::StoreError;
use crate::vision::VisionError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Errors that stop the appliance. Recoverable failures are shown on screen
/// and never reach this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Vision(#[from] VisionError),
}
