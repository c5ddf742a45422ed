pub mod app;
pub mod capture;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod network;
pub mod overlay;
pub mod prompt;
pub mod state;
pub mod storage;
pub mod ui;
pub mod vision;
pub use error::{AppError, AppResult};

use crate::app::AppController;
use crate::capture::StillCamera;
use crate::input::ConsoleInput;
use crate::network::{connect_with_fallback, HostNetwork};
use crate::overlay::ConsoleScreen;
use crate::storage::ImageStore;
use crate::vision::{ReqwestTransport, VisionClient, VisionOptions};

/// Entrypoint used by the binary: resolve settings, wire the host backends and
/// run the appliance loop until input closes.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting promptcam");

    let settings = config::load_settings()?;
    tracing::debug!(?settings, "settings resolved");

    if let Some(ssid) = connect_with_fallback(&mut HostNetwork, &settings.network)? {
        tracing::info!(%ssid, "using network");
    }

    let transport = ReqwestTransport::new(settings.timeout)?;
    let analyzer = VisionClient::new(
        transport,
        VisionOptions {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            api_key: settings.api_key.clone(),
            prompt_texts: settings.prompt_texts.clone(),
        },
    );
    let store = ImageStore::open(&settings.storage_dir)?;
    tracing::info!(
        root = %store.root().display(),
        images = store.images().len(),
        "image store ready"
    );

    let mut controller = AppController::new(
        StillCamera::new(settings.camera_source.clone()),
        ConsoleScreen::stdout(),
        analyzer,
        store,
        settings.wrap_columns,
    );
    let mut input = ConsoleInput::stdin();
    controller.run(&mut input)?;

    tracing::info!("promptcam stopped");
    Ok(())
}
