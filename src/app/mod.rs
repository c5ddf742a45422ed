//! The appliance loop: polls input, drives the state machine and owns every
//! collaborator.

use std::time::{Duration, Instant};

use crate::capture::{capture_into, CameraBackend, CaptureError};
use crate::error::AppResult;
use crate::input::{ButtonEvent, InputPoll, InputSource};
use crate::overlay::{OverlayRenderer, Screen};
use crate::prompt::{Direction, Prompt, PromptCatalog};
use crate::state::{AppEvent, AppState, StateMachine};
use crate::storage::{BrowseCursor, ImageRef, ImageStore, ResultPersister, StoreError};
use crate::ui::{COLOR_TOKENS, LAYOUT_TOKENS};
use crate::vision::ImageAnalyzer;

mod actions;

use self::actions::{resolve_action, ControllerAction};

/// Idle pause between polls when no input arrived.
const IDLE_TICK: Duration = Duration::from_millis(30);

const BANNER_CAPTURING: &str = "~>";
const BANNER_FAILED: &str = ":(";
const BANNER_STORAGE_FAILED: &str = "SD :(";
const BANNER_SENDING: &str = "send..";
const BANNER_ARMED: &str = "SEND?";
const BANNER_NO_IMAGES: &str = "no images";
const BANNER_SEND_FAILED: &str = "send failed";
const BANNER_SAVE_FAILED: &str = "save failed";

pub struct AppController<C, S, A> {
    machine: StateMachine,
    catalog: PromptCatalog,
    store: ImageStore,
    analyzer: A,
    persister: ResultPersister,
    renderer: OverlayRenderer<S>,
    camera: C,
    browse_cursor: Option<BrowseCursor>,
    /// Browsed image queued for sending; `None` while the cursor sits on an
    /// unreadable file.
    armed: Option<ImageRef>,
    /// Live feed stays paused until then so an error banner can be read.
    live_paused_until: Option<Instant>,
}

impl<C, S, A> AppController<C, S, A>
where
    C: CameraBackend,
    S: Screen,
    A: ImageAnalyzer,
{
    pub fn new(camera: C, screen: S, analyzer: A, store: ImageStore, wrap_columns: usize) -> Self {
        let catalog = PromptCatalog::new();
        let renderer = OverlayRenderer::new(screen, wrap_columns, catalog.current());
        Self {
            machine: StateMachine::new(),
            catalog,
            store,
            analyzer,
            persister: ResultPersister::new(),
            renderer,
            camera,
            browse_cursor: None,
            armed: None,
            live_paused_until: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.machine.state()
    }

    pub fn prompt(&self) -> Prompt {
        self.catalog.current()
    }

    pub fn renderer(&self) -> &OverlayRenderer<S> {
        &self.renderer
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Image currently shown while browsing.
    pub fn browsed_image(&self) -> Option<&ImageRef> {
        self.armed.as_ref()
    }

    pub fn browse_cursor(&self) -> Option<BrowseCursor> {
        self.browse_cursor
    }

    /// Poll `input` until it closes, one step per poll.
    pub fn run<I: InputSource + ?Sized>(&mut self, input: &mut I) -> AppResult<()> {
        tracing::info!(prompt = %self.prompt(), "appliance loop started");
        loop {
            match input.poll() {
                InputPoll::Closed => break,
                InputPoll::Pressed(event) => self.step(Some(event))?,
                InputPoll::Idle => {
                    self.step(None)?;
                    std::thread::sleep(IDLE_TICK);
                }
            }
        }
        tracing::info!(state = %self.machine, "appliance loop stopped");
        Ok(())
    }

    /// One loop iteration: refresh the live feed, then handle at most one edge.
    ///
    /// User-facing failures become banners. Only invariant breaches return `Err`.
    pub fn step(&mut self, event: Option<ButtonEvent>) -> AppResult<()> {
        if self.state().shows_live_feed() && !self.live_paused(Instant::now()) {
            if let Some(frame) = self.camera.preview_frame() {
                self.renderer.blit_live(&frame);
            }
        }

        let Some(event) = event else {
            return Ok(());
        };
        let Some(action) = resolve_action(self.state(), event) else {
            tracing::debug!(state = ?self.state(), ?event, "button ignored");
            return Ok(());
        };
        tracing::debug!(state = ?self.state(), ?event, ?action, "dispatch");

        match action {
            ControllerAction::Capture => self.capture_and_send(),
            ControllerAction::Autofocus => {
                self.camera.autofocus();
                Ok(())
            }
            ControllerAction::ChangePrompt(direction) => {
                self.change_prompt(direction);
                Ok(())
            }
            ControllerAction::EnterBrowse => {
                self.machine.transition(AppEvent::EnterBrowse)?;
                let rescanned = self.store.rescan().map(|images| images.len());
                let start = rescanned.and_then(|_| self.store.browse_start());
                self.show_browsed(start)
            }
            ControllerAction::Navigate(direction) => {
                self.machine.transition(AppEvent::Navigate)?;
                let next = match self.browse_cursor {
                    Some(cursor) => self.store.navigate(cursor, direction),
                    None => self.store.browse_start(),
                };
                self.show_browsed(next)
            }
            ControllerAction::ExitBrowse => {
                self.clear_browse();
                self.machine.transition(AppEvent::ExitBrowse)?;
                Ok(())
            }
            ControllerAction::ConfirmSend => {
                let Some(image) = self.armed.clone() else {
                    self.renderer.show_status(BANNER_FAILED, COLOR_TOKENS.error);
                    return Ok(());
                };
                self.machine.transition(AppEvent::ConfirmSend)?;
                self.clear_browse();
                self.send_and_persist(&image)
            }
            ControllerAction::Dismiss => {
                self.renderer.dismiss_result()?;
                self.machine.transition(AppEvent::Dismiss)?;
                Ok(())
            }
        }
    }

    fn live_paused(&mut self, now: Instant) -> bool {
        match self.live_paused_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.live_paused_until = None;
                false
            }
            None => false,
        }
    }

    fn clear_browse(&mut self) {
        self.browse_cursor = None;
        self.armed = None;
    }

    fn change_prompt(&mut self, direction: Direction) {
        let prompt = self.catalog.advance(direction);
        self.renderer.set_prompt(prompt);
    }

    fn capture_and_send(&mut self) -> AppResult<()> {
        self.renderer.show_status(BANNER_CAPTURING, COLOR_TOKENS.ok);
        match capture_into(&mut self.camera, &mut self.store) {
            Ok(image) => {
                self.machine.transition(AppEvent::CaptureSucceeded)?;
                self.send_and_persist(&image)
            }
            Err(err) => {
                tracing::warn!(%err, "capture failed");
                let banner = match err {
                    CaptureError::Storage { .. } | CaptureError::Missing { .. } => {
                        BANNER_STORAGE_FAILED
                    }
                    CaptureError::Decode { .. } | CaptureError::Sensor { .. } => BANNER_FAILED,
                };
                self.renderer.show_status(banner, COLOR_TOKENS.error);
                self.live_paused_until = Some(Instant::now() + LAYOUT_TOKENS.banner_hold());
                Ok(())
            }
        }
    }

    /// Blocking request, then persist and show the reply. Prompt selection
    /// cannot change until the loop polls again.
    fn send_and_persist(&mut self, image: &ImageRef) -> AppResult<()> {
        let prompt = self.catalog.current();
        self.renderer.show_status(BANNER_SENDING, COLOR_TOKENS.ok);

        let text = match self.analyzer.analyze(image, prompt) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(%err, image = %image, prompt = %prompt, "vision request failed");
                self.renderer
                    .show_status(BANNER_SEND_FAILED, COLOR_TOKENS.error);
                self.machine.transition(AppEvent::SendFailed)?;
                return Ok(());
            }
        };

        if let Err(err) = self.persister.save(image, prompt, &text) {
            tracing::warn!(%err, "result not saved");
            self.renderer
                .show_status(BANNER_SAVE_FAILED, COLOR_TOKENS.error);
        }
        self.renderer.show_result(&text, prompt);
        self.machine.transition(AppEvent::SendSucceeded)?;
        Ok(())
    }

    /// Finish a browse move. A readable image is armed; an unreadable one
    /// keeps the cursor so the next move can step past it.
    fn show_browsed(&mut self, target: Result<(ImageRef, BrowseCursor), StoreError>) -> AppResult<()> {
        let (image, cursor) = match target {
            Ok(target) => target,
            Err(err) => {
                tracing::info!(%err, "nothing to browse");
                let banner = match err {
                    StoreError::Empty => BANNER_NO_IMAGES,
                    StoreError::Unavailable { .. } | StoreError::Io(_) => BANNER_STORAGE_FAILED,
                };
                return self.leave_browse(banner);
            }
        };

        self.browse_cursor = Some(cursor);
        if let Err(err) = self.renderer.load_and_blit(&image) {
            tracing::warn!(%err, cursor = cursor.offset(), "browsed image could not be shown");
            self.armed = None;
            self.machine.transition(AppEvent::ImageUnreadable)?;
            self.renderer.show_status(BANNER_FAILED, COLOR_TOKENS.error);
            return Ok(());
        }

        tracing::info!(image = %image, cursor = cursor.offset(), "image armed");
        self.armed = Some(image);
        self.machine.transition(AppEvent::ImageLoaded)?;
        self.renderer.show_status(BANNER_ARMED, COLOR_TOKENS.neutral);
        Ok(())
    }

    fn leave_browse(&mut self, banner: &str) -> AppResult<()> {
        self.clear_browse();
        self.renderer.show_status(banner, COLOR_TOKENS.error);
        self.machine.transition(AppEvent::BrowseFailed)?;
        Ok(())
    }
}
