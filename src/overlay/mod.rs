//! Transient widgets layered over the camera feed or a browsed image.
//!
//! The renderer is the only owner of the widget stack. Result panels are
//! pushed and popped as one [`Panel`] so the backdrop and its label can never
//! drift apart.

use std::path::PathBuf;

use thiserror::Error;

use crate::capture::Frame;
use crate::geometry::{Color, Point, Rect};
use crate::prompt::Prompt;
use crate::storage::ImageRef;
use crate::ui::{COLOR_TOKENS, LAYOUT_TOKENS};

mod console;
mod text;

pub use console::ConsoleScreen;
pub use text::{layout_result_text, wrap_to_columns, ALT_TEXT_LINE_MARKER};

pub const DEFAULT_WRAP_COLUMNS: usize = 20;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("overlay stack underflow: need {needed} widgets, have {depth}")]
    StackUnderflow { needed: usize, depth: usize },
    #[error("failed to decode stored image {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

pub type OverlayResult<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backdrop {
    pub rect: Rect,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLabel {
    pub text: String,
    pub color: Color,
    pub origin: Point,
    pub scale: u8,
}

/// Short banner drawn over the banner region; a new banner replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub text: String,
    pub color: Color,
}

/// Opaque backdrop and the text drawn on it, stacked as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    backdrop: Backdrop,
    label: TextLabel,
}

impl Panel {
    /// Widgets a panel contributes to the stack depth.
    pub const WIDGETS: usize = 2;

    pub fn full_screen(text: String) -> Self {
        Self {
            backdrop: Backdrop {
                rect: LAYOUT_TOKENS.full_screen(),
                color: COLOR_TOKENS.panel_background,
            },
            label: TextLabel {
                text,
                color: COLOR_TOKENS.panel_text,
                origin: Point::new(LAYOUT_TOKENS.result_text_x, LAYOUT_TOKENS.result_text_y),
                scale: LAYOUT_TOKENS.result_text_scale,
            },
        }
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn label(&self) -> &TextLabel {
        &self.label
    }
}

/// Low-level display compositing capability.
pub trait Screen {
    /// Draw camera or stored-image pixels into the frame buffer.
    fn blit(&mut self, frame: &Frame);
    fn draw_banner(&mut self, banner: &StatusBanner);
    fn draw_prompt_bar(&mut self, bar: &Backdrop, label: &TextLabel);
    /// Redraw the panel stack, bottom first. An empty slice clears it.
    fn compose(&mut self, panels: &[Panel]);
    fn refresh(&mut self);
}

#[derive(Debug)]
pub struct OverlayRenderer<S> {
    screen: S,
    panels: Vec<Panel>,
    banner: Option<StatusBanner>,
    prompt_bar: Backdrop,
    prompt_label: TextLabel,
    wrap_columns: usize,
}

impl<S: Screen> OverlayRenderer<S> {
    pub fn new(screen: S, wrap_columns: usize, prompt: Prompt) -> Self {
        let mut renderer = Self {
            screen,
            panels: Vec::new(),
            banner: None,
            prompt_bar: Backdrop {
                rect: LAYOUT_TOKENS.prompt_bar(),
                color: COLOR_TOKENS.panel_background,
            },
            prompt_label: TextLabel {
                text: prompt.name().to_string(),
                color: COLOR_TOKENS.prompt_label,
                origin: LAYOUT_TOKENS.prompt_label_origin(),
                scale: LAYOUT_TOKENS.prompt_label_scale,
            },
            wrap_columns: wrap_columns.max(1),
        };
        renderer.draw_prompt_bar();
        renderer.screen.refresh();
        renderer
    }

    /// Number of primitive widgets on the stack.
    pub fn depth(&self) -> usize {
        self.panels.len() * Panel::WIDGETS
    }

    pub fn has_result(&self) -> bool {
        !self.panels.is_empty()
    }

    pub fn banner(&self) -> Option<&StatusBanner> {
        self.banner.as_ref()
    }

    pub fn prompt_label(&self) -> &TextLabel {
        &self.prompt_label
    }

    pub fn top_panel(&self) -> Option<&Panel> {
        self.panels.last()
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn show_status(&mut self, text: impl Into<String>, color: Color) {
        let banner = StatusBanner {
            text: text.into(),
            color,
        };
        tracing::debug!(text = %banner.text, color = %banner.color, "status banner");
        self.screen.draw_banner(&banner);
        self.screen.refresh();
        self.banner = Some(banner);
    }

    pub fn set_prompt(&mut self, prompt: Prompt) {
        self.prompt_label.text = prompt.name().to_string();
        self.draw_prompt_bar();
        self.screen.refresh();
    }

    /// Wrap `text`, lay it over a full-screen backdrop and push the pair.
    pub fn show_result(&mut self, text: &str, prompt: Prompt) -> &Panel {
        let laid_out = layout_result_text(text, self.wrap_columns, prompt);
        self.panels.push(Panel::full_screen(laid_out));
        self.screen.compose(&self.panels);
        self.screen.refresh();
        tracing::debug!(depth = self.depth(), "result panel pushed");
        &self.panels[self.panels.len() - 1]
    }

    /// Pop the top result panel and redraw.
    pub fn dismiss_result(&mut self) -> OverlayResult<Panel> {
        let depth = self.depth();
        let panel = self.panels.pop().ok_or(OverlayError::StackUnderflow {
            needed: Panel::WIDGETS,
            depth,
        })?;
        self.screen.compose(&self.panels);
        self.screen.refresh();
        tracing::debug!(depth = self.depth(), "result panel dismissed");
        Ok(panel)
    }

    pub fn blit_live(&mut self, frame: &Frame) {
        self.screen.blit(frame);
        self.screen.refresh();
    }

    /// Decode a stored image into the browse bitmap and draw it.
    pub fn load_and_blit(&mut self, image: &ImageRef) -> OverlayResult<()> {
        let frame = Frame::decode_file(
            image.path(),
            LAYOUT_TOKENS.browse_width,
            LAYOUT_TOKENS.browse_height,
            Point::new(0, LAYOUT_TOKENS.browse_y_offset),
        )
        .map_err(|err| OverlayError::Decode {
            path: image.path().to_path_buf(),
            message: err.to_string(),
        })?;
        self.screen.blit(&frame);
        self.screen.refresh();
        Ok(())
    }

    fn draw_prompt_bar(&mut self) {
        self.screen
            .draw_prompt_bar(&self.prompt_bar, &self.prompt_label);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::prompt::{Direction, PromptCatalog};

    /// Screen double that records every draw call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingScreen {
        pub(crate) blits: Vec<Point>,
        pub(crate) banners: Vec<StatusBanner>,
        pub(crate) prompt_labels: Vec<String>,
        pub(crate) composed: Vec<Vec<String>>,
        pub(crate) refreshes: usize,
    }

    impl Screen for RecordingScreen {
        fn blit(&mut self, frame: &Frame) {
            self.blits.push(frame.origin());
        }

        fn draw_banner(&mut self, banner: &StatusBanner) {
            self.banners.push(banner.clone());
        }

        fn draw_prompt_bar(&mut self, _bar: &Backdrop, label: &TextLabel) {
            self.prompt_labels.push(label.text.clone());
        }

        fn compose(&mut self, panels: &[Panel]) {
            self.composed
                .push(panels.iter().map(|panel| panel.label().text.clone()).collect());
        }

        fn refresh(&mut self) {
            self.refreshes += 1;
        }
    }

    fn renderer() -> OverlayRenderer<RecordingScreen> {
        OverlayRenderer::new(
            RecordingScreen::default(),
            DEFAULT_WRAP_COLUMNS,
            PromptCatalog::new().current(),
        )
    }

    #[test]
    fn new_renderer_draws_prompt_label() {
        let renderer = renderer();
        assert_eq!(renderer.screen().prompt_labels, vec!["ALIEN"]);
        assert_eq!(renderer.depth(), 0);
    }

    #[test]
    fn show_then_dismiss_restores_depth() {
        let mut renderer = renderer();
        let prompt = PromptCatalog::new().current();
        let before = renderer.depth();

        renderer.show_result("A cat.", prompt);
        assert_eq!(renderer.depth(), before + Panel::WIDGETS);
        let panel = renderer.dismiss_result().expect("panel should be on the stack");

        assert_eq!(renderer.depth(), before);
        assert_eq!(panel.label().text, "A cat.");
        assert_eq!(panel.backdrop().rect, LAYOUT_TOKENS.full_screen());
        assert_eq!(
            renderer.screen().composed,
            vec![vec!["A cat.".to_string()], Vec::<String>::new()]
        );
    }

    #[test]
    fn dismiss_on_empty_stack_underflows() {
        let mut renderer = renderer();
        let err = renderer.dismiss_result().expect_err("empty stack should fail");
        assert!(matches!(
            err,
            OverlayError::StackUnderflow {
                needed: 2,
                depth: 0
            }
        ));
    }

    #[test]
    fn banners_replace_each_other() {
        let mut renderer = renderer();
        renderer.show_status("~>", COLOR_TOKENS.ok);
        renderer.show_status("SD :(", COLOR_TOKENS.error);

        let banner = renderer.banner().expect("banner should be set");
        assert_eq!(banner.text, "SD :(");
        assert_eq!(banner.color, COLOR_TOKENS.error);
        assert_eq!(renderer.depth(), 0);
    }

    #[test]
    fn show_result_wraps_and_applies_alt_text_marker() {
        let mut renderer = renderer();
        let mut catalog = PromptCatalog::new();
        let alt_text = catalog.advance(Direction::Forward);

        let panel = renderer.show_result("Line one*Line two", alt_text);
        assert_eq!(panel.label().text, "Line one\nLine two");
        assert_eq!(panel.label().color, COLOR_TOKENS.panel_text);
    }

    #[test]
    fn set_prompt_redraws_label() {
        let mut renderer = renderer();
        let mut catalog = PromptCatalog::new();
        renderer.set_prompt(catalog.advance(Direction::Backward));
        assert_eq!(renderer.prompt_label().text, "YE_OLDE");
        assert_eq!(renderer.screen().prompt_labels, vec!["ALIEN", "YE_OLDE"]);
    }

    #[test]
    fn load_and_blit_draws_below_offset() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("IMG_0001.jpg");
        image::RgbImage::from_pixel(320, 240, image::Rgb([200, 10, 10]))
            .save(&path)
            .expect("jpeg should save");
        let mut renderer = renderer();

        renderer
            .load_and_blit(&ImageRef::from_path(&path))
            .expect("stored image should decode");
        assert_eq!(
            renderer.screen().blits,
            vec![Point::new(0, LAYOUT_TOKENS.browse_y_offset)]
        );
    }

    #[test]
    fn load_and_blit_reports_corrupt_image() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(&path, b"truncated").expect("file should be written");
        let mut renderer = renderer();

        let err = renderer
            .load_and_blit(&ImageRef::from_path(&path))
            .expect_err("corrupt image should fail");
        assert!(matches!(err, OverlayError::Decode { .. }));
        assert!(renderer.screen().blits.is_empty());
    }
}
