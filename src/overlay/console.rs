use std::io::{self, Write};

use super::{Backdrop, Panel, Screen, StatusBanner, TextLabel};
use crate::capture::Frame;

/// Host stand-in for the device display that prints widgets as text.
#[derive(Debug)]
pub struct ConsoleScreen<W = io::Stdout> {
    out: W,
    frames: u64,
}

impl ConsoleScreen {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!(?err, "console screen write failed");
        }
    }
}

impl<W: Write> Screen for ConsoleScreen<W> {
    fn blit(&mut self, frame: &Frame) {
        self.frames += 1;
        tracing::trace!(
            frame = self.frames,
            width = frame.width(),
            height = frame.height(),
            y = frame.origin().y,
            "frame blitted"
        );
    }

    fn draw_banner(&mut self, banner: &StatusBanner) {
        self.emit(&format!("[{}] {}", banner.color, banner.text));
    }

    fn draw_prompt_bar(&mut self, _bar: &Backdrop, label: &TextLabel) {
        self.emit(&format!("prompt: {}", label.text));
    }

    fn compose(&mut self, panels: &[Panel]) {
        let Some(top) = panels.last() else {
            self.emit("------------ (panel closed)");
            return;
        };
        self.emit("------------");
        for line in top.label().text.lines() {
            self.emit(&format!("| {line}"));
        }
        self.emit("------------");
    }

    fn refresh(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::warn!(?err, "console screen flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;

    #[test]
    fn banner_and_panel_render_as_text() {
        let mut screen = ConsoleScreen::new(Vec::new());
        screen.draw_banner(&StatusBanner {
            text: "send..".to_string(),
            color: Color::from_hex(0x00DD00),
        });
        screen.compose(&[Panel::full_screen("Line one\nLine two".to_string())]);
        screen.compose(&[]);

        let printed = String::from_utf8(screen.into_inner()).expect("output is utf-8");
        assert_eq!(
            printed,
            "[#00DD00] send..\n------------\n| Line one\n| Line two\n------------\n------------ (panel closed)\n"
        );
    }

    #[test]
    fn blits_are_counted_not_printed() {
        let mut screen = ConsoleScreen::new(Vec::new());
        let frame = Frame::new(image::RgbImage::new(2, 2), crate::geometry::Point::new(0, 0));
        screen.blit(&frame);
        screen.blit(&frame);
        assert_eq!(screen.frames(), 2);
        assert!(screen.into_inner().is_empty());
    }
}
