use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, Rgb, RgbImage};

use super::{CameraBackend, CaptureError, CaptureResult, Frame};
use crate::geometry::Point;
use crate::ui::LAYOUT_TOKENS;

const STILL_WIDTH: u32 = 320;
const STILL_HEIGHT: u32 = 240;

/// Host stand-in for the camera sensor.
///
/// Stills are copied from a configured JPEG, or rendered as a test pattern
/// when no source is set. Preview frames are a scrolling gradient.
#[derive(Debug, Clone, Default)]
pub struct StillCamera {
    source: Option<PathBuf>,
    tick: u32,
}

impl StillCamera {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source, tick: 0 }
    }

    fn render_pattern(&self, width: u32, height: u32) -> RgbImage {
        let shift = self.tick;
        RgbImage::from_fn(width, height, |x, y| {
            let r = ((x + shift) * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            Rgb([r, g, 128])
        })
    }
}

impl CameraBackend for StillCamera {
    fn preview_frame(&mut self) -> Option<Frame> {
        self.tick = self.tick.wrapping_add(4) % LAYOUT_TOKENS.screen_width;
        let pixels = self.render_pattern(LAYOUT_TOKENS.screen_width, LAYOUT_TOKENS.screen_height);
        Some(Frame::new(pixels, Point::new(0, 0)))
    }

    fn capture_jpeg(&mut self, target: &Path) -> CaptureResult<()> {
        match &self.source {
            Some(source) => copy_still(source, target),
            None => self
                .render_pattern(STILL_WIDTH, STILL_HEIGHT)
                .save_with_format(target, image::ImageFormat::Jpeg)
                .map_err(|err| match err {
                    ImageError::IoError(source) => CaptureError::Storage {
                        path: target.to_path_buf(),
                        source,
                    },
                    other => CaptureError::Sensor {
                        message: other.to_string(),
                    },
                }),
        }
    }

    fn autofocus(&mut self) {
        tracing::info!("autofocus requested");
    }
}

fn copy_still(source: &Path, target: &Path) -> CaptureResult<()> {
    if !source.is_file() {
        return Err(CaptureError::Sensor {
            message: format!("camera source not found: {}", source.display()),
        });
    }
    std::fs::copy(source, target)
        .map(|_| ())
        .map_err(|source: io::Error| CaptureError::Storage {
            path: target.to_path_buf(),
            source,
        })
}
