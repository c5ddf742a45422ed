use std::io;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbImage;
use thiserror::Error;

use crate::geometry::Point;
use crate::storage::{ImageRef, ImageStore, StoreError};

mod still;

pub use still::StillCamera;

/// Decoded pixels plus the position they are blitted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: RgbImage,
    origin: Point,
}

impl Frame {
    pub fn new(pixels: RgbImage, origin: Point) -> Self {
        Self { pixels, origin }
    }

    /// Decode a stored image and scale it to fit `width`x`height`.
    pub fn decode_file(
        path: &Path,
        width: u32,
        height: u32,
        origin: Point,
    ) -> Result<Self, image::ImageError> {
        let decoded = image::open(path)?;
        let scaled = decoded.resize(width, height, FilterType::Triangle);
        Ok(Self::new(scaled.to_rgb8(), origin))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("captured image could not be decoded: {path}")]
    Decode { path: PathBuf, message: String },
    #[error("storage unavailable for capture: {path}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("capture produced no file: {path}")]
    Missing { path: PathBuf },
    #[error("camera sensor failure: {message}")]
    Sensor { message: String },
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Camera sensor driver capability.
pub trait CameraBackend {
    /// Latest live-preview frame, or `None` when no new frame is ready.
    fn preview_frame(&mut self) -> Option<Frame>;
    /// Write a still JPEG to `target`.
    fn capture_jpeg(&mut self, target: &Path) -> CaptureResult<()>;
    fn autofocus(&mut self);
}

/// Capture a still into the next free slot of `store` and rescan it.
///
/// The target is created empty before the camera writes to it, so an existing
/// file is never overwritten and cleanup only ever removes this capture's file.
pub fn capture_into<C: CameraBackend + ?Sized>(
    camera: &mut C,
    store: &mut ImageStore,
) -> CaptureResult<ImageRef> {
    let target = store.next_capture_path();
    reserve_capture_path(&target)?;
    tracing::info!(path = %target.display(), "capturing still");

    if let Err(err) = camera.capture_jpeg(&target) {
        cleanup_partial_capture(&target, "capture command failure");
        return Err(err);
    }

    if let Err(err) = image::image_dimensions(&target) {
        cleanup_partial_capture(&target, "capture decode failure");
        return Err(CaptureError::Decode {
            path: target,
            message: err.to_string(),
        });
    }

    let root = store.root().to_path_buf();
    store.rescan().map_err(|err| match err {
        StoreError::Unavailable { path, source } => CaptureError::Storage { path, source },
        StoreError::Io(source) => CaptureError::Storage { path: root, source },
        StoreError::Empty => CaptureError::Missing {
            path: target.clone(),
        },
    })?;

    store
        .images()
        .iter()
        .find(|image| image.path() == target)
        .cloned()
        .ok_or(CaptureError::Missing { path: target })
}

/// Create `path` exclusively; fails if anything already lives there.
fn reserve_capture_path(path: &Path) -> CaptureResult<()> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| CaptureError::Storage {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CleanupOutcome {
    Removed,
    NotFound,
    Failed,
}

fn cleanup_partial_capture(path: &Path, stage: &str) -> CleanupOutcome {
    cleanup_partial_capture_with(path, stage, |path| std::fs::remove_file(path))
}

fn cleanup_partial_capture_with<F>(path: &Path, stage: &str, remove_file: F) -> CleanupOutcome
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    match remove_file(path) {
        Ok(()) => CleanupOutcome::Removed,
        Err(err) if err.kind() == io::ErrorKind::NotFound => CleanupOutcome::NotFound,
        Err(err) => {
            tracing::warn!(
                stage = stage,
                path = %path.display(),
                ?err,
                "failed to remove partial capture file"
            );
            CleanupOutcome::Failed
        }
    }
}
