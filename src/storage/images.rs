use std::fs;
use std::path::{Path, PathBuf};

use crate::prompt::Direction;

use super::{StoreError, StoreResult};

pub const IMAGE_EXTENSION: &str = "jpg";
const CAPTURE_PREFIX: &str = "IMG_";

/// A captured JPEG on storage, ordered by the number embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    path: PathBuf,
    sequence: u64,
}

impl ImageRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sequence = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(sequence_of)
            .unwrap_or_default();
        Self { path, sequence }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// All digits of `file_name` read as one number; names without digits sort first.
pub fn sequence_of(file_name: &str) -> u64 {
    let digits: String = file_name.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Negative offset into the image list. `-1` is the newest capture and `0`
/// the oldest; values stay in `(-len, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseCursor(i64);

impl BrowseCursor {
    pub const LATEST: Self = Self(-1);

    pub const fn offset(self) -> i64 {
        self.0
    }

    fn wrapped(offset: i64, len: usize) -> Self {
        let len = len as i64;
        match offset.rem_euclid(len) {
            0 => Self(0),
            rest => Self(rest - len),
        }
    }

    fn step(self, direction: Direction, len: usize) -> Self {
        Self::wrapped(self.0 + direction.step(), len)
    }

    fn index(self, len: usize) -> usize {
        self.0.rem_euclid(len as i64) as usize
    }
}

impl Default for BrowseCursor {
    fn default() -> Self {
        Self::LATEST
    }
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    images: Vec<ImageRef>,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: Vec::new(),
        }
    }

    /// Open the store and take an initial listing.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let mut store = Self::new(root);
        store.rescan()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Rebuild the image list from storage, sorted by embedded sequence.
    pub fn rescan(&mut self) -> StoreResult<&[ImageRef]> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut images = Vec::new();
        for entry in entries {
            let path = entry.map_err(StoreError::Io)?.path();
            if path.is_file() && has_image_extension(&path) {
                images.push(ImageRef::from_path(path));
            }
        }
        images.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.path.cmp(&b.path))
        });

        tracing::debug!(root = %self.root.display(), count = images.len(), "image store rescanned");
        self.images = images;
        Ok(&self.images)
    }

    pub fn latest(&self) -> StoreResult<&ImageRef> {
        self.images.last().ok_or(StoreError::Empty)
    }

    /// Cursor and image for the start of a browse session (the newest capture).
    pub fn browse_start(&self) -> StoreResult<(ImageRef, BrowseCursor)> {
        self.resolve(BrowseCursor::LATEST)
    }

    pub fn navigate(
        &self,
        cursor: BrowseCursor,
        direction: Direction,
    ) -> StoreResult<(ImageRef, BrowseCursor)> {
        if self.images.is_empty() {
            return Err(StoreError::Empty);
        }
        self.resolve(cursor.step(direction, self.images.len()))
    }

    fn resolve(&self, cursor: BrowseCursor) -> StoreResult<(ImageRef, BrowseCursor)> {
        let len = self.images.len();
        if len == 0 {
            return Err(StoreError::Empty);
        }
        let cursor = BrowseCursor::wrapped(cursor.offset(), len);
        Ok((self.images[cursor.index(len)].clone(), cursor))
    }

    /// Path for the next capture: one past the highest sequence on storage,
    /// or the first free slot when that sequence cannot grow. Never names a
    /// file that already exists.
    pub fn next_capture_path(&self) -> PathBuf {
        let start = self
            .images
            .iter()
            .map(ImageRef::sequence)
            .max()
            .map_or(Some(1), |last| last.checked_add(1))
            .unwrap_or(1);
        (start..=u64::MAX)
            .chain(1..start)
            .map(|sequence| self.capture_path(sequence))
            .find(|path| !path.exists())
            .unwrap_or_else(|| self.capture_path(start))
    }

    fn capture_path(&self, sequence: u64) -> PathBuf {
        self.root
            .join(format!("{CAPTURE_PREFIX}{sequence:04}.{IMAGE_EXTENSION}"))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
}
