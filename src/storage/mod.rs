use std::io;
use std::path::PathBuf;

use thiserror::Error;

mod images;
mod results;

pub use images::{sequence_of, BrowseCursor, ImageRef, ImageStore, IMAGE_EXTENSION};
pub use results::{companion_path, sanitize_prompt_name, ResultPersister, RESULT_EXTENSION};

pub const DEFAULT_STORAGE_DIR: &str = "/sd";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no images on storage")]
    Empty,
    #[error("storage unavailable: {path}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write result file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type PersistResult<T> = std::result::Result<T, PersistError>;
