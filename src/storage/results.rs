use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::prompt::Prompt;

use super::{ImageRef, PersistError, PersistResult};

pub const RESULT_EXTENSION: &str = "txt";

/// Characters dropped from prompt names before they become part of a file name.
const FORBIDDEN_NAME_CHARS: &[char] = &['?', '/', '\\', ':', '*', '"', '<', '>', '|'];
const SEQUENCE_SEPARATORS: &[char] = &['_', '-'];
const DEFAULT_SEPARATOR: char = '_';

/// Prompt name with every character that is illegal or confusing in a file
/// name removed.
pub fn sanitize_prompt_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !FORBIDDEN_NAME_CHARS.contains(ch) && !ch.is_control() && !ch.is_whitespace())
        .collect()
}

/// Companion text file for `image` under `prompt_name`.
///
/// The extension becomes `.txt` and `_<PROMPT>` is inserted in front of the
/// trailing sequence number, keeping the sequence's own separator:
/// `IMG_0001.jpg` + `HAIKU` gives `IMG_HAIKU_0001.txt`. A name without a
/// trailing number gets the prompt appended instead.
pub fn companion_path(image: &Path, prompt_name: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prompt = sanitize_prompt_name(prompt_name);

    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_ascii_digit())
        .last()
        .map(|(index, _)| index);

    let file_stem = match digits_start {
        Some(start) => {
            let (head, sequence) = stem.split_at(start);
            let (base, separator) = match head.chars().last() {
                Some(last) if SEQUENCE_SEPARATORS.contains(&last) => {
                    (&head[..head.len() - last.len_utf8()], last)
                }
                _ => (head, DEFAULT_SEPARATOR),
            };
            if base.is_empty() {
                format!("{prompt}{separator}{sequence}")
            } else {
                format!("{base}_{prompt}{separator}{sequence}")
            }
        }
        None if stem.is_empty() => prompt,
        None => format!("{stem}_{prompt}"),
    };

    image.with_file_name(format!("{file_stem}.{RESULT_EXTENSION}"))
}

/// Appends vision replies next to the image they describe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultPersister;

impl ResultPersister {
    pub fn new() -> Self {
        Self
    }

    /// Append `text` to the companion file of `image` for `prompt`. Repeated
    /// sends with the same prompt accumulate in call order.
    pub fn save(&self, image: &ImageRef, prompt: Prompt, text: &str) -> PersistResult<PathBuf> {
        let path = companion_path(image.path(), prompt.name());
        append_text(&path, text).map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), prompt = %prompt, bytes = text.len(), "result saved");
        Ok(path)
    }
}

fn append_text(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    // Removable media: make sure the bytes reach the card before the next capture.
    file.sync_all()
}
