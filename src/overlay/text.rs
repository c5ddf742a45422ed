use crate::prompt::Prompt;

/// Marker the alt-text prompt uses between lines of its reply.
pub const ALT_TEXT_LINE_MARKER: char = '*';

/// Greedy word wrap to `columns` characters. Existing line breaks are kept
/// and words longer than a line are split.
pub fn wrap_to_columns(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut word = word;
            loop {
                let word_len = word.chars().count();
                let needed = if line_len == 0 {
                    word_len
                } else {
                    line_len + 1 + word_len
                };
                if needed <= columns {
                    if line_len > 0 {
                        line.push(' ');
                        line_len += 1;
                    }
                    line.push_str(word);
                    line_len += word_len;
                    break;
                }
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                    continue;
                }
                let split = word
                    .char_indices()
                    .nth(columns)
                    .map_or(word.len(), |(index, _)| index);
                lines.push(word[..split].to_string());
                word = &word[split..];
                if word.is_empty() {
                    break;
                }
            }
        }

        lines.push(line);
    }

    lines
}

/// Text as it appears on the result panel for `prompt`.
pub fn layout_result_text(text: &str, columns: usize, prompt: Prompt) -> String {
    let wrapped = wrap_to_columns(text, columns).join("\n");
    if prompt.is_alt_text() {
        wrapped.replace(ALT_TEXT_LINE_MARKER, "\n")
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Direction, PromptCatalog};

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap_to_columns("The quick brown fox jumps over the lazy dog", 20),
            vec!["The quick brown fox", "jumps over the lazy", "dog"]
        );
    }

    #[test]
    fn wrap_keeps_existing_line_breaks() {
        assert_eq!(wrap_to_columns("one\n\ntwo", 20), vec!["one", "", "two"]);
    }

    #[test]
    fn wrap_splits_words_longer_than_a_line() {
        assert_eq!(
            wrap_to_columns("ab supercalifragilistic", 5),
            vec!["ab", "super", "calif", "ragil", "istic"]
        );
    }

    #[test]
    fn alt_text_marker_becomes_line_break() {
        let mut catalog = PromptCatalog::new();
        let alt_text = catalog.advance(Direction::Forward);
        assert_eq!(
            layout_result_text("Line one*Line two", 20, alt_text),
            "Line one\nLine two"
        );
    }

    #[test]
    fn other_prompts_keep_the_marker() {
        let catalog = PromptCatalog::new();
        assert_eq!(
            layout_result_text("5*3 = 15", 20, catalog.current()),
            "5*3 = 15"
        );
    }
}
