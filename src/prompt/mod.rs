//! Ordered, cyclic catalog of named prompts and the selection cursor.

/// Prompt names in catalog order. Each name resolves to its instruction text
/// through the `PROMPT_<NAME>` setting.
pub const PROMPT_NAMES: &[&str] = &[
    "ALIEN",
    "ALT_TEXT",
    "CABLE",
    "HAIKU",
    "HOW",
    "HOW_BIG",
    "HOW_BRIGHT",
    "HOW_COLD",
    "HOW_DARK",
    "HOW_DEEP",
    "HOW_FAST",
    "HOW_HEAVY",
    "HOW_HOT",
    "HOW_LONG",
    "HOW_LOUD",
    "HOW_MANY",
    "HOW_MUCH",
    "HOW_OLD",
    "HOW_TALL",
    "HOW_WIDE",
    "MYSTERY",
    "POEM",
    "RECIPE",
    "RIDDLE",
    "SONNET",
    "STORY",
    "TANKA",
    "TECHNICAL",
    "THREE_WORDS",
    "WHAT",
    "WHEN",
    "WHERE",
    "WHO",
    "WHY",
    "YE_OLDE",
];

const ALT_TEXT: &str = "ALT_TEXT";

/// A named prompt and its position in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    index: usize,
    name: &'static str,
}

impl Prompt {
    pub const fn index(self) -> usize {
        self.index
    }

    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Settings key holding this prompt's instruction text.
    pub fn setting_key(self) -> String {
        format!("PROMPT_{}", self.name)
    }

    /// Alt-text replies use `*` as a line separator.
    pub fn is_alt_text(self) -> bool {
        self.name == ALT_TEXT
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// One step through a cyclic list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const fn step(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptCatalog {
    names: &'static [&'static str],
    selected: usize,
}

impl PromptCatalog {
    pub fn new() -> Self {
        Self::with_names(PROMPT_NAMES)
    }

    /// Build a catalog over `names`; an empty list falls back to the built-in catalog.
    pub fn with_names(names: &'static [&'static str]) -> Self {
        let names = if names.is_empty() { PROMPT_NAMES } else { names };
        Self { names, selected: 0 }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn current(&self) -> Prompt {
        Prompt {
            index: self.selected,
            name: self.names[self.selected],
        }
    }

    pub fn advance(&mut self, direction: Direction) -> Prompt {
        let len = self.names.len() as i64;
        self.selected = (self.selected as i64 + direction.step()).rem_euclid(len) as usize;
        let prompt = self.current();
        tracing::debug!(prompt = %prompt, index = prompt.index, "prompt selected");
        prompt
    }

    pub fn iter(&self) -> impl Iterator<Item = Prompt> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| Prompt { index, name })
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::new()
    }
}
