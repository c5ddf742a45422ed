pub mod style;

pub use style::{ColorTokens, StyleTokens, COLOR_TOKENS, LAYOUT_TOKENS};
