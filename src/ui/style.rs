use std::time::Duration;

use crate::geometry::{Color, Point, Rect};

/// Compile-time layout tokens for the 240x240 device screen; not user-overridable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub screen_width: u32,
    pub screen_height: u32,
    pub browse_width: u32,
    pub browse_height: u32,
    pub browse_y_offset: i32,
    pub prompt_bar_height: u32,
    /// Label position inside the prompt bar; `y` is the text's vertical center.
    pub prompt_label_x: i32,
    pub prompt_label_y: i32,
    pub prompt_label_scale: u8,
    pub result_text_x: i32,
    pub result_text_y: i32,
    pub result_text_scale: u8,
    /// Live feed pause after an error banner.
    pub banner_hold_ms: u32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    screen_width: 240,
    screen_height: 240,
    browse_width: 240,
    browse_height: 176,
    browse_y_offset: 32,
    prompt_bar_height: 20,
    prompt_label_x: 10,
    prompt_label_y: 10,
    prompt_label_scale: 2,
    result_text_x: 2,
    result_text_y: 10,
    result_text_scale: 2,
    banner_hold_ms: 500,
};

/// Palette used by the overlay widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTokens {
    pub ok: Color,
    pub error: Color,
    pub neutral: Color,
    pub prompt_label: Color,
    pub panel_background: Color,
    pub panel_text: Color,
}

pub const COLOR_TOKENS: ColorTokens = ColorTokens {
    ok: Color::from_hex(0x00DD00),
    error: Color::from_hex(0xFF0000),
    neutral: Color::WHITE,
    prompt_label: Color::from_hex(0xFF0055),
    panel_background: Color::BLACK,
    panel_text: Color::WHITE,
};

impl StyleTokens {
    pub const fn full_screen(&self) -> Rect {
        Rect::new(0, 0, self.screen_width, self.screen_height)
    }

    /// Strip along the bottom edge holding the prompt label.
    pub const fn prompt_bar(&self) -> Rect {
        let top = (self.screen_height - self.prompt_bar_height) as i32;
        Rect::new(0, top, self.screen_width, self.prompt_bar_height)
    }

    pub const fn prompt_label_origin(&self) -> Point {
        let bar = self.prompt_bar();
        Point::new(bar.x + self.prompt_label_x, bar.y + self.prompt_label_y)
    }

    pub const fn banner_hold(&self) -> Duration {
        Duration::from_millis(self.banner_hold_ms as u64)
    }
}
