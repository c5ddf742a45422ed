use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(20);
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(1_000);

/// Debounced transition reported by [`ButtonDebouncer::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Stable press.
    Fell,
    /// Stable release before the long-press threshold.
    ShortPress,
    /// Still held once the long-press threshold passed; reported once per press.
    LongPress,
}

/// Turns raw button levels into debounced edges.
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    debounce: Duration,
    long_press: Duration,
    stable: bool,
    candidate: bool,
    candidate_since: Option<Instant>,
    pressed_at: Option<Instant>,
    long_reported: bool,
}

impl ButtonDebouncer {
    pub fn new(debounce: Duration, long_press: Duration) -> Self {
        Self {
            debounce,
            long_press,
            stable: false,
            candidate: false,
            candidate_since: None,
            pressed_at: None,
            long_reported: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    pub fn update(&mut self, pressed: bool, now: Instant) -> Option<Edge> {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.candidate_since = Some(now);
        }

        if self.candidate != self.stable {
            let since = self.candidate_since.unwrap_or(now);
            if now.saturating_duration_since(since) < self.debounce {
                return None;
            }
            self.stable = self.candidate;
            return if self.stable {
                self.pressed_at = Some(now);
                self.long_reported = false;
                Some(Edge::Fell)
            } else {
                self.pressed_at = None;
                (!self.long_reported).then_some(Edge::ShortPress)
            };
        }

        match self.pressed_at {
            Some(at)
                if self.stable
                    && !self.long_reported
                    && now.saturating_duration_since(at) >= self.long_press =>
            {
                self.long_reported = true;
                Some(Edge::LongPress)
            }
            _ => None,
        }
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS)
    }
}
