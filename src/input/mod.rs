use std::collections::VecDeque;
use std::time::{Duration, Instant};

mod console;
mod debounce;
mod keymap;

pub use console::ConsoleInput;
pub use debounce::{ButtonDebouncer, Edge, DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS};
pub use keymap::{resolve_key, KeyCommand};

/// Physical controls on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Shutter,
    Up,
    Down,
    Left,
    Right,
    Select,
    Ok,
}

impl Button {
    pub const ALL: [Self; 7] = [
        Self::Shutter,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Select,
        Self::Ok,
    ];

    /// Logical event for a debounced edge. The shutter reports short and long
    /// presses; every other control reports its press.
    pub const fn event_for(self, edge: Edge) -> Option<ButtonEvent> {
        match (self, edge) {
            (Self::Shutter, Edge::ShortPress) => Some(ButtonEvent::ShutterShort),
            (Self::Shutter, Edge::LongPress) => Some(ButtonEvent::ShutterLong),
            (Self::Shutter, Edge::Fell) => None,
            (_, Edge::ShortPress | Edge::LongPress) => None,
            (Self::Up, Edge::Fell) => Some(ButtonEvent::Up),
            (Self::Down, Edge::Fell) => Some(ButtonEvent::Down),
            (Self::Left, Edge::Fell) => Some(ButtonEvent::Left),
            (Self::Right, Edge::Fell) => Some(ButtonEvent::Right),
            (Self::Select, Edge::Fell) => Some(ButtonEvent::Select),
            (Self::Ok, Edge::Fell) => Some(ButtonEvent::Ok),
        }
    }
}

/// One debounced input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShutterShort,
    ShutterLong,
    Up,
    Down,
    Left,
    Right,
    Select,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPoll {
    Idle,
    Pressed(ButtonEvent),
    /// The source will never produce input again.
    Closed,
}

/// Source of debounced button edges, polled once per loop iteration.
pub trait InputSource {
    fn poll(&mut self) -> InputPoll;
}

/// Button GPIO capability: `true` while a button is held.
pub trait ButtonLevels {
    fn is_pressed(&mut self, button: Button) -> bool;
}

/// Debounces every button from raw levels and queues the resulting events.
#[derive(Debug)]
pub struct PinInput<L> {
    levels: L,
    debouncers: [ButtonDebouncer; 7],
    pending: VecDeque<ButtonEvent>,
}

impl<L: ButtonLevels> PinInput<L> {
    pub fn new(levels: L) -> Self {
        Self::with_timing(levels, DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS)
    }

    pub fn with_timing(levels: L, debounce: Duration, long_press: Duration) -> Self {
        Self {
            levels,
            debouncers: std::array::from_fn(|_| ButtonDebouncer::new(debounce, long_press)),
            pending: VecDeque::new(),
        }
    }

    /// Sample every button at `now`.
    pub fn sample(&mut self, now: Instant) {
        for (button, debouncer) in Button::ALL.into_iter().zip(self.debouncers.iter_mut()) {
            let pressed = self.levels.is_pressed(button);
            if let Some(event) = debouncer
                .update(pressed, now)
                .and_then(|edge| button.event_for(edge))
            {
                tracing::debug!(?button, ?event, "button edge");
                self.pending.push_back(event);
            }
        }
    }

    pub fn levels_mut(&mut self) -> &mut L {
        &mut self.levels
    }
}

impl<L: ButtonLevels> InputSource for PinInput<L> {
    fn poll(&mut self) -> InputPoll {
        if self.pending.is_empty() {
            self.sample(Instant::now());
        }
        self.pending
            .pop_front()
            .map_or(InputPoll::Idle, InputPoll::Pressed)
    }
}
