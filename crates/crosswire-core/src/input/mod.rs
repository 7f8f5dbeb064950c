//! Input source state.
//!
//! One [`InputState`] per top-level browsing context tracks every input
//! source the client has used: pressed keys and the modifier mask,
//! pointer position and button bitmap, and per-button click timing used
//! for click-count computation.

pub mod dispatch;
pub mod keys;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crosswire_bidi::input::PointerType;
use tokio::sync::Mutex;

use crate::clock::Clock;
use keys::modifier;

/// Click-count window in milliseconds.
const CLICK_INTERVAL_MS: u64 = 500;

/// Click-count radius in pixels.
const CLICK_RADIUS_PX: f64 = 2.0;

/// Key source state.
#[derive(Debug, Default)]
pub struct KeySource {
    /// Currently pressed key values.
    pub pressed: HashSet<String>,
    /// Alt pressed.
    pub alt: bool,
    /// Control pressed.
    pub ctrl: bool,
    /// Meta pressed.
    pub meta: bool,
    /// Shift pressed.
    pub shift: bool,
}

impl KeySource {
    /// Current modifier bitmask (alt=1, ctrl=2, meta=4, shift=8).
    pub fn modifiers(&self) -> u32 {
        let mut mask = 0;
        if self.alt {
            mask |= modifier::ALT;
        }
        if self.ctrl {
            mask |= modifier::CTRL;
        }
        if self.meta {
            mask |= modifier::META;
        }
        if self.shift {
            mask |= modifier::SHIFT;
        }
        mask
    }
}

/// Recorded press used for click counting.
#[derive(Debug, Clone)]
pub struct ClickContext {
    /// Press x.
    pub x: f64,
    /// Press y.
    pub y: f64,
    /// Press time in clock milliseconds.
    pub time_ms: u64,
    /// Click count at the press.
    pub count: u32,
}

/// Pointer source state.
#[derive(Debug)]
pub struct PointerSource {
    /// Pointer kind.
    pub pointer_type: PointerType,
    /// Pressed W3C button indices.
    pub pressed: HashSet<u32>,
    /// Pointer x.
    pub x: f64,
    /// Pointer y.
    pub y: f64,
    /// Last press per button, for click counting.
    pub click_contexts: HashMap<u32, ClickContext>,
}

impl PointerSource {
    fn new(pointer_type: PointerType) -> Self {
        Self {
            pointer_type,
            pressed: HashSet::new(),
            x: 0.0,
            y: 0.0,
            click_contexts: HashMap::new(),
        }
    }

    /// CDP `buttons` bitmap of the currently pressed buttons
    /// (left=1, right=2, middle=4, back=8, forward=16).
    pub fn buttons_mask(&self) -> u32 {
        self.pressed.iter().map(|b| button_bit(*b)).sum()
    }

    /// Register a press and compute its click count.
    ///
    /// A press within 500 ms and 2 px of the previous press of the same
    /// button increments the count; a count that would exceed 2 resets
    /// to 1 (CDP has no triple-click).
    pub fn register_press(&mut self, button: u32, now_ms: u64) -> u32 {
        let count = match self.click_contexts.get(&button) {
            Some(prev)
                if now_ms.saturating_sub(prev.time_ms) <= CLICK_INTERVAL_MS
                    && in_click_radius(prev, self.x, self.y) =>
            {
                if prev.count >= 2 {
                    1
                } else {
                    prev.count + 1
                }
            }
            _ => 1,
        };
        self.click_contexts.insert(
            button,
            ClickContext {
                x: self.x,
                y: self.y,
                time_ms: now_ms,
                count,
            },
        );
        self.pressed.insert(button);
        count
    }

    /// Click count to report on release.
    pub fn release_count(&mut self, button: u32) -> u32 {
        self.pressed.remove(&button);
        self.click_contexts.get(&button).map_or(1, |c| c.count)
    }
}

fn in_click_radius(prev: &ClickContext, x: f64, y: f64) -> bool {
    let dx = prev.x - x;
    let dy = prev.y - y;
    dx * dx + dy * dy <= CLICK_RADIUS_PX * CLICK_RADIUS_PX
}

/// CDP button bit for a W3C button index (0 is 1, 1 is 4, 2 is 2, 3 is 8, 4 is 16).
pub fn button_bit(button: u32) -> u32 {
    match button {
        0 => 1,
        1 => 4,
        2 => 2,
        3 => 8,
        4 => 16,
        _ => 0,
    }
}

/// CDP button name for a W3C button index.
pub fn button_name(button: u32) -> &'static str {
    match button {
        0 => "left",
        1 => "middle",
        2 => "right",
        3 => "back",
        4 => "forward",
        _ => "none",
    }
}

/// One input source.
#[derive(Debug)]
pub enum InputSource {
    /// Null source; only pauses.
    Null,
    /// Key source.
    Key(KeySource),
    /// Pointer source.
    Pointer(PointerSource),
    /// Wheel source.
    Wheel,
}

/// An action recorded for `releaseActions` undo.
#[derive(Debug, Clone)]
pub enum CancelAction {
    /// Release a key.
    KeyUp {
        /// Source id.
        source: String,
        /// Key value.
        value: String,
    },
    /// Release a pointer button.
    PointerUp {
        /// Source id.
        source: String,
        /// W3C button index.
        button: u32,
    },
}

/// Input state of one top-level browsing context.
#[derive(Debug, Default)]
pub struct InputState {
    /// Sources keyed by client-assigned id.
    pub sources: HashMap<String, InputSource>,
    /// Reverse list replayed by `releaseActions`.
    pub cancel_list: Vec<CancelAction>,
}

impl InputState {
    /// Get or create a key source.
    pub fn key_source(&mut self, id: &str) -> &mut KeySource {
        let entry = self
            .sources
            .entry(id.to_string())
            .or_insert_with(|| InputSource::Key(KeySource::default()));
        match entry {
            InputSource::Key(source) => source,
            other => {
                *other = InputSource::Key(KeySource::default());
                match other {
                    InputSource::Key(source) => source,
                    _ => unreachable!(),
                }
            }
        }
    }

    /// Get or create a pointer source.
    pub fn pointer_source(&mut self, id: &str, pointer_type: PointerType) -> &mut PointerSource {
        let entry = self
            .sources
            .entry(id.to_string())
            .or_insert_with(|| InputSource::Pointer(PointerSource::new(pointer_type)));
        match entry {
            InputSource::Pointer(source) => source,
            other => {
                *other = InputSource::Pointer(PointerSource::new(pointer_type));
                match other {
                    InputSource::Pointer(source) => source,
                    _ => unreachable!(),
                }
            }
        }
    }

    /// The combined modifier mask of every key source.
    pub fn modifiers(&self) -> u32 {
        self.sources
            .values()
            .map(|source| match source {
                InputSource::Key(key) => key.modifiers(),
                _ => 0,
            })
            .fold(0, |acc, mask| acc | mask)
    }
}

/// Per-context input states.
#[derive(Debug)]
pub struct InputStateManager {
    states: Mutex<HashMap<String, Arc<Mutex<InputState>>>>,
    clock: Arc<dyn Clock>,
}

impl InputStateManager {
    /// New manager over the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(HashMap::new()),
            clock,
        })
    }

    /// The clock used for click timing.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Input state of a top-level context, created on first use.
    pub async fn state_for(&self, top_level_context: &str) -> Arc<Mutex<InputState>> {
        let mut states = self.states.lock().await;
        Arc::clone(
            states
                .entry(top_level_context.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(InputState::default()))),
        )
    }

    /// Drop the state of a context (releaseActions, context close).
    pub async fn remove(&self, top_level_context: &str) -> Option<Arc<Mutex<InputState>>> {
        self.states.lock().await.remove(top_level_context)
    }
}

#[cfg(test)]
mod tests;
