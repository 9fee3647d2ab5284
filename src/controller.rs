// Input-side state: held keys, shifted-symbol normalization and pointer
// drags, wired to the mapper and the voice engine.

use std::collections::HashMap;

use crate::config::Config;
use crate::engine::Engine;
use crate::mapper::{self, Mapping};

/// Peak gain handed to the engine for every press.
pub const DEFAULT_VELOCITY: f32 = 0.2;

/// Turns shifted punctuation back into the base key it shares a cap
/// with, so shift+2 lands on the same chromatic key as 2.
pub fn unshift_symbol(key: char) -> char {
    match key {
        '@' => '2', '#' => '3', '%' => '5', '^' => '6', '&' => '7',
        '(' => '9', ')' => '0',
        '<' => ',', '>' => '.', '?' => '/', ':' => ';',
        _ => key,
    }
}

/// Tracks which physical keys are held and which on-screen key the
/// pointer last played, so key repeats, stray key-ups and drags cannot
/// wedge a voice on.
pub struct Controller {
    pub config: Config,
    pub engine: Engine,
    down:         HashMap<String, Mapping>, // physical key code -> mapping
    dragging:     bool,
    last_dragged: Option<String>,
}

impl Controller {
    pub fn new(sample_rate: f32) -> Controller {
        Controller {
            config:       Config::default(),
            engine:       Engine::new(sample_rate),
            down:         HashMap::new(),
            dragging:     false,
            last_dragged: None,
        }
    }

    /// Key press. `code` identifies the physical key; repeats of a held
    /// code are ignored. `key` is the produced character. Returns the
    /// note to light up, if the key mapped to one.
    pub fn key_down(&mut self, code: &str, key: char, shifted: bool) -> Option<String> {
        if self.down.contains_key(code) {
            return None;
        }
        let key = if shifted { unshift_symbol(key) } else { key };
        let mapping = mapper::map_key(key.to_ascii_lowercase(), shifted, &self.config)?;
        self.engine.start(&mapping.play, DEFAULT_VELOCITY);
        let highlight = mapping.highlight.clone();
        self.down.insert(code.to_string(), mapping);
        Some(highlight)
    }

    /// Key release. Unknown codes are no-ops, so a key-up whose press
    /// never mapped (or was already consumed) cannot stop another
    /// voice. Returns the note to unlight.
    pub fn key_up(&mut self, code: &str) -> Option<String> {
        let mapping = self.down.remove(code)?;
        self.engine.stop(&mapping.play);
        Some(mapping.highlight)
    }

    /// Pointer pressed on an on-screen key.
    pub fn pointer_down(&mut self, note: &str) {
        self.engine.start(note, DEFAULT_VELOCITY);
        self.dragging = true;
        self.last_dragged = Some(note.to_string());
    }

    /// Pointer slid onto another key while held. The note left behind
    /// is stopped before the new one starts. Returns the note that
    /// began sounding, if the pointer actually moved to a new key.
    pub fn pointer_move(&mut self, note: &str) -> Option<String> {
        if !self.dragging || self.last_dragged.as_deref() == Some(note) {
            return None;
        }
        if let Some(prev) = self.last_dragged.take() {
            self.engine.stop(&prev);
        }
        self.engine.start(note, DEFAULT_VELOCITY);
        self.last_dragged = Some(note.to_string());
        Some(note.to_string())
    }

    /// Pointer released anywhere.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
        if let Some(note) = self.last_dragged.take() {
            self.engine.stop(&note);
        }
    }
}
