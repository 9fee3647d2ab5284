// Keyboard settings: layout family, octave range, scale, focus.

use log::warn;

use crate::layout::{self, LayoutFamily, Mode};

/// One settings value, owned by the controller and mutated only through
/// the setters below.
#[derive(Clone, Debug)]
pub struct Config {
    pub layout:       LayoutFamily,
    pub octave_range: u8,    // 1..=4
    pub root:         usize, // index into pitch::FLAT_NAMES
    pub mode:         Mode,
    pub focus:        bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            layout:       LayoutFamily::Flex,
            octave_range: 1,
            root:         0, // C
            mode:         Mode::Major,
            focus:        false,
        }
    }
}

impl Config {
    /// Switches the active scale. An unrecognized root or mode name
    /// leaves the previous scale in place.
    pub fn set_scale(&mut self, root: &str, mode: &str) {
        match (layout::root_index(root), Mode::from_name(mode)) {
            (Some(r), Some(m)) => {
                self.root = r;
                self.mode = m;
            }
            _ => warn!("no keymap for {} {}", root, mode),
        }
    }

    pub fn set_layout(&mut self, layout: LayoutFamily) {
        self.layout = layout;
    }

    /// Octave-range settings outside 1..=4 are ignored.
    pub fn set_octave_range(&mut self, octaves: u8) {
        if (1..=4).contains(&octaves) {
            self.octave_range = octaves;
        }
    }

    pub fn set_focus(&mut self, on: bool) {
        self.focus = on;
    }
}
