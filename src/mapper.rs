// Key-to-note resolution: physical key plus layout settings down to the
// note to sound and the on-screen key to light.

use log::warn;

use crate::config::Config;
use crate::layout::{self, LayoutFamily};
use crate::pitch;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    pub play:      String,
    pub highlight: String,
}

/// Resolves a pressed key under the current settings. Returns `None`
/// for keys with no note behind them and for notes filtered out by
/// focus mode. The play note is always the raw table value (plus the
/// two-octave shift in the chromatic layout); only the highlight octave
/// is folded to fit the visible keyboard, and its spelling is always
/// flat-normalized.
pub fn map_key(key: char, shifted: bool, cfg: &Config) -> Option<Mapping> {
    let kn = match cfg.layout {
        LayoutFamily::Flex => {
            let (row, col) = layout::key_position(key)?;
            layout::flex_note(cfg.root, cfg.mode, row, col)
        }
        LayoutFamily::Blue => layout::blue_note(key)?,
    };

    // Focus mode drops anything outside the selected scale, in both
    // layout families.
    if cfg.focus {
        let scale = layout::scale_pitch_classes(cfg.root, cfg.mode);
        if !scale.contains(pitch::flat_of(kn.pc)) {
            return None;
        }
    }

    let mut play = kn.name();
    let highlight = match cfg.layout {
        LayoutFamily::Flex => flex_highlight(key, kn, cfg),
        LayoutFamily::Blue => {
            if shifted {
                play = format!("{}{}", kn.pc, kn.octave + 2);
            }
            blue_highlight(key, kn, &play, cfg)
        }
    };

    Some(Mapping { play, highlight: pitch::normalize_note(&highlight) })
}

fn flex_highlight(key: char, kn: layout::KeyNote, cfg: &Config) -> String {
    let mut highlight = kn.name();
    match layout::base_note_octaves(cfg.root, cfg.mode).get(kn.pc) {
        None => warn!("no base octave for note {}", kn.pc),
        Some(&base) => match cfg.octave_range {
            1 => {
                let octave = match layout::special_key(key) {
                    Some(_) => base + 1,
                    None    => base,
                };
                highlight = format!("{}{}", kn.pc, octave);
            }
            2 => {
                let octave = match layout::special_key(key) {
                    // Overlap keys land on the row their group repeats.
                    Some(inc) => base + (inc - 1) % 2 + 1,
                    None => match layout::key_row(key) {
                        Some(0) | Some(2) => base,
                        _                 => base + 1,
                    },
                };
                highlight = format!("{}{}", kn.pc, octave);
            }
            _ => {}
        },
    }
    // The single-octave view sits one octave above the table.
    if cfg.octave_range == 1 {
        if let Some((pc, octave)) = pitch::split_note(&highlight) {
            return format!("{}{}", pc, octave + 1);
        }
    }
    highlight
}

fn blue_highlight(key: char, kn: layout::KeyNote, play: &str, cfg: &Config) -> String {
    match cfg.octave_range {
        1 => {
            // Everything folds onto the octave-4 block, except the
            // right-hand keys whose C/D/E group belongs to the upper one.
            let octave = if ",./;iop90".contains(key)
                && matches!(kn.pc, "C" | "D" | "E" | "Db" | "Eb")
            {
                5
            } else {
                4
            };
            format!("{}{}", kn.pc, octave)
        }
        2 => match key {
            'z' => "C3".to_string(),
            'x' => "D3".to_string(),
            'q' | ',' => "C4".to_string(),
            'i' => "C5".to_string(),
            // Light the unshifted key.
            _ => kn.name(),
        },
        // The wider views show the played note itself, shift included.
        _ => play.to_string(),
    }
}
