// Keyboard layout tables: the scale-aware Flex family (generated from
// per-mode interval patterns) and the fixed chromatic Blue table, plus
// the inverse note-to-keys binding hints shown on the rendered keys.

use std::collections::{HashMap, HashSet};

use crate::pitch::{self, FLAT_NAMES};

// ---------------------------------------------------------------------------
// Physical rows
// ---------------------------------------------------------------------------

/// The four key rows, bottom row first. Within a row the ten keys run
/// left to right.
pub const ROWS: [[char; 10]; 4] = [
    ['z', 'x', 'c', 'v', 'b', 'n', 'm', ',', '.', '/'],
    ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';'],
    ['q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p'],
    ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'],
];

/// Row index of a key (0 = bottom), or `None` off the grid.
pub fn key_row(key: char) -> Option<usize> {
    ROWS.iter().position(|row| row.contains(&key))
}

/// (row, column) of a key on the grid.
pub fn key_position(key: char) -> Option<(usize, usize)> {
    for (row, keys) in ROWS.iter().enumerate() {
        if let Some(col) = keys.iter().position(|&k| k == key) {
            return Some((row, col));
        }
    }
    None
}

/// Overlap keys: the last three keys of each row double as the low end
/// of the row above. The increment is the octave distance the highlight
/// rules use for the group.
pub fn special_key(key: char) -> Option<i32> {
    match key {
        ',' | '.' | '/' => Some(1),
        'k' | 'l' | ';' => Some(2),
        'i' | 'o' | 'p' => Some(3),
        '8' | '9' | '0' => Some(4),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Scales
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

pub const MODES: [Mode; 9] = [
    Mode::Major,
    Mode::NaturalMinor,
    Mode::HarmonicMinor,
    Mode::MelodicMinor,
    Mode::Dorian,
    Mode::Phrygian,
    Mode::Lydian,
    Mode::Mixolydian,
    Mode::Locrian,
];

impl Mode {
    pub fn from_name(name: &str) -> Option<Mode> {
        let mode = match name {
            "Major"          => Mode::Major,
            "Natural Minor"  => Mode::NaturalMinor,
            "Harmonic Minor" => Mode::HarmonicMinor,
            "Melodic Minor"  => Mode::MelodicMinor,
            "Dorian"         => Mode::Dorian,
            "Phrygian"       => Mode::Phrygian,
            "Lydian"         => Mode::Lydian,
            "Mixolydian"     => Mode::Mixolydian,
            "Locrian"        => Mode::Locrian,
            _ => return None,
        };
        Some(mode)
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major         => "Major",
            Mode::NaturalMinor  => "Natural Minor",
            Mode::HarmonicMinor => "Harmonic Minor",
            Mode::MelodicMinor  => "Melodic Minor",
            Mode::Dorian        => "Dorian",
            Mode::Phrygian      => "Phrygian",
            Mode::Lydian        => "Lydian",
            Mode::Mixolydian    => "Mixolydian",
            Mode::Locrian       => "Locrian",
        }
    }

    /// Semitone offsets of the seven scale degrees from the root.
    pub fn intervals(self) -> [i32; 7] {
        match self {
            Mode::Major         => [0, 2, 4, 5, 7, 9, 11],
            Mode::NaturalMinor  => [0, 2, 3, 5, 7, 8, 10],
            Mode::HarmonicMinor => [0, 2, 3, 5, 7, 8, 11],
            Mode::MelodicMinor  => [0, 2, 3, 5, 7, 9, 11],
            Mode::Dorian        => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian      => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian        => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian    => [0, 2, 4, 5, 7, 9, 10],
            Mode::Locrian       => [0, 1, 3, 5, 6, 8, 10],
        }
    }
}

/// Root index (= semitone) for one of the 12 canonical spellings.
pub fn root_index(root: &str) -> Option<usize> {
    FLAT_NAMES.iter().position(|&n| n == root)
}

// ---------------------------------------------------------------------------
// Layout families
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutFamily {
    Flex,
    Blue,
}

/// One layout-table cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyNote {
    pub pc:     &'static str,
    pub octave: i32,
}

impl KeyNote {
    pub fn name(&self) -> String {
        format!("{}{}", self.pc, self.octave)
    }
}

// ---------------------------------------------------------------------------
// Flex tables (generated)
// ---------------------------------------------------------------------------

const LETTER_NAMES: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];
const SHARP_NAMES:  [&str; 7] = ["C#", "D#", "E#", "F#", "G#", "A#", "B#"];
const FLAT_SPELLED: [&str; 7] = ["Cb", "Db", "Eb", "Fb", "Gb", "Ab", "Bb"];
const NATURAL_PC:   [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

fn letter_index(pc: &str) -> usize {
    let first = &pc[..1];
    LETTER_NAMES.iter().position(|&l| l == first).unwrap_or(0)
}

/// Note under a Flex key. `row` is the physical row (0 = bottom, each
/// row an octave above the one below), `col` the key's position within
/// it; the ten columns are scale degrees, with degrees past the seventh
/// wrapping into the next octave.
///
/// Spelling follows the scale: the k-th degree takes the k-th letter
/// after the root's, and a single sharp or flat where the scale demands
/// one. Theoretical spellings outside the recognized set (Cb, E#,
/// double accidentals) fall back to the canonical flat name of the
/// pitch class at its true octave.
pub fn flex_note(root: usize, mode: Mode, row: usize, col: usize) -> KeyNote {
    // C..Gb anchor the bottom row at octave 3, G..B an octave lower.
    let anchor = if root <= 6 { 3 } else { 2 };
    let intervals = mode.intervals();
    let abs = (anchor + row as i32 + (col / 7) as i32) * 12
        + root as i32
        + intervals[col % 7];

    let letter = (letter_index(FLAT_NAMES[root]) + col) % 7;
    let diff = abs - NATURAL_PC[letter];
    let mut octave = diff.div_euclid(12);
    let mut accidental = diff.rem_euclid(12);
    if accidental > 6 {
        accidental -= 12;
        octave += 1;
    }
    let name = match accidental {
        0  => LETTER_NAMES[letter],
        1  => SHARP_NAMES[letter],
        -1 => FLAT_SPELLED[letter],
        _  => "",
    };
    if pitch::pitch_index(name).is_some() {
        KeyNote { pc: name, octave }
    } else {
        KeyNote {
            pc:     FLAT_NAMES[abs.rem_euclid(12) as usize],
            octave: abs.div_euclid(12),
        }
    }
}

/// Full 4x10 Flex table for a (root, mode), bottom row first.
pub fn flex_table(root: usize, mode: Mode) -> [[KeyNote; 10]; 4] {
    std::array::from_fn(|row| std::array::from_fn(|col| flex_note(root, mode, row, col)))
}

/// Lowest octave at which each spelling occurs in a Flex table.
pub fn base_note_octaves(root: usize, mode: Mode) -> HashMap<&'static str, i32> {
    let mut base = HashMap::new();
    for row in 0..ROWS.len() {
        for col in 0..ROWS[row].len() {
            let kn = flex_note(root, mode, row, col);
            let entry = base.entry(kn.pc).or_insert(kn.octave);
            if kn.octave < *entry {
                *entry = kn.octave;
            }
        }
    }
    base
}

/// Flat-normalized pitch classes present in a Flex table.
pub fn scale_pitch_classes(root: usize, mode: Mode) -> HashSet<&'static str> {
    let mut notes = HashSet::new();
    for row in 0..ROWS.len() {
        for col in 0..ROWS[row].len() {
            notes.insert(pitch::flat_of(flex_note(root, mode, row, col).pc));
        }
    }
    notes
}

// ---------------------------------------------------------------------------
// Blue table (fixed chromatic)
// ---------------------------------------------------------------------------

/// The fixed chromatic table. The keys sitting between the black-key
/// clusters are unmapped.
pub fn blue_note(key: char) -> Option<KeyNote> {
    let (pc, octave) = match key {
        '2' => ("Db", 4), '3' => ("Eb", 4),
        '5' => ("Gb", 4), '6' => ("Ab", 4), '7' => ("Bb", 4),
        '9' => ("Db", 5), '0' => ("Eb", 5),

        'q' => ("C", 4), 'w' => ("D", 4), 'e' => ("E", 4), 'r' => ("F", 4),
        't' => ("G", 4), 'y' => ("A", 4), 'u' => ("B", 4),
        'i' => ("C", 5), 'o' => ("D", 5), 'p' => ("E", 5),

        's' => ("Db", 3), 'd' => ("Eb", 3),
        'g' => ("Gb", 3), 'h' => ("Ab", 3), 'j' => ("Bb", 3),
        'l' => ("Db", 4), ';' => ("Eb", 4),

        'z' => ("C", 3), 'x' => ("D", 3), 'c' => ("E", 3), 'v' => ("F", 3),
        'b' => ("G", 3), 'n' => ("A", 3), 'm' => ("B", 3),
        ',' => ("C", 4), '.' => ("D", 4), '/' => ("E", 4),

        _ => return None,
    };
    Some(KeyNote { pc, octave })
}

// ---------------------------------------------------------------------------
// Binding hints
// ---------------------------------------------------------------------------

// Hand-laid hint strings for the one- and two-octave views. The wider
// views are derived from the tables below.
const FLEX_BINDINGS_1: &[(&str, &str)] = &[
    ("C3", "1qaz"), ("D3", "2wsx"), ("E3", "3edc"), ("F3", "4rfv"),
    ("G3", "5tgb"), ("A3", "6yhn"), ("B3", "7ujm"),
    ("C4", "8ik,"), ("D4", "9ol."), ("E4", "0p;/"),
];

const FLEX_BINDINGS_2: &[(&str, &str)] = &[
    ("C3", "zq"), ("D3", "xw"), ("E3", "ce"), ("F3", "vr"),
    ("G3", "bt"), ("A3", "ny"), ("B3", "mu"),
    ("C4", "1a,i"), ("D4", "2s.o"), ("E4", "3d/p"),
    ("F4", "4f"), ("G4", "5g"), ("A4", "6h"), ("B4", "7j"),
    ("C5", "8k"), ("D5", "9l"), ("E5", "0;"),
];

const BLUE_BINDINGS_1: &[(&str, &str)] = &[
    ("C3", "zq"), ("Db3", "s2"), ("D3", "xw"), ("Eb3", "d3"), ("E3", "ce"),
    ("F3", "vr"), ("Gb3", "g5"), ("G3", "bt"), ("Ab3", "h6"), ("A3", "ny"),
    ("Bb3", "j7"), ("B3", "mu"),
    ("C4", ",i"), ("Db4", "l9"), ("D4", ".o"), ("Eb4", ";0"), ("E4", "/p"),
];

const BLUE_BINDINGS_2: &[(&str, &str)] = &[
    ("C3", "z"), ("Db3", "s"), ("D3", "x"), ("Eb3", "d"), ("E3", "c"),
    ("F3", "v"), ("Gb3", "g"), ("G3", "b"), ("Ab3", "h"), ("A3", "n"),
    ("Bb3", "j"), ("B3", "m"),
    ("C4", ",q"), ("Db4", "l2"), ("D4", ".w"), ("Eb4", ";3"), ("E4", "/e"),
    ("F4", "r"), ("Gb4", "5"), ("G4", "t"), ("Ab4", "6"), ("A4", "y"),
    ("Bb4", "7"), ("B4", "u"),
    ("C5", "i"), ("Db5", "9"), ("D5", "o"), ("Eb5", "0"), ("E5", "p"),
];

// Key enumeration order for derived hints: top row down to the bottom.
fn key_order() -> impl Iterator<Item = char> {
    [3usize, 2, 1, 0].into_iter().flat_map(|row| ROWS[row].into_iter())
}

fn push_binding(bindings: &mut Vec<(String, String)>, note: String, key: char) {
    match bindings.iter_mut().find(|(n, _)| *n == note) {
        Some((_, keys)) => keys.push(key),
        None => bindings.push((note, key.to_string())),
    }
}

fn owned(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table.iter().map(|&(n, k)| (n.to_string(), k.to_string())).collect()
}

/// Inverse note-to-keys hints for the rendered keyboard. The Flex
/// hints exist only for the one- and two-octave views; at the wider
/// settings the rows are scale-dependent and carry no hints. The Blue
/// hints additionally list the shift-reachable notes (two octaves up)
/// as uppercase key labels.
pub fn bindings(family: LayoutFamily, octave_range: u8) -> Vec<(String, String)> {
    match family {
        LayoutFamily::Flex => match octave_range {
            1 => owned(FLEX_BINDINGS_1),
            2 => owned(FLEX_BINDINGS_2),
            _ => Vec::new(),
        },
        LayoutFamily::Blue => {
            let mut out = match octave_range {
                1 => owned(BLUE_BINDINGS_1),
                2 => owned(BLUE_BINDINGS_2),
                _ => {
                    let mut derived = Vec::new();
                    for key in key_order() {
                        if let Some(kn) = blue_note(key) {
                            push_binding(&mut derived, kn.name(), key);
                        }
                    }
                    derived
                }
            };
            for key in key_order() {
                if let Some(kn) = blue_note(key) {
                    let note = format!("{}{}", kn.pc, kn.octave + 2);
                    push_binding(&mut out, note, key.to_ascii_uppercase());
                }
            }
            out
        }
    }
}
