// Pitch spellings and 12-TET frequency conversion (A4 = 440 Hz).

use log::warn;

// ---------------------------------------------------------------------------
// Pitch classes
// ---------------------------------------------------------------------------

/// Canonical display spellings, flats preferred for the black keys. The
/// array index is the semitone within the octave.
pub const FLAT_NAMES: [&str; 12] =
    ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Semitone index within the octave for every recognized spelling
/// (12 canonical names plus the five sharps).
pub fn pitch_index(pc: &str) -> Option<i32> {
    let idx = match pc {
        "C" => 0,
        "C#" | "Db" => 1,
        "D" => 2,
        "D#" | "Eb" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "Gb" => 6,
        "G" => 7,
        "G#" | "Ab" => 8,
        "A" => 9,
        "A#" | "Bb" => 10,
        "B" => 11,
        _ => return None,
    };
    Some(idx)
}

/// Sharp spellings rendered as their flat equivalent; everything else
/// passes through unchanged.
pub fn flat_of(pc: &str) -> &str {
    match pc {
        "C#" => "Db",
        "D#" => "Eb",
        "F#" => "Gb",
        "G#" => "Ab",
        "A#" => "Bb",
        _ => pc,
    }
}

/// Splits `"Db4"` into `("Db", 4)`.
pub fn split_note(note: &str) -> Option<(&str, i32)> {
    let split = note.len() - note.bytes().rev().take_while(|b| b.is_ascii_digit()).count();
    if split == 0 || split == note.len() {
        return None;
    }
    let octave = note[split..].parse().ok()?;
    Some((&note[..split], octave))
}

/// Display form of a note: sharp pitch classes respelled as flats.
pub fn normalize_note(note: &str) -> String {
    match split_note(note) {
        Some((pc, octave)) => format!("{}{}", flat_of(pc), octave),
        None => note.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

const A4_NUM: i32 = 4 * 12 + 9;

/// Equal-temperament frequency of a note string. Malformed input logs a
/// warning and yields 0 Hz, so a bad table entry plays silence rather
/// than tearing down the engine.
pub fn freq_of(note: &str) -> f32 {
    let parsed = split_note(note).and_then(|(pc, octave)| Some((pitch_index(pc)?, octave)));
    let Some((idx, octave)) = parsed else {
        warn!("invalid note: {}", note);
        return 0.0;
    };
    let note_num = octave * 12 + idx;
    440.0 * 2.0_f32.powf((note_num - A4_NUM) as f32 / 12.0)
}
