// The chord table: 24 chord symbols mapped to fixed ten-note voicings.
//
// Each voicing spells the triad upward from its root in octave 2 (root,
// third, fifth, repeated) and ends on the root three octaves up, so index 0
// is the low root and index 9 is the root an octave below where the melody
// sits once it is transposed. Every voicing is strictly ascending.
//
// The table is a static array checked at compile time (see
// `Pitch::named`); the lookup index over it is built lazily on first use
// and is read-only afterwards.
//
// Symbols are the 12 sharp-spelled roots, optionally followed by `m` for
// minor. Input symbols are normalized first (trimmed, with the Unicode
// sharp sign and its common UTF-8-as-Latin-1 mojibake rewritten to `#`).

use crate::pitch::Pitch;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Number of pitches in every voicing.
pub const VOICING_LEN: usize = 10;

/// A concrete ascending voicing of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordVoicing {
    pitches: [Pitch; VOICING_LEN],
}

impl ChordVoicing {
    /// The voicing's pitches, lowest first.
    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }
}

/// Build a voicing from pitch names at compile time.
const fn voicing(names: [&str; VOICING_LEN]) -> ChordVoicing {
    let mut pitches = [Pitch::named("C0"); VOICING_LEN];
    let mut i = 0;
    while i < VOICING_LEN {
        pitches[i] = Pitch::named(names[i]);
        i += 1;
    }
    ChordVoicing { pitches }
}

/// All supported chord symbols with their voicings, majors then minors.
#[rustfmt::skip]
pub static CHORD_TABLE: [(&str, ChordVoicing); 24] = [
    // Major
    ("C", voicing(["C2", "E2", "G2", "C3", "E3", "G3", "C4", "E4", "G4", "C5"])),
    ("C#", voicing(["C#2", "F2", "G#2", "C#3", "F3", "G#3", "C#4", "F4", "G#4", "C#5"])),
    ("D", voicing(["D2", "F#2", "A2", "D3", "F#3", "A3", "D4", "F#4", "A4", "D5"])),
    ("D#", voicing(["D#2", "G2", "A#2", "D#3", "G3", "A#3", "D#4", "G4", "A#4", "D#5"])),
    ("E", voicing(["E2", "G#2", "B2", "E3", "G#3", "B3", "E4", "G#4", "B4", "E5"])),
    ("F", voicing(["F2", "A2", "C3", "F3", "A3", "C4", "F4", "A4", "C5", "F5"])),
    ("F#", voicing(["F#2", "A#2", "C#3", "F#3", "A#3", "C#4", "F#4", "A#4", "C#5", "F#5"])),
    ("G", voicing(["G2", "B2", "D3", "G3", "B3", "D4", "G4", "B4", "D5", "G5"])),
    ("G#", voicing(["G#2", "C3", "D#3", "G#3", "C4", "D#4", "G#4", "C5", "D#5", "G#5"])),
    ("A", voicing(["A2", "C#3", "E3", "A3", "C#4", "E4", "A4", "C#5", "E5", "A5"])),
    ("A#", voicing(["A#2", "D3", "F3", "A#3", "D4", "F4", "A#4", "D5", "F5", "A#5"])),
    ("B", voicing(["B2", "D#3", "F#3", "B3", "D#4", "F#4", "B4", "D#5", "F#5", "B5"])),
    // Minor
    ("Cm", voicing(["C2", "D#2", "G2", "C3", "D#3", "G3", "C4", "D#4", "G4", "C5"])),
    ("C#m", voicing(["C#2", "E2", "G#2", "C#3", "E3", "G#3", "C#4", "E4", "G#4", "C#5"])),
    ("Dm", voicing(["D2", "F2", "A2", "D3", "F3", "A3", "D4", "F4", "A4", "D5"])),
    ("D#m", voicing(["D#2", "F#2", "A#2", "D#3", "F#3", "A#3", "D#4", "F#4", "A#4", "D#5"])),
    ("Em", voicing(["E2", "G2", "B2", "E3", "G3", "B3", "E4", "G4", "B4", "E5"])),
    ("Fm", voicing(["F2", "G#2", "C3", "F3", "G#3", "C4", "F4", "G#4", "C5", "F5"])),
    ("F#m", voicing(["F#2", "A2", "C#3", "F#3", "A3", "C#4", "F#4", "A4", "C#5", "F#5"])),
    ("Gm", voicing(["G2", "A#2", "D3", "G3", "A#3", "D4", "G4", "A#4", "D5", "G5"])),
    ("G#m", voicing(["G#2", "B2", "D#3", "G#3", "B3", "D#4", "G#4", "B4", "D#5", "G#5"])),
    ("Am", voicing(["A2", "C3", "E3", "A3", "C4", "E4", "A4", "C5", "E5", "A5"])),
    ("A#m", voicing(["A#2", "C#3", "F3", "A#3", "C#4", "F4", "A#4", "C#5", "F5", "A#5"])),
    ("Bm", voicing(["B2", "D3", "F#3", "B3", "D4", "F#4", "B4", "D5", "F#5", "B5"])),
];

static CHORD_INDEX: LazyLock<BTreeMap<&'static str, &'static ChordVoicing>> =
    LazyLock::new(|| CHORD_TABLE.iter().map(|(symbol, v)| (*symbol, v)).collect());

/// Normalize a chord symbol for lookup: trim whitespace and rewrite
/// alternate sharp encodings to ASCII `#`.
pub fn normalize_symbol(symbol: &str) -> Cow<'_, str> {
    let trimmed = symbol.trim();
    if trimmed.contains('\u{266F}') || trimmed.contains("\u{e2}\u{2122}\u{af}") {
        Cow::Owned(
            trimmed
                .replace("\u{e2}\u{2122}\u{af}", "#")
                .replace('\u{266F}', "#"),
        )
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Look up the voicing for a chord symbol. The symbol is normalized first.
/// Returns `None` for symbols outside the table.
pub fn lookup(symbol: &str) -> Option<&'static ChordVoicing> {
    CHORD_INDEX.get(normalize_symbol(symbol).as_ref()).copied()
}
