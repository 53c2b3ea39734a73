// Pitches as MIDI note numbers with scientific pitch names.
//
// A `Pitch` is a MIDI note number (0-127). Names use scientific pitch
// notation with sharp spelling and C4 = 60, so "C#2" = 37 and "B5" = 83.
// Parsing is a `const fn` so the chord table can be written with readable
// names and still be checked at compile time: a malformed name in a static
// initializer fails the build rather than panicking at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitch class names indexed by pitch class 0-11 (sharp spelling).
const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Semitones in an octave.
pub const OCTAVE: u8 = 12;

/// Highest valid MIDI note number.
const MAX_MIDI: u8 = 127;

/// A concrete pitch, stored as its MIDI note number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pitch(u8);

impl Pitch {
    pub const fn midi(self) -> u8 {
        self.0
    }

    /// Pitch class 0-11 (0 = C).
    pub const fn pitch_class(self) -> u8 {
        self.0 % OCTAVE
    }

    /// Octave number in scientific notation (MIDI 60 is octave 4).
    pub const fn octave(self) -> i8 {
        (self.0 / OCTAVE) as i8 - 1
    }

    /// Raise by `octaves` octaves. Stops at the highest octave that still
    /// fits in the MIDI range, so the pitch class is always preserved.
    pub const fn up_octaves(self, octaves: u8) -> Pitch {
        let mut midi = self.0;
        let mut remaining = octaves;
        while remaining > 0 && midi + OCTAVE <= MAX_MIDI {
            midi += OCTAVE;
            remaining -= 1;
        }
        Pitch(midi)
    }

    /// Parse a scientific pitch name such as "C4", "F#2", "Bb3" or "C-1".
    ///
    /// Accepts a letter A-G (either case), an optional `#` or `b`, then a
    /// signed octave number. Returns `None` for anything else or for
    /// pitches outside the MIDI range.
    pub const fn parse(name: &str) -> Option<Pitch> {
        let bytes = name.as_bytes();
        if bytes.is_empty() {
            return None;
        }
        let base: i32 = match bytes[0] {
            b'C' | b'c' => 0,
            b'D' | b'd' => 2,
            b'E' | b'e' => 4,
            b'F' | b'f' => 5,
            b'G' | b'g' => 7,
            b'A' | b'a' => 9,
            b'B' | b'b' => 11,
            _ => return None,
        };
        let mut i = 1;
        let mut alter: i32 = 0;
        if i < bytes.len() && bytes[i] == b'#' {
            alter = 1;
            i += 1;
        } else if i < bytes.len() && bytes[i] == b'b' {
            alter = -1;
            i += 1;
        }

        let mut negative = false;
        if i < bytes.len() && bytes[i] == b'-' {
            negative = true;
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let mut octave: i32 = 0;
        while i < bytes.len() {
            let digit = bytes[i];
            if !digit.is_ascii_digit() || octave > 10 {
                return None;
            }
            octave = octave * 10 + (digit - b'0') as i32;
            i += 1;
        }
        if negative {
            octave = -octave;
        }

        let midi = (octave + 1) * OCTAVE as i32 + base + alter;
        if midi < 0 {
            return None;
        }
        if midi > MAX_MIDI as i32 {
            return None;
        }
        Some(Pitch(midi as u8))
    }

    /// Like [`Pitch::parse`], for use in constant initializers. An invalid
    /// name is a compile error when evaluated in a `const` or `static`.
    pub const fn named(name: &str) -> Pitch {
        match Pitch::parse(name) {
            Some(pitch) => pitch,
            None => panic!("invalid pitch name"),
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            PITCH_CLASS_NAMES[self.pitch_class() as usize],
            self.octave()
        )
    }
}

/// Error returned when a pitch name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pitch name '{0}'")]
pub struct ParsePitchError(pub String);

impl FromStr for Pitch {
    type Err = ParsePitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::parse(s.trim()).ok_or_else(|| ParsePitchError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_points() {
        assert_eq!(Pitch::parse("C4").map(Pitch::midi), Some(60));
        assert_eq!(Pitch::parse("A4").map(Pitch::midi), Some(69));
        assert_eq!(Pitch::parse("C2").map(Pitch::midi), Some(36));
        assert_eq!(Pitch::parse("C#2").map(Pitch::midi), Some(37));
        assert_eq!(Pitch::parse("B5").map(Pitch::midi), Some(83));
        assert_eq!(Pitch::parse("Bb3").map(Pitch::midi), Some(58));
        assert_eq!(Pitch::parse("C-1").map(Pitch::midi), Some(0));
        assert_eq!(Pitch::parse("G9").map(Pitch::midi), Some(127));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "H2", "C", "C#", "C#x", "G#9", "C-2", "X", "E##2"] {
            assert_eq!(Pitch::parse(bad), None, "{bad:?} should not parse");
        }
        assert!("Q3".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_display_round_trips_sharp_names() {
        for name in ["C2", "D#3", "F#4", "G#5", "A#2", "B6"] {
            let pitch: Pitch = name.parse().unwrap();
            assert_eq!(pitch.to_string(), name);
        }
        // Flats are printed with sharp spelling.
        assert_eq!(Pitch::named("Eb4").to_string(), "D#4");
    }

    #[test]
    fn test_up_octaves() {
        let e2 = Pitch::named("E2");
        assert_eq!(e2.up_octaves(1), Pitch::named("E3"));
        assert_eq!(e2.up_octaves(0), e2);
        assert_eq!(e2.up_octaves(1).pitch_class(), e2.pitch_class());
        // Clamps to the top octave that still fits.
        assert_eq!(Pitch::named("G8").up_octaves(3), Pitch::named("G9"));
        assert_eq!(Pitch::named("A8").up_octaves(1), Pitch::named("A8"));
    }

    #[test]
    fn test_octave_and_class() {
        let fs3 = Pitch::named("F#3");
        assert_eq!(fs3.pitch_class(), 6);
        assert_eq!(fs3.octave(), 3);
    }
}
