// The score: two timed voices plus dynamic markings.
//
// Time is measured in integer MIDI ticks at 480 per quarter note. A measure
// is three quarter-lengths (1440 ticks), which divides evenly by both the
// ten-note accompaniment arpeggio (144 ticks per note) and the nine-note
// melody figure (160 ticks per note), so per-measure sums are exact.
//
// The score is built once by `arrange.rs` and then only read: by `midi.rs`
// for file output, by the CLI for the summary printout, and by serde when
// dumped as JSON.

use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Ticks per quarter note. Shared with the MIDI header.
pub const TICKS_PER_QUARTER: u32 = 480;

/// Length of one generated measure in quarter notes.
pub const MEASURE_QUARTERS: u32 = 3;

/// Length of one generated measure in ticks.
pub const MEASURE_TICKS: u32 = MEASURE_QUARTERS * TICKS_PER_QUARTER;

/// Most measures a score can hold with every tick offset fitting in `u32`.
pub const MAX_MEASURE_COUNT: usize = (u32::MAX / MEASURE_TICKS) as usize;

/// Slowest tempo whose microseconds-per-quarter fits the 24-bit MIDI field.
pub const MIN_TEMPO_BPM: u16 = 4;

/// Convert ticks to quarter-lengths.
pub fn ticks_to_quarters(ticks: u32) -> f64 {
    ticks as f64 / TICKS_PER_QUARTER as f64
}

/// The two voices of the arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Melody,
    Accompaniment,
}

impl Part {
    pub const ALL: [Part; 2] = [Part::Melody, Part::Accompaniment];

    /// Part identifier, used as the MIDI track name.
    pub fn name(self) -> &'static str {
        match self {
            Part::Melody => "melody",
            Part::Accompaniment => "accompaniment",
        }
    }

    /// MIDI channel (0-based).
    pub fn channel(self) -> u8 {
        match self {
            Part::Melody => 0,
            Part::Accompaniment => 1,
        }
    }
}

/// A single sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub part: Part,
    pub pitch: Pitch,
    /// Start time in ticks from the beginning of the piece.
    pub offset: u32,
    /// Length in ticks.
    pub duration: u32,
    /// MIDI velocity (0-127).
    pub velocity: u8,
    /// Index of the measure this note belongs to.
    pub measure: usize,
}

impl NoteEvent {
    pub fn end(&self) -> u32 {
        self.offset + self.duration
    }

    pub fn offset_quarters(&self) -> f64 {
        ticks_to_quarters(self.offset)
    }

    pub fn quarter_length(&self) -> f64 {
        ticks_to_quarters(self.duration)
    }
}

/// Gradual dynamic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hairpin {
    Crescendo,
    Diminuendo,
}

impl Hairpin {
    pub fn name(self) -> &'static str {
        match self {
            Hairpin::Crescendo => "crescendo",
            Hairpin::Diminuendo => "diminuendo",
        }
    }
}

/// A hairpin anchored at an offset in the melody voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicMarking {
    pub kind: Hairpin,
    pub offset: u32,
    pub measure: usize,
}

/// A meter, as written in the score (not tied to `MEASURE_TICKS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    pub const NINE_EIGHT: TimeSignature = TimeSignature {
        numerator: 9,
        denominator: 8,
    };
}

/// A measure left silent because its chord symbol was not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMeasure {
    pub measure: usize,
    pub symbol: String,
}

/// The complete generated piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Tempo in quarter notes per minute.
    pub tempo_bpm: u16,
    pub time_signature: TimeSignature,
    /// Number of measures the piece spans, including skipped ones.
    pub measure_count: usize,
    pub melody: Vec<NoteEvent>,
    pub accompaniment: Vec<NoteEvent>,
    /// Hairpins, all attached to the melody voice.
    pub dynamics: Vec<DynamicMarking>,
    pub skipped: Vec<SkippedMeasure>,
}

impl Score {
    /// An empty score with the given tempo and length.
    pub fn new(tempo_bpm: u16, measure_count: usize) -> Self {
        Score {
            tempo_bpm,
            time_signature: TimeSignature::NINE_EIGHT,
            measure_count,
            melody: Vec::new(),
            accompaniment: Vec::new(),
            dynamics: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Notes of one voice in time order.
    pub fn notes(&self, part: Part) -> &[NoteEvent] {
        match part {
            Part::Melody => &self.melody,
            Part::Accompaniment => &self.accompaniment,
        }
    }

    /// Notes of one voice that belong to a given measure.
    pub fn measure_notes(&self, part: Part, measure: usize) -> impl Iterator<Item = &NoteEvent> {
        self.notes(part).iter().filter(move |n| n.measure == measure)
    }

    /// Tick at which the piece ends (the full measure span, including
    /// trailing skipped measures). Saturates past `MAX_MEASURE_COUNT`.
    pub fn end_tick(&self) -> u32 {
        u32::try_from(self.measure_count)
            .ok()
            .and_then(|count| count.checked_mul(MEASURE_TICKS))
            .unwrap_or(u32::MAX)
    }

    pub fn duration_seconds(&self) -> f64 {
        ticks_to_quarters(self.end_tick()) * 60.0 / self.tempo_bpm as f64
    }

    /// Count note statistics for the score.
    pub fn stats(&self) -> ScoreStats {
        let count = |kind: Hairpin| self.dynamics.iter().filter(|d| d.kind == kind).count();
        ScoreStats {
            measures: self.measure_count,
            skipped_measures: self.skipped.len(),
            melody_notes: self.melody.len(),
            accompaniment_notes: self.accompaniment.len(),
            crescendos: count(Hairpin::Crescendo),
            diminuendos: count(Hairpin::Diminuendo),
        }
    }

    /// Compact text summary: one line per measure with its start (in
    /// quarters), hairpin, bass note, and the melody figure. Skipped
    /// measures are shown with their unmatched symbol.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for measure in 0..self.measure_count {
            let _ = write!(out, "{:>3} ", measure + 1);
            if let Some(skip) = self.skipped.iter().find(|s| s.measure == measure) {
                let _ = writeln!(out, "          -- skipped ({})", skip.symbol);
                continue;
            }
            let hairpin = self
                .dynamics
                .iter()
                .find(|d| d.measure == measure)
                .map_or("  ", |d| match d.kind {
                    Hairpin::Crescendo => "< ",
                    Hairpin::Diminuendo => "> ",
                });
            let Some(bass) = self.measure_notes(Part::Accompaniment, measure).next() else {
                out.push('\n');
                continue;
            };
            let _ = write!(
                out,
                "{:>6.1} {hairpin}{:>4} |",
                bass.offset_quarters(),
                bass.pitch.to_string()
            );
            for note in self.measure_notes(Part::Melody, measure) {
                let _ = write!(out, " {}", note.pitch);
            }
            out.push('\n');
        }
        out
    }
}

/// Statistics about a score's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreStats {
    pub measures: usize,
    pub skipped_measures: usize,
    pub melody_notes: usize,
    pub accompaniment_notes: usize,
    pub crescendos: usize,
    pub diminuendos: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(part: Part, name: &str, measure: usize, index: u32, step: u32) -> NoteEvent {
        NoteEvent {
            part,
            pitch: Pitch::named(name),
            offset: measure as u32 * MEASURE_TICKS + index * step,
            duration: step,
            velocity: 100,
            measure,
        }
    }

    #[test]
    fn test_measure_divides_evenly() {
        assert_eq!(MEASURE_TICKS % 10, 0);
        assert_eq!(MEASURE_TICKS % 9, 0);
        assert_eq!(ticks_to_quarters(MEASURE_TICKS), 3.0);
    }

    #[test]
    fn test_empty_score() {
        let score = Score::new(88, 4);
        assert_eq!(score.time_signature, TimeSignature::NINE_EIGHT);
        assert_eq!(score.end_tick(), 4 * 1440);
        assert!(score.notes(Part::Melody).is_empty());
        let stats = score.stats();
        assert_eq!(stats.melody_notes + stats.accompaniment_notes, 0);
    }

    #[test]
    fn test_duration_seconds() {
        // 2 measures = 6 quarters; at 60 BPM that is 6 seconds.
        let score = Score::new(60, 2);
        assert!((score.duration_seconds() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_measure_notes_and_summary() {
        let mut score = Score::new(88, 2);
        score.melody.push(note(Part::Melody, "E3", 0, 0, 160));
        score.melody.push(note(Part::Melody, "G3", 0, 1, 160));
        score.accompaniment.push(note(Part::Accompaniment, "E2", 0, 0, 144));
        score.dynamics.push(DynamicMarking {
            kind: Hairpin::Crescendo,
            offset: 0,
            measure: 0,
        });
        score.skipped.push(SkippedMeasure {
            measure: 1,
            symbol: "X".into(),
        });

        assert_eq!(score.measure_notes(Part::Melody, 0).count(), 2);
        assert_eq!(score.measure_notes(Part::Melody, 1).count(), 0);

        let summary = score.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("0.0 <"));
        assert!(lines[0].contains("E2 | E3 G3"));
        assert!(lines[1].contains("skipped (X)"));
    }

    #[test]
    fn test_note_event_conversions() {
        let n = note(Part::Melody, "C4", 1, 2, 160);
        assert_eq!(n.offset, 1440 + 320);
        assert_eq!(n.end(), 1440 + 480);
        assert!((n.quarter_length() - 1.0 / 3.0).abs() < 1e-12);
        assert!((n.offset_quarters() - (3.0 + 2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_part_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Part::Accompaniment).unwrap(), "\"accompaniment\"");
        assert_eq!(serde_json::to_string(&Hairpin::Diminuendo).unwrap(), "\"diminuendo\"");
    }
}
