// Arrangement generation: chord progression in, two-voice score out.
//
// One pass over the measures. Measure `i` takes chord `i mod len` of the
// progression (at most the first `max_chords` symbols are used) and writes:
// - accompaniment: the chord's ten-note voicing, low to high, evenly
//   filling the measure at velocity 90;
// - melody: the voicing indices 0 2 4 6 8 7 5 3 1 raised one octave, nine
//   even steps at velocity 110;
// - a crescendo at measures where i mod 8 == 0 and a diminuendo where
//   i mod 8 == 4, anchored at the measure's first melody note.
//
// A symbol missing from the chord table leaves its measure silent in both
// voices. The miss is logged and recorded in `Score::skipped`; the other
// measures are unaffected, so timing keeps its place in the grid.
//
// Generation is a pure function of its inputs. There is no randomness, and
// identical input yields identical output. Options are validated up front;
// that is the only way generation can fail.

use crate::chord::{self, ChordVoicing, normalize_symbol};
use crate::pitch::Pitch;
use crate::score::{
    DynamicMarking, Hairpin, MAX_MEASURE_COUNT, MEASURE_TICKS, MIN_TEMPO_BPM, NoteEvent, Part,
    Score, SkippedMeasure,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Voicing indices walked by the melody in each measure.
pub const MELODY_PATTERN: [usize; 9] = [0, 2, 4, 6, 8, 7, 5, 3, 1];

/// Progression used when none is given.
pub const DEFAULT_PROGRESSION: &str = "Em D G C Am Bm Em D";

/// Measures in the piece.
pub const DEFAULT_MEASURE_COUNT: usize = 42;

/// Only this many symbols of the progression are used.
pub const MAX_CHORDS: usize = 8;

pub const DEFAULT_TEMPO_BPM: u16 = 88;
pub const ACCOMPANIMENT_VELOCITY: u8 = 90;
pub const MELODY_VELOCITY: u8 = 110;

/// Highest MIDI velocity.
const MAX_VELOCITY: u8 = 127;

/// Hairpins repeat with this period, in measures.
const DYNAMICS_PERIOD: usize = 8;
const CRESCENDO_PHASE: usize = 0;
const DIMINUENDO_PHASE: usize = 4;

/// Tunable parts of the arrangement. The meter, measure length, melody
/// pattern and chord table are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangeOptions {
    pub measure_count: usize,
    pub max_chords: usize,
    pub tempo_bpm: u16,
    pub accompaniment_velocity: u8,
    pub melody_velocity: u8,
}

impl Default for ArrangeOptions {
    fn default() -> Self {
        ArrangeOptions {
            measure_count: DEFAULT_MEASURE_COUNT,
            max_chords: MAX_CHORDS,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            accompaniment_velocity: ACCOMPANIMENT_VELOCITY,
            melody_velocity: MELODY_VELOCITY,
        }
    }
}

/// Options that cannot produce a valid score.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrangeError {
    #[error("tempo {bpm} BPM is below the minimum of {min} BPM")]
    TempoTooSlow { bpm: u16, min: u16 },
    #[error("{count} measures exceeds the maximum of {max}")]
    TooManyMeasures { count: usize, max: usize },
    #[error("velocity {0} is above 127")]
    VelocityOutOfRange(u8),
}

impl ArrangeOptions {
    /// Check that the options fit the MIDI tempo field and the tick range.
    pub fn validate(&self) -> Result<(), ArrangeError> {
        if self.tempo_bpm < MIN_TEMPO_BPM {
            return Err(ArrangeError::TempoTooSlow {
                bpm: self.tempo_bpm,
                min: MIN_TEMPO_BPM,
            });
        }
        if self.measure_count > MAX_MEASURE_COUNT {
            return Err(ArrangeError::TooManyMeasures {
                count: self.measure_count,
                max: MAX_MEASURE_COUNT,
            });
        }
        for velocity in [self.accompaniment_velocity, self.melody_velocity] {
            if velocity > MAX_VELOCITY {
                return Err(ArrangeError::VelocityOutOfRange(velocity));
            }
        }
        Ok(())
    }
}

/// Split a whitespace-separated progression into symbols, keeping at most
/// `max_chords` of them.
pub fn parse_progression(input: &str, max_chords: usize) -> Vec<String> {
    input
        .split_whitespace()
        .take(max_chords)
        .map(str::to_string)
        .collect()
}

/// Accompaniment pitches for one measure: the whole voicing in table order.
pub fn accompaniment_line(voicing: &ChordVoicing) -> Vec<Pitch> {
    voicing.pitches().to_vec()
}

/// Melody pitches for one measure: the melody pattern over the voicing,
/// one octave up. Indices wrap if a voicing is shorter than the pattern.
pub fn melody_line(voicing: &ChordVoicing) -> Vec<Pitch> {
    let pitches = voicing.pitches();
    MELODY_PATTERN
        .iter()
        .map(|&idx| pitches[idx % pitches.len()].up_octaves(1))
        .collect()
}

/// Which hairpin, if any, starts at a measure.
pub fn hairpin_for(measure: usize) -> Option<Hairpin> {
    match measure % DYNAMICS_PERIOD {
        CRESCENDO_PHASE => Some(Hairpin::Crescendo),
        DIMINUENDO_PHASE => Some(Hairpin::Diminuendo),
        _ => None,
    }
}

/// Generate the piece with default options and the given measure count.
pub fn generate<S: AsRef<str>>(
    progression: &[S],
    measure_count: usize,
) -> Result<Score, ArrangeError> {
    generate_with(
        progression,
        &ArrangeOptions {
            measure_count,
            ..ArrangeOptions::default()
        },
    )
}

/// Generate the piece.
pub fn generate_with<S: AsRef<str>>(
    progression: &[S],
    options: &ArrangeOptions,
) -> Result<Score, ArrangeError> {
    options.validate()?;
    let chords = &progression[..progression.len().min(options.max_chords)];
    let mut score = Score::new(options.tempo_bpm, options.measure_count);

    if chords.is_empty() {
        warn!("Empty chord progression; no notes generated.");
        return Ok(score);
    }

    for measure in 0..options.measure_count {
        let symbol = normalize_symbol(chords[measure % chords.len()].as_ref());
        let Some(voicing) = chord::lookup(&symbol) else {
            warn!(measure, "{symbol} not found in chord table; measure skipped.");
            score.skipped.push(SkippedMeasure {
                measure,
                symbol: symbol.into_owned(),
            });
            continue;
        };
        debug!(measure, symbol = %symbol, "Arranging measure");

        // Fits in u32: measure_count <= MAX_MEASURE_COUNT.
        let start = measure as u32 * MEASURE_TICKS;
        push_even(
            &mut score.accompaniment,
            Part::Accompaniment,
            &accompaniment_line(voicing),
            start,
            measure,
            options.accompaniment_velocity,
        );

        if let Some(kind) = hairpin_for(measure) {
            score.dynamics.push(DynamicMarking {
                kind,
                offset: start,
                measure,
            });
        }

        push_even(
            &mut score.melody,
            Part::Melody,
            &melody_line(voicing),
            start,
            measure,
            options.melody_velocity,
        );
    }

    Ok(score)
}

/// Lay out `pitches` back to back so they exactly fill one measure.
fn push_even(
    notes: &mut Vec<NoteEvent>,
    part: Part,
    pitches: &[Pitch],
    start: u32,
    measure: usize,
    velocity: u8,
) {
    let step = MEASURE_TICKS / pitches.len() as u32;
    notes.extend(pitches.iter().enumerate().map(|(i, &pitch)| NoteEvent {
        part,
        pitch,
        offset: start + i as u32 * step,
        duration: step,
        velocity,
        measure,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ticks_to_quarters;
    use std::sync::{Arc, Mutex};

    fn default_progression() -> Vec<String> {
        parse_progression(DEFAULT_PROGRESSION, MAX_CHORDS)
    }

    #[test]
    fn test_parse_progression_truncates() {
        let chords = parse_progression("  C  G\tAm F C G Am F Dm E ", MAX_CHORDS);
        assert_eq!(chords, ["C", "G", "Am", "F", "C", "G", "Am", "F"]);
        assert!(parse_progression("   ", MAX_CHORDS).is_empty());
    }

    #[test]
    fn test_default_piece_counts() {
        let score = generate(&default_progression(), DEFAULT_MEASURE_COUNT).unwrap();
        assert_eq!(score.measure_count, 42);
        assert!(score.skipped.is_empty());
        assert_eq!(score.accompaniment.len(), 420);
        assert_eq!(score.melody.len(), 378);
        assert_eq!(score.tempo_bpm, 88);

        let stats = score.stats();
        assert_eq!(stats.crescendos, 6);
        assert_eq!(stats.diminuendos, 5);
    }

    #[test]
    fn test_dynamics_positions() {
        let score = generate(&default_progression(), DEFAULT_MEASURE_COUNT).unwrap();
        let at = |kind: Hairpin| -> Vec<usize> {
            score
                .dynamics
                .iter()
                .filter(|d| d.kind == kind)
                .map(|d| d.measure)
                .collect()
        };
        assert_eq!(at(Hairpin::Crescendo), [0, 8, 16, 24, 32, 40]);
        assert_eq!(at(Hairpin::Diminuendo), [4, 12, 20, 28, 36]);
        for marking in &score.dynamics {
            let first = score.measure_notes(Part::Melody, marking.measure).next().unwrap();
            assert_eq!(marking.offset, first.offset);
        }
    }

    #[test]
    fn test_measures_are_contiguous_and_exact() {
        let score = generate(&default_progression(), DEFAULT_MEASURE_COUNT).unwrap();
        for part in Part::ALL {
            for measure in 0..score.measure_count {
                let notes: Vec<_> = score.measure_notes(part, measure).collect();
                // Fits in u32: measure_count <= MAX_MEASURE_COUNT.
        let start = measure as u32 * MEASURE_TICKS;
                assert_eq!(notes[0].offset, start);
                for pair in notes.windows(2) {
                    assert_eq!(pair[0].end(), pair[1].offset);
                }
                let total: u32 = notes.iter().map(|n| n.duration).sum();
                assert_eq!(ticks_to_quarters(total), 3.0);
                assert_eq!(notes.last().unwrap().end(), start + MEASURE_TICKS);
            }
        }
    }

    #[test]
    fn test_velocities_and_parts() {
        let score = generate(&default_progression(), 4).unwrap();
        assert!(score.accompaniment.iter().all(|n| n.velocity == 90 && n.part == Part::Accompaniment));
        assert!(score.melody.iter().all(|n| n.velocity == 110 && n.part == Part::Melody));
    }

    #[test]
    fn test_melody_line_for_em() {
        let em = chord::lookup("Em").unwrap();
        let names: Vec<String> = melody_line(em).iter().map(|p| p.to_string()).collect();
        assert_eq!(names, ["E3", "B3", "G4", "E5", "B5", "G5", "B4", "E4", "G3"]);
        assert_eq!(accompaniment_line(em), em.pitches());
    }

    #[test]
    fn test_first_measure_pitches() {
        let score = generate(&["Em"], 1).unwrap();
        let accompaniment: Vec<String> =
            score.accompaniment.iter().map(|n| n.pitch.to_string()).collect();
        assert_eq!(accompaniment[0], "E2");
        assert_eq!(accompaniment[9], "E5");
        assert_eq!(score.accompaniment[1].offset, 144);
        assert_eq!(score.melody[1].offset, 160);
    }

    #[test]
    fn test_unknown_symbol_skips_only_its_measure() {
        let score = generate(&["C", "X", "G"], 6).unwrap();
        assert_eq!(
            score.skipped,
            [
                SkippedMeasure { measure: 1, symbol: "X".into() },
                SkippedMeasure { measure: 4, symbol: "X".into() },
            ]
        );
        assert_eq!(score.accompaniment.len(), 4 * 10);
        assert_eq!(score.melody.len(), 4 * 9);
        assert_eq!(score.measure_notes(Part::Accompaniment, 1).count(), 0);
        assert_eq!(score.measure_notes(Part::Melody, 1).count(), 0);

        // Neighbours keep their own timing and chords.
        let m2 = score.measure_notes(Part::Accompaniment, 2).next().unwrap();
        assert_eq!(m2.offset, 2 * MEASURE_TICKS);
        assert_eq!(m2.pitch.to_string(), "G2");
        assert_eq!(score.measure_notes(Part::Melody, 0).count(), 9);
    }

    #[test]
    fn test_skipped_hairpin_measure_loses_marking() {
        let score = generate(&["X", "C"], 10).unwrap();
        // Measures 0, 2, 4, 6, 8 are skipped; the hairpins at 0, 4 and 8 go with them.
        assert!(score.dynamics.is_empty());
        assert_eq!(score.skipped.len(), 5);
    }

    #[test]
    fn test_progression_beyond_max_chords_is_ignored() {
        let chords = ["C", "C", "C", "C", "C", "C", "C", "C", "X"];
        let score = generate(&chords, 42).unwrap();
        assert!(score.skipped.is_empty());
    }

    #[test]
    fn test_short_progression_cycles() {
        let score = generate(&["Am", "F"], 4).unwrap();
        let roots: Vec<String> = (0..4)
            .map(|m| score.measure_notes(Part::Accompaniment, m).next().unwrap().pitch.to_string())
            .collect();
        assert_eq!(roots, ["A2", "F2", "A2", "F2"]);
    }

    #[test]
    fn test_sharp_variants_resolve() {
        let score = generate(&["F\u{266F}m"], 1).unwrap();
        assert!(score.skipped.is_empty());
        assert_eq!(score.accompaniment[0].pitch.to_string(), "F#2");
    }

    #[test]
    fn test_empty_progression() {
        let empty: [&str; 0] = [];
        let score = generate(&empty, 42).unwrap();
        assert!(score.melody.is_empty());
        assert!(score.accompaniment.is_empty());
        assert_eq!(score.measure_count, 42);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(&default_progression(), DEFAULT_MEASURE_COUNT).unwrap();
        let b = generate(&default_progression(), DEFAULT_MEASURE_COUNT).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_vec(&a).unwrap(), serde_json::to_vec(&b).unwrap());
    }

    #[test]
    fn test_hairpin_for() {
        assert_eq!(hairpin_for(0), Some(Hairpin::Crescendo));
        assert_eq!(hairpin_for(4), Some(Hairpin::Diminuendo));
        assert_eq!(hairpin_for(12), Some(Hairpin::Diminuendo));
        assert_eq!(hairpin_for(16), Some(Hairpin::Crescendo));
        assert_eq!((0..8).filter_map(hairpin_for).count(), 2);
    }

    #[test]
    fn test_tempo_below_minimum_is_rejected() {
        for bpm in [0, 1, 3] {
            let options = ArrangeOptions { tempo_bpm: bpm, ..ArrangeOptions::default() };
            assert_eq!(
                generate_with(&["C"], &options),
                Err(ArrangeError::TempoTooSlow { bpm, min: MIN_TEMPO_BPM })
            );
        }
        let slowest = ArrangeOptions { tempo_bpm: MIN_TEMPO_BPM, ..ArrangeOptions::default() };
        assert_eq!(generate_with(&["C"], &slowest).unwrap().tempo_bpm, 4);
    }

    #[test]
    fn test_measure_count_boundary() {
        let too_many = ArrangeOptions {
            measure_count: MAX_MEASURE_COUNT + 1,
            ..ArrangeOptions::default()
        };
        assert_eq!(
            generate_with(&["C"], &too_many),
            Err(ArrangeError::TooManyMeasures {
                count: MAX_MEASURE_COUNT + 1,
                max: MAX_MEASURE_COUNT,
            })
        );
        assert!(generate(&["C"], 3_000_000).is_err());

        // The largest allowed piece still ends within the tick range.
        let at_limit = ArrangeOptions {
            measure_count: MAX_MEASURE_COUNT,
            ..ArrangeOptions::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
        let score = Score::new(DEFAULT_TEMPO_BPM, MAX_MEASURE_COUNT);
        assert_eq!(
            score.end_tick() as u64,
            MAX_MEASURE_COUNT as u64 * MEASURE_TICKS as u64
        );
    }

    #[test]
    fn test_velocity_out_of_range_is_rejected() {
        let options = ArrangeOptions { melody_velocity: 200, ..ArrangeOptions::default() };
        assert_eq!(options.validate(), Err(ArrangeError::VelocityOutOfRange(200)));
        assert_eq!(ArrangeOptions::default().validate(), Ok(()));
    }

    /// In-memory sink for the log output of one test.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unknown_symbol_is_logged() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let score = tracing::subscriber::with_default(subscriber, || {
            generate(&["C", "Xm7"], 4).unwrap()
        });

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let warnings: Vec<&str> = logs.lines().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 2, "{logs}");
        assert!(warnings[0].contains("Xm7 not found in chord table"));
        assert!(warnings[0].contains("measure=1"));
        assert!(warnings[1].contains("measure=3"));
        assert_eq!(score.skipped.len(), 2);
    }
}
