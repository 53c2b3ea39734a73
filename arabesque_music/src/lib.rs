// Arabesque arrangement generator.
//
// Turns a chord progression into a 42-measure piano piece: a ten-note
// arpeggio accompaniment under a nine-note melody figure, in 9/8 at 88 BPM,
// with a crescendo every eight measures and a diminuendo halfway between.
// The piece is written as a Standard MIDI File and can then be rendered to
// MP3 through `arabesque_render`.
//
// Architecture:
// - pitch.rs: MIDI pitches with scientific pitch names (compile-time parsing)
// - chord.rs: The 24-symbol chord table and symbol normalization
// - score.rs: Score representation (two voices of timed notes, hairpins)
// - arrange.rs: The measure-by-measure generator
// - midi.rs: MIDI file output from completed scores
// - config.rs: JSON run configuration
//
// Generation is deterministic: identical input gives identical output.

pub mod arrange;
pub mod chord;
pub mod config;
pub mod midi;
pub mod pitch;
pub mod score;
