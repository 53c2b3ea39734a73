// MIDI output from scores.
//
// Converts a Score into a Standard MIDI File (SMF Format 1, multi-track):
// - track 0: conductor track with tempo and the 9/8 time signature;
// - track 1: melody on channel 0, carrying the hairpins as Marker events;
// - track 2: accompaniment on channel 1.
// Both voices are set to General MIDI program 0 (acoustic grand piano).
//
// Score ticks are already MIDI ticks (480 per quarter), so conversion is a
// matter of flattening notes into on/off events, sorting, and turning
// absolute ticks into deltas. At equal ticks note-offs sort before markers
// and markers before note-ons, so back-to-back notes never overlap.
//
// Uses the `midly` crate for MIDI writing.

use crate::score::{MIN_TEMPO_BPM, Part, Score, TICKS_PER_QUARTER};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;
use tracing::info;

/// General MIDI program for both voices (acoustic grand piano).
const PIANO_PROGRAM: u8 = 0;

/// MIDI clocks per metronome click: a dotted quarter in compound meter.
const CLOCKS_PER_CLICK: u8 = 36;

/// Notated 32nd notes per MIDI quarter note.
const THIRTY_SECONDS_PER_QUARTER: u8 = 8;

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("failed to write MIDI file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tempo {bpm} BPM does not fit the MIDI tempo field (minimum {min} BPM)")]
    TempoOutOfRange { bpm: u16, min: u16 },
    #[error("failed to encode MIDI data: {0}")]
    Encode(#[source] std::io::Error),
}

/// Convert a Score to MIDI and write to a file.
pub fn write_midi(score: &Score, path: &Path) -> Result<(), MidiError> {
    let buf = encode_midi(score)?;
    std::fs::write(path, &buf).map_err(|source| MidiError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), bytes = buf.len(), "Wrote MIDI file");
    Ok(())
}

/// Convert a Score to SMF bytes.
pub fn encode_midi(score: &Score) -> Result<Vec<u8>, MidiError> {
    let smf = score_to_smf(score)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(MidiError::Encode)?;
    Ok(buf)
}

/// Convert a Score to an in-memory SMF.
pub fn score_to_smf(score: &Score) -> Result<Smf<'static>, MidiError> {
    if score.tempo_bpm < MIN_TEMPO_BPM {
        return Err(MidiError::TempoOutOfRange {
            bpm: score.tempo_bpm,
            min: MIN_TEMPO_BPM,
        });
    }
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER as u16)),
    ));

    smf.tracks.push(conductor_track(score));
    for part in Part::ALL {
        smf.tracks.push(voice_track(score, part));
    }

    Ok(smf)
}

/// Track 0: tempo and meter.
fn conductor_track(score: &Score) -> Track<'static> {
    // Caller has checked tempo_bpm >= MIN_TEMPO_BPM, so this is < 2^24.
    let tempo_microseconds = 60_000_000 / score.tempo_bpm as u32;
    let ts = score.time_signature;
    vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(b"arabesque")),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
                ts.numerator,
                ts.denominator.trailing_zeros() as u8,
                CLOCKS_PER_CLICK,
                THIRTY_SECONDS_PER_QUARTER,
            )),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]
}

/// An event at an absolute tick, before delta conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimedEvent {
    // Variant order is the tie-break order at equal ticks.
    NoteOff { key: u8 },
    Marker { name: &'static str },
    NoteOn { key: u8, vel: u8 },
}

fn voice_track(score: &Score, part: Part) -> Track<'static> {
    let channel = u4::new(part.channel());
    let mut track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(part.name().as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::InstrumentName(b"Piano")),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(PIANO_PROGRAM),
                },
            },
        },
    ];

    let mut events: Vec<(u32, TimedEvent)> = Vec::new();
    for note in score.notes(part) {
        let key = note.pitch.midi();
        events.push((note.offset, TimedEvent::NoteOn { key, vel: note.velocity.min(127) }));
        events.push((note.end(), TimedEvent::NoteOff { key }));
    }
    if part == Part::Melody {
        for marking in &score.dynamics {
            events.push((marking.offset, TimedEvent::Marker { name: marking.kind.name() }));
        }
    }
    // Stable sort keeps score order among identical events.
    events.sort_by_key(|&(tick, event)| (tick, event));

    let mut last_tick: u32 = 0;
    for (tick, event) in events {
        let delta = u28::new(tick - last_tick);
        last_tick = tick;
        let kind = match event {
            TimedEvent::NoteOn { key, vel } => TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
            TimedEvent::NoteOff { key } => TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
            TimedEvent::Marker { name } => TrackEventKind::Meta(MetaMessage::Marker(name.as_bytes())),
        };
        track.push(TrackEvent { delta, kind });
    }

    // Trailing skipped measures still count toward the track length.
    track.push(TrackEvent {
        delta: u28::new(score.end_tick().saturating_sub(last_tick)),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}
