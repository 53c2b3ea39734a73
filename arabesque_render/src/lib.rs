// Audio rendering for generated MIDI files.
//
// Both stages are delegated to external programs: a SoundFont synthesizer
// turns MIDI into a WAV file, and an encoder turns the WAV into MP3. This
// crate only locates the programs, builds their command lines, and reports
// failures. Nothing is retried; every error aborts the render.
//
// Architecture:
// - synth.rs: `Synthesizer` trait and the `fluidsynth` driver
// - codec.rs: `Encoder` trait and the `ffmpeg` driver
// - pipeline.rs: MIDI -> WAV -> MP3 chaining
// - tool.rs: Executable lookup and invocation
// - error.rs: `RenderError`

pub mod codec;
pub mod error;
pub mod pipeline;
pub mod synth;
mod tool;

pub use codec::{Encoder, Ffmpeg};
pub use error::RenderError;
pub use pipeline::{RenderJob, render_to_mp3, wav_path_for};
pub use synth::{FluidSynth, Synthesizer};
