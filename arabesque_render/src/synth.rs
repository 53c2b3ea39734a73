// SoundFont synthesis: MIDI file + sound bank -> WAV file.
//
// `FluidSynth` drives the `fluidsynth` command-line program in
// non-interactive fast-render mode. The sound bank is checked before the
// program is looked up, so a bad SoundFont path is reported as such rather
// than as an opaque tool failure.

use crate::error::RenderError;
use crate::tool;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use tracing::info;

/// Renders a MIDI file to a WAV file using a sound bank.
pub trait Synthesizer {
    fn render(&self, midi: &Path, sound_bank: &Path, wav: &Path) -> Result<(), RenderError>;
}

/// Settings for the `fluidsynth` executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidSynth {
    /// Program name or path.
    pub program: String,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Master gain (fluidsynth's default is 0.2).
    pub gain: f32,
}

impl Default for FluidSynth {
    fn default() -> Self {
        FluidSynth {
            program: "fluidsynth".to_string(),
            sample_rate: 44_100,
            gain: 0.2,
        }
    }
}

impl FluidSynth {
    /// Command-line arguments for one render.
    pub fn command_args(&self, midi: &Path, sound_bank: &Path, wav: &Path) -> Vec<OsString> {
        vec![
            "-ni".into(),
            "-g".into(),
            self.gain.to_string().into(),
            "-F".into(),
            wav.into(),
            "-r".into(),
            self.sample_rate.to_string().into(),
            sound_bank.into(),
            midi.into(),
        ]
    }
}

impl Synthesizer for FluidSynth {
    fn render(&self, midi: &Path, sound_bank: &Path, wav: &Path) -> Result<(), RenderError> {
        if !sound_bank.is_file() {
            return Err(RenderError::SoundBankMissing(sound_bank.to_path_buf()));
        }
        if !midi.is_file() {
            return Err(RenderError::InputMissing(midi.to_path_buf()));
        }
        info!(midi = %midi.display(), sound_bank = %sound_bank.display(), "Synthesizing WAV");
        tool::run(&self.program, &self.command_args(midi, sound_bank, wav))?;
        tool::expect_output(&self.program, wav)
    }
}
