// MIDI -> WAV -> MP3 render chain.
//
// The intermediate WAV sits next to the MIDI file with the extension
// swapped. Each stage runs to completion before the next starts; the first
// error aborts the chain and nothing is cleaned up, so a failed encode
// leaves the WAV behind for inspection.

use crate::codec::Encoder;
use crate::error::RenderError;
use crate::synth::Synthesizer;
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs and outputs for one render.
#[derive(Debug, Clone)]
pub struct RenderJob<'a> {
    pub midi: &'a Path,
    pub sound_bank: &'a Path,
    pub output: &'a Path,
    /// Keep the intermediate WAV after a successful encode.
    pub keep_wav: bool,
}

/// Where the intermediate WAV for a MIDI file goes.
pub fn wav_path_for(midi: &Path) -> PathBuf {
    midi.with_extension("wav")
}

/// Render a MIDI file to MP3. Returns the path of the encoded file.
pub fn render_to_mp3(
    synth: &impl Synthesizer,
    encoder: &impl Encoder,
    job: &RenderJob<'_>,
) -> Result<PathBuf, RenderError> {
    let wav = wav_path_for(job.midi);
    synth.render(job.midi, job.sound_bank, &wav)?;
    encoder.encode(&wav, job.output)?;

    if !job.keep_wav {
        std::fs::remove_file(&wav).map_err(|source| RenderError::Io {
            path: wav.clone(),
            source,
        })?;
    }
    info!(output = %job.output.display(), "Render complete");
    Ok(job.output.to_path_buf())
}
