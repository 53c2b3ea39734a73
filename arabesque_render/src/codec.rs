// WAV -> MP3 encoding through `ffmpeg`.

use crate::error::RenderError;
use crate::tool;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use tracing::info;

/// Transcodes a WAV file into a compressed audio file.
pub trait Encoder {
    fn encode(&self, wav: &Path, output: &Path) -> Result<(), RenderError>;
}

/// Settings for the `ffmpeg` executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ffmpeg {
    pub program: String,
    /// Audio bitrate, in ffmpeg's notation (e.g. "192k").
    pub bitrate: String,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Ffmpeg {
            program: "ffmpeg".to_string(),
            bitrate: "192k".to_string(),
        }
    }
}

impl Ffmpeg {
    pub fn command_args(&self, wav: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "wav".into(),
            "-i".into(),
            wav.into(),
            "-f".into(),
            "mp3".into(),
            "-b:a".into(),
            self.bitrate.as_str().into(),
            output.into(),
        ]
    }
}

impl Encoder for Ffmpeg {
    fn encode(&self, wav: &Path, output: &Path) -> Result<(), RenderError> {
        if !wav.is_file() {
            return Err(RenderError::InputMissing(wav.to_path_buf()));
        }
        info!(wav = %wav.display(), output = %output.display(), "Encoding MP3");
        tool::run(&self.program, &self.command_args(wav, output))?;
        tool::expect_output(&self.program, output)
    }
}
