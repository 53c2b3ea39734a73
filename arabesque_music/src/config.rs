// Run configuration, loaded from JSON.
//
// `ArrangementConfig` gathers everything a run needs: the progression, the
// tunable arrangement options, output paths, the SoundFont, and settings for
// the external synthesizer and encoder. Every field has a default, so a
// config file only needs the keys it changes and an empty object `{}` is a
// valid config. CLI flags are applied on top by `main.rs`.

use crate::arrange::{ArrangeError, ArrangeOptions, DEFAULT_PROGRESSION};
use arabesque_render::{Ffmpeg, FluidSynth};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config {path} is out of range: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ArrangeError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangementConfig {
    /// Whitespace-separated chord symbols.
    pub progression: String,
    pub arrangement: ArrangeOptions,
    pub midi_path: PathBuf,
    pub mp3_path: PathBuf,
    /// SoundFont handed to the synthesizer.
    pub sound_font: PathBuf,
    /// Keep the intermediate WAV file after encoding.
    pub keep_wav: bool,
    pub synth: FluidSynth,
    pub encoder: Ffmpeg,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        ArrangementConfig {
            progression: DEFAULT_PROGRESSION.to_string(),
            arrangement: ArrangeOptions::default(),
            midi_path: PathBuf::from("output_arabesque.mid"),
            mp3_path: PathBuf::from("output_arabesque.mp3"),
            sound_font: PathBuf::from("GeneralUser.sf2"),
            keep_wav: true,
            synth: FluidSynth::default(),
            encoder: Ffmpeg::default(),
        }
    }
}

impl ArrangementConfig {
    /// Load a config from a JSON file. Missing keys take their defaults;
    /// the arrangement options are range-checked before returning.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .arrangement
            .validate()
            .map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
