// Errors from rendering MIDI to audio.
//
// Missing inputs are reported before any tool is looked up. Lookup, spawn
// and exit-status failures name the program that caused them.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Failure at the rendering boundary. All variants are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("sound bank not found: {0}")]
    SoundBankMissing(PathBuf),

    #[error("input file not found: {0}")]
    InputMissing(PathBuf),

    #[error("`{program}` not found on PATH")]
    ToolNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    ToolFailed { program: String, status: ExitStatus },

    #[error("`{program}` reported success but did not produce {output}")]
    NoOutput { program: String, output: PathBuf },

    #[error("file system error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
