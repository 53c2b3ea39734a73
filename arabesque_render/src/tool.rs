// Executable lookup and invocation for the external collaborators.

use crate::error::RenderError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Resolve `program` on PATH (or as a path) and run it with `args`,
/// inheriting stdout/stderr. A non-zero exit status is an error.
pub(crate) fn run(program: &str, args: &[OsString]) -> Result<(), RenderError> {
    let executable = which::which(program).map_err(|source| RenderError::ToolNotFound {
        program: program.to_string(),
        source,
    })?;
    debug!(executable = %executable.display(), ?args, "Running external tool");

    let status = Command::new(&executable)
        .args(args)
        .status()
        .map_err(|source| RenderError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(RenderError::ToolFailed {
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}

/// Check that a tool left its output file behind.
pub(crate) fn expect_output(program: &str, output: &Path) -> Result<(), RenderError> {
    if output.is_file() {
        Ok(())
    } else {
        Err(RenderError::NoOutput {
            program: program.to_string(),
            output: output.to_path_buf(),
        })
    }
}
