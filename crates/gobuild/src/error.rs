//! Error types for gobuild

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when invoking the Go toolchain.
#[derive(Debug, Error)]
pub enum Error {
    /// The go binary could not be started, or a subcommand exited non-zero.
    #[error("'go {subcommand}' failed: {output}")]
    ToolchainExecution {
        /// The subcommand that was invoked (`version`, `build`, ...).
        subcommand: String,
        /// Combined stdout/stderr captured from the subprocess.
        output: String,
        /// Launch error, when the process could not be started at all.
        #[source]
        source: Option<std::io::Error>,
    },

    /// `go version` printed output we cannot extract a version token from.
    #[error("unknown go version, tool returned weird output for 'go version': {output}")]
    MalformedVersionOutput { output: String },

    /// `go build` failed for a source directory.
    #[error("error building go package in {}: {output}", .dir.display())]
    BuildExecution {
        /// Directory that was being built.
        dir: PathBuf,
        /// Combined stdout/stderr captured from the build subprocess.
        output: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Combined subprocess output attached to this error. Empty when the
    /// process never started.
    pub fn captured_output(&self) -> &str {
        match self {
            Error::ToolchainExecution { output, .. }
            | Error::MalformedVersionOutput { output }
            | Error::BuildExecution { output, .. } => output,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
