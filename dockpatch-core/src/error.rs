//! Error types for patch derivation.
//!
//! Every variant carries the input path it was raised for, so the CLI can
//! report which file in a batch stopped the run.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure of the external diff computation.
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `diff` exits 0 for identical inputs and 1 for differences; anything
    /// else means it could not compare the files.
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{program}` produced non UTF-8 output")]
    Utf8 { program: String },
}

#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("version must be a positive integer: {}", path.display())]
    InvalidVersion { path: PathBuf },

    #[error("cannot find root: {}", path.display())]
    ProjectRootNotFound { path: PathBuf },

    #[error("diff failed for {}: {source}", path.display())]
    Diff {
        path: PathBuf,
        #[source]
        source: SubprocessError,
    },

    /// Non-empty output whose first two lines are not `---`/`+++` headers,
    /// e.g. "Binary files ... differ".
    #[error("diff output is not a unified diff for {}", path.display())]
    MalformedDiff { path: PathBuf },

    #[error("file name is not valid UTF-8: {}", path.display())]
    InvalidFileName { path: PathBuf },

    #[error("diff is empty for {}", path.display())]
    EmptyDiff { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeriveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeriveError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeriveError>;
