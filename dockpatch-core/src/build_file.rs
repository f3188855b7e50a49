//! Build-description statements that ship a patch into an image.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::{error, info};

use crate::error::{DeriveError, Result};

/// The `COPY` + `RUN patch` pair for one patch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStatements {
    pub copy: String,
    pub apply: String,
}

impl BuildStatements {
    /// `patch_rel` is the patch path relative to the build context.
    pub fn new(patch_rel: &Path, container_patch: &str, strip_level: u32) -> Self {
        Self {
            copy: format!("COPY {} {}", patch_rel.display(), container_patch),
            apply: format!("RUN patch -p{} < {}", strip_level, container_patch),
        }
    }
}

impl fmt::Display for BuildStatements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.copy)?;
        writeln!(f, "{}", self.apply)
    }
}

/// Appends `statements` to the build file, creating it when missing.
///
/// The handle is closed before returning, so a later failure in the same
/// batch never leaves the file open.
pub fn append_statements(build_file: &Path, statements: &BuildStatements) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(build_file)
        .map_err(|e| {
            error!(error = ?e, path = %build_file.display(), "Failed to open build file for append");
            DeriveError::io(build_file, e)
        })?;

    file.write_all(statements.to_string().as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| {
            error!(error = ?e, path = %build_file.display(), "Failed to append to build file");
            DeriveError::io(build_file, e)
        })?;

    info!(path = %build_file.display(), copy = %statements.copy, "Appended statements to build file");
    Ok(())
}
