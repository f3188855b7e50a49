//! High-level pipeline: versioned file → patch file → build statements.
//!
//! For every input this module:
//!   - Validates the version suffix and resolves the path
//!   - Locates the project directory and its build context
//!   - Diffs the previous version against the current one inside the project directory
//!   - Rewrites the diff headers to name the canonical file and writes `<input>.patch`
//!   - Prints the `COPY`/`RUN patch` statements, or appends them to the build file
//!
//! # Error Handling
//! Fail-fast: the first failing input aborts a batch. Patches and statements
//! produced for earlier inputs stay where they were written; a batch is not
//! atomic.
//!
//! # Navigation
//! - Entrypoints: [`Deriver::derive`], [`Deriver::derive_all`]
//! - Output: [`PatchArtifact`]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::build_file::{append_statements, BuildStatements};
use crate::config::DeriveConfig;
use crate::diff::{rewrite_headers, DiffTool};
use crate::error::{DeriveError, Result};
use crate::root::{find_project_root, RootPaths};
use crate::version::VersionedFile;

/// Where the build statements go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Write them to the caller's output stream.
    Print,
    /// Append them to the build file in the build context.
    Append,
}

impl From<bool> for Emit {
    fn from(append: bool) -> Self {
        if append {
            Emit::Append
        } else {
            Emit::Print
        }
    }
}

/// A patch written for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchArtifact {
    pub source: VersionedFile,
    pub roots: RootPaths,
    /// `<resolved input>.patch`
    pub path: PathBuf,
    /// Header-rewritten diff, exactly as written to `path`.
    pub text: String,
    pub statements: BuildStatements,
    /// Build file the statements belong to.
    pub build_file: PathBuf,
}

pub struct Deriver<D> {
    config: DeriveConfig,
    diff: D,
}

impl<D: DiffTool> Deriver<D> {
    pub fn new(config: DeriveConfig, diff: D) -> Self {
        Self { config, diff }
    }

    /// Derives and writes the patch for `path`, then emits its statements.
    pub fn derive(&self, path: &Path, emit: Emit, out: &mut dyn Write) -> Result<PatchArtifact> {
        let artifact = self.write_patch(path)?;
        self.emit(&artifact, emit, out)?;
        Ok(artifact)
    }

    /// Processes `paths` in order, stopping at the first failure.
    pub fn derive_all<P: AsRef<Path>>(
        &self,
        paths: &[P],
        emit: Emit,
        out: &mut dyn Write,
    ) -> Result<Vec<PatchArtifact>> {
        let mut artifacts = Vec::with_capacity(paths.len());
        for path in paths {
            artifacts.push(self.derive(path.as_ref(), emit, out)?);
        }
        info!(count = artifacts.len(), "All patches derived");
        Ok(artifacts)
    }

    /// Everything up to and including writing the `.patch` file.
    pub fn write_patch(&self, path: &Path) -> Result<PatchArtifact> {
        info!(path = %path.display(), "Deriving patch");

        let source = VersionedFile::resolve(path)?;
        let roots = find_project_root(source.path(), &self.config.matcher())?;

        let canonical = relative_to(&source.canonical(), &roots.project_dir, path)?;
        let previous = relative_to(&source.previous(), &roots.project_dir, path)?;
        let current = relative_to(source.path(), &roots.project_dir, path)?;

        let diff = self
            .diff
            .compute_diff(&previous, &current, &roots.project_dir)
            .map_err(|e| {
                error!(error = %e, path = %path.display(), "Diff computation failed");
                DeriveError::Diff {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;

        if diff.is_empty() {
            if self.config.strict {
                error!(path = %path.display(), "Empty diff in strict mode");
                return Err(DeriveError::EmptyDiff {
                    path: path.to_path_buf(),
                });
            }
            warn!(path = %path.display(), previous = %previous.display(), "Diff is empty, writing empty patch");
        } else if !diff.has_unified_headers() {
            error!(path = %path.display(), output = %diff.as_str(), "Diff output has no unified headers");
            return Err(DeriveError::MalformedDiff {
                path: path.to_path_buf(),
            });
        }

        let text = rewrite_headers(
            diff.as_str(),
            &previous.to_string_lossy(),
            &current.to_string_lossy(),
            &canonical.to_string_lossy(),
        );

        let patch_path = source.patch_path();
        fs::write(&patch_path, &text).map_err(|e| {
            error!(error = ?e, path = %patch_path.display(), "Failed to write patch file");
            DeriveError::io(&patch_path, e)
        })?;
        info!(patch = %patch_path.display(), bytes = text.len(), "Wrote patch file");

        let patch_rel = relative_to(&patch_path, &roots.root_dir, path)?;
        let statements = BuildStatements::new(
            &patch_rel,
            &self.config.container_patch,
            self.config.strip_level,
        );
        let build_file = roots.root_dir.join(&self.config.build_file);

        Ok(PatchArtifact {
            source,
            roots,
            path: patch_path,
            text,
            statements,
            build_file,
        })
    }

    fn emit(&self, artifact: &PatchArtifact, emit: Emit, out: &mut dyn Write) -> Result<()> {
        match emit {
            Emit::Append => append_statements(&artifact.build_file, &artifact.statements),
            Emit::Print => write!(out, "{}", artifact.statements)
                .and_then(|_| out.flush())
                .map_err(|e| DeriveError::io(artifact.source.path(), e)),
        }
    }
}

/// `path` relative to `base`; failure means the input escaped its root.
fn relative_to(path: &Path, base: &Path, input: &Path) -> Result<PathBuf> {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| DeriveError::ProjectRootNotFound {
            path: input.to_path_buf(),
        })
}
