//! Project root discovery.
//!
//! Patches are expressed relative to a project directory that lives inside a
//! container build context, e.g. `docker/hypermodern-python/`. The build
//! context (`docker/`) holds the Dockerfile; the project directory is where
//! `patch -p1` is run inside the image.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::{DEFAULT_CONTAINER_DIR, DEFAULT_PROJECT_DIR};
use crate::error::{DeriveError, Result};

/// Name pair an ancestor directory must match to be the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMatcher {
    /// Name of the project directory itself.
    pub project_dir: String,
    /// Name of the project directory's parent, the build context.
    pub container_dir: String,
}

impl RootMatcher {
    pub fn new(project_dir: impl Into<String>, container_dir: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            container_dir: container_dir.into(),
        }
    }

    fn matches(&self, candidate: &Path) -> bool {
        let name_is = |path: &Path, expected: &str| {
            path.file_name()
                .map(|name| name == expected)
                .unwrap_or(false)
        };
        name_is(candidate, &self.project_dir)
            && candidate
                .parent()
                .map(|parent| name_is(parent, &self.container_dir))
                .unwrap_or(false)
    }
}

impl Default for RootMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_DIR, DEFAULT_CONTAINER_DIR)
    }
}

/// Directories located by [`find_project_root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPaths {
    /// Build context; parent of `project_dir`.
    pub root_dir: PathBuf,
    /// Working directory for the diff; patches are relative to it.
    pub project_dir: PathBuf,
}

/// Walks the ancestors of `path` outward and returns the first one accepted
/// by `matcher`. The path itself is never a candidate.
pub fn find_project_root(path: &Path, matcher: &RootMatcher) -> Result<RootPaths> {
    for candidate in path.ancestors().skip(1) {
        if !matcher.matches(candidate) {
            continue;
        }
        // matches() guarantees a parent exists
        if let Some(root_dir) = candidate.parent() {
            debug!(
                project_dir = %candidate.display(),
                root_dir = %root_dir.display(),
                "Found project root"
            );
            return Ok(RootPaths {
                root_dir: root_dir.to_path_buf(),
                project_dir: candidate.to_path_buf(),
            });
        }
    }

    error!(
        path = %path.display(),
        project_dir = %matcher.project_dir,
        container_dir = %matcher.container_dir,
        "No ancestor matches the project root pattern"
    );
    Err(DeriveError::ProjectRootNotFound {
        path: path.to_path_buf(),
    })
}
