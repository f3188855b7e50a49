//! Numbered file versions: `greeting.01`, `greeting.02`, ...
//!
//! A versioned file is an edit of its canonical file (`greeting`). Version 1
//! is diffed against the canonical file itself, version `n` against `n - 1`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DeriveError, Result};

/// A resolved path whose final suffix encodes a version >= 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedFile {
    path: PathBuf,
    stem: String,
    version: u32,
}

/// Parses the trailing suffix of `path` as a positive integer.
pub fn parse_version(path: &Path) -> Result<u32> {
    let invalid = || DeriveError::InvalidVersion {
        path: path.to_path_buf(),
    };

    let suffix = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(invalid)?;
    let version: i64 = suffix.trim().parse().map_err(|_| invalid())?;
    if version < 1 {
        return Err(invalid());
    }
    u32::try_from(version).map_err(|_| invalid())
}

impl VersionedFile {
    /// Validates the version suffix, then resolves `path` to an absolute path.
    ///
    /// The version check happens before any filesystem access. Symlinks are
    /// resolved when the file exists; a missing file is absolutised lexically.
    pub fn resolve(path: &Path) -> Result<Self> {
        let version = parse_version(path)?;
        let resolved = fs::canonicalize(path)
            .or_else(|_| std::path::absolute(path))
            .map_err(|e| DeriveError::io(path, e))?;
        debug!(input = %path.display(), resolved = %resolved.display(), version, "Resolved versioned file");
        Self::new(resolved, version)
    }

    /// Builds a versioned file from an already absolute path.
    pub fn new(path: PathBuf, version: u32) -> Result<Self> {
        if version < 1 {
            return Err(DeriveError::InvalidVersion { path });
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => return Err(DeriveError::InvalidFileName { path }),
        };
        Ok(Self {
            path,
            stem,
            version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Same directory and stem, no version suffix.
    pub fn canonical(&self) -> PathBuf {
        self.dir().join(&self.stem)
    }

    /// The file this version is diffed against.
    pub fn previous(&self) -> PathBuf {
        if self.version == 1 {
            self.canonical()
        } else {
            self.dir()
                .join(format!("{}.{:02}", self.stem, self.version - 1))
        }
    }

    /// `<resolved path>.patch`
    pub fn patch_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".patch");
        PathBuf::from(name)
    }
}
