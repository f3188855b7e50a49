//! Unified diff computation and header rewriting.
//!
//! The diff itself is produced by an external program behind the [`DiffTool`]
//! trait, so derivation can be exercised against a mock in tests and against
//! `diff -u` in production.

use std::path::Path;
use std::process::Command;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, error, warn};

use crate::error::SubprocessError;

/// Captured standard output of a diff run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffText(String);

impl DiffText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the first two lines are the `---`/`+++` file headers.
    pub fn has_unified_headers(&self) -> bool {
        let mut lines = self.0.lines();
        matches!(
            (lines.next(), lines.next()),
            (Some(old), Some(new)) if old.starts_with("--- ") && new.starts_with("+++ ")
        )
    }
}

/// Computes a unified diff between two files.
///
/// `old` and `new` are passed through verbatim (normally relative to `cwd`),
/// because the header rewrite looks for exactly that text.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait DiffTool {
    fn compute_diff(&self, old: &Path, new: &Path, cwd: &Path)
        -> Result<DiffText, SubprocessError>;
}

/// Runs an external diff program, `diff -u` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDiff {
    program: String,
    args: Vec<String>,
}

impl CommandDiff {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits `[program, args...]`. Returns `None` for an empty command.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandDiff {
    fn default() -> Self {
        Self::new("diff", vec!["-u".to_string()])
    }
}

impl DiffTool for CommandDiff {
    fn compute_diff(
        &self,
        old: &Path,
        new: &Path,
        cwd: &Path,
    ) -> Result<DiffText, SubprocessError> {
        debug!(
            program = %self.program,
            args = ?self.args,
            old = %old.display(),
            new = %new.display(),
            cwd = %cwd.display(),
            "Running diff"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(old)
            .arg(new)
            .current_dir(cwd)
            .output()
            .map_err(|e| {
                error!(error = ?e, program = %self.program, "Failed to launch diff process");
                SubprocessError::Spawn {
                    program: self.program.clone(),
                    source: e,
                }
            })?;

        match output.status.code() {
            Some(0) => debug!("Files are identical"),
            Some(1) => debug!("Files differ"),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                error!(status = ?output.status, stderr = %stderr, "Diff exited with trouble status");
                return Err(SubprocessError::Failed {
                    program: self.program.clone(),
                    status: output.status,
                    stderr,
                });
            }
        }

        match String::from_utf8(output.stdout) {
            Ok(text) => Ok(DiffText::new(text)),
            Err(e) => {
                warn!(error = ?e, "Diff output is not valid UTF-8");
                Err(SubprocessError::Utf8 {
                    program: self.program.clone(),
                })
            }
        }
    }
}

/// Points the `---`/`+++` headers at the canonical file.
///
/// In the first line every occurrence of `old` becomes `a/<canonical>`, in the
/// second every occurrence of `new` becomes `b/<canonical>`. All other lines,
/// and all line endings, are kept as they are.
pub fn rewrite_headers(diff: &str, old: &str, new: &str, canonical: &str) -> String {
    let mut out = String::with_capacity(diff.len() + 2 * canonical.len());
    for (index, line) in diff.split_inclusive('\n').enumerate() {
        match index {
            0 => out.push_str(&line.replace(old, &format!("a/{canonical}"))),
            1 => out.push_str(&line.replace(new, &format!("b/{canonical}"))),
            _ => out.push_str(line),
        }
    }
    out
}
