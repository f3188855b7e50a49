use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diff::CommandDiff;
use crate::root::RootMatcher;

pub const DEFAULT_PROJECT_DIR: &str = "hypermodern-python";
pub const DEFAULT_CONTAINER_DIR: &str = "docker";
pub const DEFAULT_BUILD_FILE: &str = "Dockerfile";
pub const DEFAULT_CONTAINER_PATCH: &str = "/tmp/patch";
pub const DEFAULT_STRIP_LEVEL: u32 = 1;

/// Settings for a derivation run. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    /// Expected name of the project directory.
    pub project_dir: String,
    /// Expected name of the project directory's parent (the build context).
    pub container_dir: String,
    /// Build-description file inside the build context.
    pub build_file: String,
    /// Where the patch is copied to inside the image.
    pub container_patch: String,
    pub strip_level: u32,
    /// Diff program followed by its leading arguments.
    pub diff_command: Vec<String>,
    /// Treat an empty diff as an error instead of writing an empty patch.
    pub strict: bool,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            project_dir: DEFAULT_PROJECT_DIR.to_string(),
            container_dir: DEFAULT_CONTAINER_DIR.to_string(),
            build_file: DEFAULT_BUILD_FILE.to_string(),
            container_patch: DEFAULT_CONTAINER_PATCH.to_string(),
            strip_level: DEFAULT_STRIP_LEVEL,
            diff_command: vec!["diff".to_string(), "-u".to_string()],
            strict: false,
        }
    }
}

impl DeriveConfig {
    pub fn matcher(&self) -> RootMatcher {
        RootMatcher::new(self.project_dir.clone(), self.container_dir.clone())
    }

    /// The configured diff command, or `diff -u` when the list is empty.
    pub fn diff_tool(&self) -> CommandDiff {
        CommandDiff::from_command(&self.diff_command).unwrap_or_default()
    }

    pub fn trace_loaded(&self) {
        info!(
            project_dir = %self.project_dir,
            container_dir = %self.container_dir,
            build_file = %self.build_file,
            strict = self.strict,
            "Loaded DeriveConfig"
        );
        debug!(?self, "DeriveConfig loaded (full debug)");
    }
}
