/// `load_config` module: loads the optional YAML config file and applies environment overrides
/// on top of it, producing the core [`DeriveConfig`].
///
/// # Responsibilities
/// - Parse a user-supplied YAML file (every key optional) into `DeriveConfig`
/// - Apply `DOCKPATCH_*` environment overrides, which win over the file
/// - Report failures with the file path or variable name, for the CLI to surface
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
///
/// Accepted keys: `project_dir`, `container_dir`, `build_file`, `container_patch`,
/// `strip_level`, `diff_command`, `strict`.
use anyhow::Result;
use dockpatch_core::DeriveConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const ENV_PROJECT_DIR: &str = "DOCKPATCH_PROJECT_DIR";
pub const ENV_CONTAINER_DIR: &str = "DOCKPATCH_CONTAINER_DIR";
pub const ENV_BUILD_FILE: &str = "DOCKPATCH_BUILD_FILE";
pub const ENV_STRIP_LEVEL: &str = "DOCKPATCH_STRIP_LEVEL";

/// Loads `path` (if given) and applies environment overrides.
/// Without a file, starts from the defaults.
pub fn load_config(path: Option<&Path>) -> Result<DeriveConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using defaults");
            DeriveConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;

    if config.diff_command.is_empty() {
        error!("diff_command must name a program");
        anyhow::bail!("diff_command must name a program");
    }

    info!(
        project_dir = %config.project_dir,
        container_dir = %config.container_dir,
        "Config loaded and merged successfully"
    );
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<DeriveConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    // An empty file deserialises to `null`, which means "all defaults".
    if content.trim().is_empty() {
        return Ok(DeriveConfig::default());
    }

    match serde_yaml::from_str::<DeriveConfig>(&content) {
        Ok(config) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(config)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path))
        }
    }
}

fn apply_env_overrides(config: &mut DeriveConfig) -> Result<()> {
    if let Ok(value) = std::env::var(ENV_PROJECT_DIR) {
        info!(var = ENV_PROJECT_DIR, value = %value, "Overriding project_dir from env");
        config.project_dir = value;
    }
    if let Ok(value) = std::env::var(ENV_CONTAINER_DIR) {
        info!(var = ENV_CONTAINER_DIR, value = %value, "Overriding container_dir from env");
        config.container_dir = value;
    }
    if let Ok(value) = std::env::var(ENV_BUILD_FILE) {
        info!(var = ENV_BUILD_FILE, value = %value, "Overriding build_file from env");
        config.build_file = value;
    }
    if let Ok(value) = std::env::var(ENV_STRIP_LEVEL) {
        config.strip_level = match value.parse::<u32>() {
            Ok(level) => level,
            Err(e) => {
                error!(error = ?e, var = ?value, "{} must be a valid integer", ENV_STRIP_LEVEL);
                anyhow::bail!("{ENV_STRIP_LEVEL} must be a valid integer: {e}");
            }
        };
    }
    Ok(())
}
