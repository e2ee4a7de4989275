//! Application paths (window state, log file).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "cutstep";

/// Files whose presence in the working directory makes it the config dir
const LOCAL_MARKERS: [&str; 2] = ["cutstep.json", "cutstep.log"];

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (CUTSTEP_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| {
            std::env::var("CUTSTEP_CONFIG_DIR")
                .ok()
                .map(PathBuf::from)
        });

        Self { config_dir }
    }
}

/// Path of a config file (window state).
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. CUTSTEP_CONFIG_DIR environment variable
/// 3. Working directory IF cutstep.json or cutstep.log already exist there
/// 4. Platform config directory from dirs-next
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    pick_dir(config, std::env::current_dir().ok(), dirs_next::config_dir()).join(name)
}

/// Path of a data file (log). Same priority as [`config_file`], but the
/// platform fallback is the data directory.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    pick_dir(config, std::env::current_dir().ok(), dirs_next::data_dir()).join(name)
}

/// Create the config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    for file in [config_file("x", config), data_file("x", config)] {
        let Some(dir) = file.parent() else { continue };
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_config_files(dir: &Path) -> bool {
    LOCAL_MARKERS.iter().any(|f| dir.join(f).exists())
}

fn pick_dir(config: &PathConfig, cwd: Option<PathBuf>, platform: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Some(cwd) = cwd.filter(|d| has_local_config_files(d)) {
        return cwd;
    }

    platform
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}
