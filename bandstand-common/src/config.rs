//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service owns on disk: the SQLite
//! database and the media directory for photo files. Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `BANDSTAND_ROOT_FOLDER` environment variable
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable consulted during root folder resolution
pub const ROOT_FOLDER_ENV: &str = "BANDSTAND_ROOT_FOLDER";

/// Compiled-in platform defaults, used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            dirs::data_local_dir()
                .map(|d| d.join("bandstand"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/bandstand"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("bandstand"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/bandstand"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("bandstand"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\bandstand"))
        } else {
            PathBuf::from("./bandstand_data")
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Optional on-disk configuration file
///
/// Looked up at `~/.config/bandstand/config.toml` (per-platform config
/// dir), falling back to `/etc/bandstand/config.toml` on Linux. A missing
/// or unparseable file is not an error — resolution falls through to the
/// compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
}

impl TomlConfig {
    /// Load the config file if one exists; Default otherwise
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<TomlConfig>(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Ignoring malformed config file {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Could not read config file {}: {}", path.display(), e);
                }
            }
        }
        TomlConfig::default()
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("bandstand").join("config.toml"));
        }
        if cfg!(target_os = "linux") {
            paths.push(PathBuf::from("/etc/bandstand/config.toml"));
        }
        paths
    }
}

/// Resolves the root folder following the 4-tier priority order
#[derive(Debug)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = TomlConfig::load().root_folder {
            return path;
        }

        // Priority 4: OS-dependent compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares a resolved root folder for use
#[derive(Debug)]
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder and media directory if they do not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.media_path())?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root.join("bandstand.db")
    }

    /// Directory that photo image files are served from
    pub fn media_path(&self) -> PathBuf {
        self.root.join("media")
    }
}
