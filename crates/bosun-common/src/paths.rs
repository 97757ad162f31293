//! Standard filesystem paths for bosun.

use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Configuration directory override, taken from `BOSUN_CONFIG_DIR` when set.
pub static BOSUN_CONFIG_DIR: Lazy<Option<PathBuf>> =
    Lazy::new(|| std::env::var("BOSUN_CONFIG_DIR").map(PathBuf::from).ok());

/// Name of the global configuration file.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the per-project configuration file.
pub const PROJECT_FILE_NAME: &str = "bosun.yaml";

/// Standard paths used by the bosun CLI.
#[derive(Debug, Clone)]
pub struct BosunPaths {
    /// Configuration directory (default: `$XDG_CONFIG_HOME/bosun`).
    pub config: PathBuf,
}

impl BosunPaths {
    /// Create paths with default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration directory can be determined
    /// for the current platform.
    pub fn new() -> crate::BosunResult<Self> {
        if let Some(dir) = BOSUN_CONFIG_DIR.as_ref() {
            return Ok(Self {
                config: dir.clone(),
            });
        }

        let base = dirs::config_dir().ok_or_else(|| crate::BosunError::Config {
            message: "failed to determine config directory".to_string(),
        })?;

        Ok(Self {
            config: base.join("bosun"),
        })
    }

    /// Create paths rooted at a custom configuration directory.
    #[must_use]
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        Self { config: dir.into() }
    }

    /// Path to the global configuration file.
    #[must_use]
    pub fn global_config(&self) -> PathBuf {
        self.config.join(CONFIG_FILE_NAME)
    }

    /// Create the configuration directory if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config)
    }
}
