//! Capture settings.
//!
//! Loads settings from config.json next to the executable at startup. Any
//! missing field takes its default, and a missing or unreadable file means
//! all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::capture::CompositorTier;
use crate::paths;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<SnapConfig> = OnceLock::new();

/// Complete capture configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Forces the maximized-window correction table instead of detecting it
    /// from the OS version.
    pub compositor_tier: Option<CompositorTier>,
    /// Draw the mouse cursor onto window captures.
    pub include_cursor: bool,
    /// Where screenshots are written. Defaults to `<Documents>/winsnap`.
    pub output_dir: Option<PathBuf>,
    /// File name prefix for saved screenshots.
    pub file_prefix: String,
    /// Register saved files with the shell's recent documents list.
    pub add_to_recent_documents: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            compositor_tier: None,
            include_cursor: false,
            output_dir: None,
            file_prefix: "screenshot".to_string(),
            add_to_recent_documents: true,
        }
    }
}

impl SnapConfig {
    /// Resolved screenshots directory.
    pub fn screenshots_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(paths::get_screenshots_dir)
    }
}

/// Loads configuration from `path`, falling back to defaults on any error.
pub fn load_config_from(path: &Path) -> SnapConfig {
    log::info!("Looking for config at: {}", path.display());

    if !path.exists() {
        log::info!("config.json not found. Using default config.");
        return SnapConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log::info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config.json: {}. Using defaults.", e);
                SnapConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read config.json: {}. Using defaults.", e);
            SnapConfig::default()
        }
    }
}

fn load_config() -> SnapConfig {
    load_config_from(&paths::get_config_path())
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns the global configuration, loading it on first use.
pub fn get_config() -> &'static SnapConfig {
    CONFIG.get_or_init(load_config)
}
