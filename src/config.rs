//! Studio Configuration
//!
//! Configuration can be loaded from:
//! - Default values
//! - Config file (~/.config/flowchart-studio/config.toml)
//! - Command-line overrides (`--config`, `--api-url`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FlowchartError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Top-level studio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StudioConfig {
    /// Generation service settings
    pub api: ApiConfig,

    /// Export settings
    pub export: ExportConfig,

    /// Canvas display settings
    pub canvas: CanvasConfig,
}

/// Generation service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Service root, e.g. http://localhost:8000
    pub base_url: String,

    /// Request timeout; unset means wait indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory artifacts are written into
    pub output_dir: PathBuf,

    /// Background color for PNG and PDF
    pub background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub show_grid: bool,
    pub show_minimap: bool,
    pub dark: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            background: "#ffffff".to_string(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_minimap: true,
            dark: false,
        }
    }
}

impl StudioConfig {
    /// Default location of the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("flowchart-studio/config.toml"))
            .unwrap_or_else(|| PathBuf::from("flowchart-studio.toml"))
    }

    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| FlowchartError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| FlowchartError::Config(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render as TOML for display
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FlowchartError::Config(e.to_string()))
    }
}
