//! Configuration loading and validation

use anyhow::{Context, Result};
use motorview_core::{ClassificationTable, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_title() -> String {
    "Motorview".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// glTF/GLB file, relative to `assets_dir` unless absolute
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Classification table; the built-in engine table when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<PathBuf>,
    /// Asset root directory
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            classification: None,
            assets_dir: default_assets_dir(),
        }
    }
}

fn default_model_path() -> String {
    "models/machine.glb".to_string()
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

impl Config {
    /// Load the configured classification table, or the built-in one
    pub fn classification_table(&self) -> Result<ClassificationTable> {
        match &self.model.classification {
            Some(path) => ClassificationTable::from_file(path)
                .with_context(|| format!("Failed to load classification table {}", path.display())),
            None => {
                info!("Using built-in engine classification");
                ClassificationTable::builtin_engine().context("Built-in classification table is invalid")
            }
        }
    }

    /// Asset root and model path as the asset server expects them.
    /// An absolute model path is served from its own directory.
    pub fn asset_paths(&self) -> (String, String) {
        let model = Path::new(&self.model.path);
        if model.is_absolute() {
            if let (Some(dir), Some(file)) = (model.parent(), model.file_name()) {
                return (
                    dir.to_string_lossy().into_owned(),
                    file.to_string_lossy().into_owned(),
                );
            }
        }
        (self.model.assets_dir.clone(), self.model.path.clone())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
