use super::super::{GalleryConfig, StudioConfig, TasteConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub studio: StudioConfig,

    #[serde(default)]
    pub taste: TasteConfig,

    #[serde(default)]
    pub gallery: GalleryConfig,
}

impl Config {
    /// Directory holding the JSON key-value slots.
    pub fn store_dir(&self) -> PathBuf {
        self.workspace_dir.join("store")
    }

    /// Directory holding rendered images of chosen options.
    pub fn images_dir(&self) -> PathBuf {
        self.workspace_dir.join("images")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.studio.validate()?;
        self.taste.pools()?;
        if self.gallery.capacity == 0 {
            return Err(ConfigError::Validation(
                "gallery.capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let sentience_dir = home.join(".sentience");

        Self {
            workspace_dir: sentience_dir.join("workspace"),
            config_path: sentience_dir.join("config.toml"),
            api_key: None,
            studio: StudioConfig::default(),
            taste: TasteConfig::default(),
            gallery: GalleryConfig::default(),
        }
    }
}
