use serde::{Deserialize, Serialize};

use crate::core::taste::{StrategyPools, canonical_styles, default_palettes, default_themes};
use crate::error::ConfigError;

/// Value pools the A/B strategy draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasteConfig {
    #[serde(default = "canonical_styles")]
    pub styles: Vec<String>,
    #[serde(default = "default_themes")]
    pub themes: Vec<String>,
    #[serde(default = "default_palettes")]
    pub palettes: Vec<String>,
}

impl Default for TasteConfig {
    fn default() -> Self {
        Self {
            styles: canonical_styles(),
            themes: default_themes(),
            palettes: default_palettes(),
        }
    }
}

impl TasteConfig {
    pub fn pools(&self) -> Result<StrategyPools, ConfigError> {
        StrategyPools::new(&self.styles, &self.themes, &self.palettes)
    }
}
