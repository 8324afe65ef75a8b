use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gemini endpoint, models and the quota retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_plan_model")]
    pub plan_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_refine_model")]
    pub refine_model: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_plan_model() -> String {
    "gemini-3-pro-preview".into()
}
fn default_image_model() -> String {
    "gemini-2.5-flash-image".into()
}
fn default_refine_model() -> String {
    "gemini-3-flash-preview".into()
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_backoff_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            plan_model: default_plan_model(),
            image_model: default_image_model(),
            refine_model: default_refine_model(),
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("studio.base_url is empty".into()));
        }
        for (field, model) in [
            ("plan_model", &self.plan_model),
            ("image_model", &self.image_model),
            ("refine_model", &self.refine_model),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigError::Validation(format!("studio.{field} is empty")));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "studio.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
