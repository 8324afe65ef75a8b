// Generation studio: aesthetic planning, background rendering and quote
// polishing behind one trait.

pub mod gemini;
mod gemini_types;
pub mod http_client;
pub mod reliable;
pub mod traits;
pub mod types;

use std::sync::Arc;

pub use gemini::GeminiStudio;
pub use reliable::ReliableStudio;
pub use traits::{Studio, StudioFuture};
pub use types::ImageHandle;

use crate::config::Config;

/// The configured studio wrapped in quota retries.
pub fn create_studio(config: &Config) -> Arc<dyn Studio> {
    let gemini = GeminiStudio::new(&config.studio, config.api_key.as_deref());
    if !gemini.has_api_key() {
        tracing::warn!("No Gemini API key configured; generation calls will fail");
    }

    Arc::new(ReliableStudio::new(
        Arc::new(gemini),
        config.studio.max_retries,
        config.studio.base_backoff_ms,
    ))
}
