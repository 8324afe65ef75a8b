use serde::{Deserialize, Serialize};

use crate::core::gallery::DEFAULT_GALLERY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Entries kept before the oldest are dropped.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_GALLERY_CAPACITY
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
