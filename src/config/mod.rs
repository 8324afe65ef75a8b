pub mod schema;

pub use schema::{Config, GalleryConfig, StudioConfig, TasteConfig};
