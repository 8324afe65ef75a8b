mod core;
mod gallery;
mod studio;
mod taste;

pub use self::core::Config;
pub use gallery::GalleryConfig;
pub use studio::StudioConfig;
pub use taste::TasteConfig;
