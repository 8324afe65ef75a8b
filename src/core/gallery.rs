use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::storage::KeyValueStore;
use crate::core::taste::{AestheticPlan, GenerationCandidate};
use crate::error::StorageError;

/// Storage slot holding the serialized gallery.
pub const GALLERY_KEY: &str = "sentience_gallery";

pub const DEFAULT_GALLERY_CAPACITY: usize = 50;

/// One chosen image, remembered with the settings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    pub id: Uuid,
    pub candidate: GenerationCandidate,
    pub plan: AestheticPlan,
    pub image_path: PathBuf,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl GalleryEntry {
    pub fn new(candidate: GenerationCandidate, plan: AestheticPlan, image_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            plan,
            image_path,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Rolling history of chosen images, newest first.
pub struct GalleryLog {
    storage: Arc<dyn KeyValueStore>,
    capacity: usize,
    writer: Mutex<()>,
}

impl GalleryLog {
    pub fn new(storage: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            storage,
            capacity: capacity.max(1),
            writer: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored entries, or an empty list when the slot is absent or unreadable.
    pub fn list(&self) -> Vec<GalleryEntry> {
        let raw = match self.storage.get(GALLERY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(backend = self.storage.name(), "Failed to read gallery: {e}");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(
                backend = self.storage.name(),
                "Malformed gallery, starting empty: {e}"
            );
            Vec::new()
        })
    }

    /// Prepend `entry`, dropping the oldest beyond capacity.
    ///
    /// Image files of dropped entries are deleted once the shorter list is
    /// stored.
    pub fn append(&self, entry: GalleryEntry) -> Result<(), StorageError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.list();
        entries.insert(0, entry);
        let evicted = entries.split_off(entries.len().min(self.capacity));
        self.save(&entries)?;

        for entry in &evicted {
            discard_image(&entry.image_path);
        }
        Ok(())
    }

    /// Returns whether an entry with `id` existed. Its image file goes with it.
    pub fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.list();
        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };
        let removed = entries.remove(index);
        self.save(&entries)?;

        discard_image(&removed.image_path);
        Ok(true)
    }

    fn save(&self, entries: &[GalleryEntry]) -> Result<(), StorageError> {
        let serialized =
            serde_json::to_string(entries).map_err(|source| StorageError::Serialize {
                key: GALLERY_KEY.to_string(),
                source,
            })?;
        self.storage.set(GALLERY_KEY, &serialized)
    }
}

/// Best effort: an already missing file is fine, anything else is logged.
fn discard_image(path: &Path) {
    if path.as_os_str().is_empty() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Discarded gallery image"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "Failed to delete gallery image: {e}"),
    }
}
