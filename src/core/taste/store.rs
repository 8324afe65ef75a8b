use std::sync::{Arc, Mutex, PoisonError};

use super::recorder::record_choice;
use super::types::{GenerationCandidate, PreferenceRecord};
use crate::core::storage::KeyValueStore;
use crate::error::StorageError;

/// Storage slot holding the serialized [`PreferenceRecord`].
pub const PREFS_KEY: &str = "sentience_prefs";

/// Load/save lifecycle of the single preference record.
///
/// The last saved or committed record is held for the lifetime of the
/// store, so a session keeps learning even when the backend rejects writes.
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    session: Mutex<Option<PreferenceRecord>>,
    // Single writer for load → record → save.
    writer: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            session: Mutex::new(None),
            writer: Mutex::new(()),
        }
    }

    /// The session's record if one was committed, else the persisted record,
    /// else the built-in default when the slot is absent, unreadable or
    /// malformed.
    pub fn load(&self) -> PreferenceRecord {
        if let Some(record) = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return record.clone();
        }
        self.load_persisted()
    }

    fn load_persisted(&self) -> PreferenceRecord {
        let raw = match self.storage.get(PREFS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PreferenceRecord::default(),
            Err(e) => {
                tracing::warn!(
                    backend = self.storage.name(),
                    "Failed to read preference record, using defaults: {e}"
                );
                return PreferenceRecord::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    backend = self.storage.name(),
                    "Malformed preference record, using defaults: {e}"
                );
                PreferenceRecord::default()
            }
        }
    }

    /// Overwrite the persisted record. Last writer wins.
    pub fn save(&self, record: &PreferenceRecord) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(record).map_err(|source| {
            StorageError::Serialize {
                key: PREFS_KEY.to_string(),
                source,
            }
        })?;
        self.storage.set(PREFS_KEY, &serialized)?;
        self.remember(record.clone());
        Ok(())
    }

    fn remember(&self, record: PreferenceRecord) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
    }

    /// Record a completed choice against the session's record and persist
    /// the result.
    ///
    /// A failed save is logged, not returned: the update still holds for
    /// every later [`Self::load`] on this store.
    pub fn commit_choice(
        &self,
        chosen: &GenerationCandidate,
        rejected: &GenerationCandidate,
    ) -> PreferenceRecord {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let updated = record_choice(&self.load(), chosen, rejected);
        if let Err(e) = self.save(&updated) {
            tracing::warn!(
                backend = self.storage.name(),
                total_generations = updated.total_generations,
                "Preference update will not survive reload: {e}"
            );
            self.remember(updated.clone());
        }
        updated
    }
}
