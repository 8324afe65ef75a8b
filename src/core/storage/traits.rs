use crate::error::StorageError;

/// String-keyed blob store holding JSON documents.
///
/// Writes replace the whole slot; there is no merge. Callers that do a
/// read-modify-write must serialize it themselves.
pub trait KeyValueStore: Send + Sync {
    /// Backend identifier for logs.
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keys become file names, so only a conservative alphabet is accepted.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
