use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Sentience`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; app glue continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum SentienceError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generation studio ───────────────────────────────────────────────
    #[error("studio: {0}")]
    Studio(#[from] StudioError),

    // ── Persistence substrate ───────────────────────────────────────────
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Studio errors ───────────────────────────────────────────────────────────

/// Failures reported by the generation collaborator.
///
/// Both kinds are terminal for the current round. Only `QuotaExceeded` is
/// retried, and only inside the studio layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("generation failed: {0}")]
    Generation(String),
}

impl StudioError {
    /// Classify a raw failure message the way the generation backend reports it.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_quota_message(&message) {
            Self::QuotaExceeded(message)
        } else {
            Self::Generation(message)
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Message shown to the user; quota failures suggest waiting.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::QuotaExceeded(_) => {
                "The studio is over its usage quota. Wait a minute and try again."
            }
            Self::Generation(_) => "Generation failed. Adjust the vision and try again.",
        }
    }
}

fn is_quota_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("quota") || message.contains("429")
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SentienceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = SentienceError::Config(ConfigError::Validation("empty style pool".into()));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn quota_classification_matches_message_and_status() {
        assert!(StudioError::classify("You exceeded your current QUOTA").is_quota());
        assert!(StudioError::classify("Gemini API error (429 Too Many Requests)").is_quota());
        assert!(!StudioError::classify("500 internal").is_quota());
    }

    #[test]
    fn user_messages_distinguish_quota_from_general() {
        let quota = StudioError::QuotaExceeded("x".into()).user_message();
        let general = StudioError::Generation("x".into()).user_message();
        assert_ne!(quota, general);
        assert!(quota.contains("Wait"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: SentienceError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }

    #[test]
    fn storage_error_names_key() {
        let err = StorageError::InvalidKey("../etc".into());
        assert!(err.to_string().contains("../etc"));
    }
}
