// Preference engine: per-attribute scoreboards, A/B strategy selection and
// choice recording on top of a persisted preference record.

pub mod confidence;
pub mod recorder;
pub mod scoreboard;
pub mod store;
pub mod strategy;
pub mod types;

pub use confidence::confidence_score;
pub use recorder::record_choice;
pub use scoreboard::{AttributeCategory, AttributePool, AttributeStat};
pub use store::{PREFS_KEY, PreferenceStore};
pub use strategy::{EXPLORATION_ROUNDS, StrategyPhase, StrategyPools, determine_strategy};
pub use types::*;
