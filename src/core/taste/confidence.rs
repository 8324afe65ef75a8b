/// Confidence gained per completed round.
pub const CONFIDENCE_STEP: f64 = 0.05;

/// Ceiling; there is no "fully known" state.
pub const CONFIDENCE_CAP: f64 = 0.95;

/// Self-discovery score for a profile with `total_generations` rounds.
pub fn confidence_score(total_generations: u32) -> f64 {
    (f64::from(total_generations) * CONFIDENCE_STEP).min(CONFIDENCE_CAP)
}
