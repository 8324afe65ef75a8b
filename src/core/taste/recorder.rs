use super::confidence::confidence_score;
use super::types::{Attribute, GenerationCandidate, PreferenceRecord};

/// Fold one completed A/B choice into a copy of `record`.
///
/// Both sides count as seen; only `chosen` counts as chosen. Theme and
/// palette are skipped on whichever side omits them. The input is left
/// untouched so callers can persist or discard the result as a unit.
pub fn record_choice(
    record: &PreferenceRecord,
    chosen: &GenerationCandidate,
    rejected: &GenerationCandidate,
) -> PreferenceRecord {
    let mut next = record.clone();
    next.total_generations = next.total_generations.saturating_add(1);

    next.observe(Attribute::Style, Some(&chosen.style), true);
    next.observe(Attribute::Style, Some(&rejected.style), false);
    next.observe(Attribute::Theme, chosen.theme.as_deref(), true);
    next.observe(Attribute::Theme, rejected.theme.as_deref(), false);
    next.observe(Attribute::ColorPalette, chosen.colors.as_deref(), true);
    next.observe(Attribute::ColorPalette, rejected.colors.as_deref(), false);

    next.confidence_score = confidence_score(next.total_generations);

    tracing::debug!(
        total_generations = next.total_generations,
        confidence = next.confidence_score,
        chosen_style = chosen.style.as_str(),
        rejected_style = rejected.style.as_str(),
        "Recorded preference choice"
    );

    next
}
