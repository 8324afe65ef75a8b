use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use strum::Display;

use super::scoreboard::AttributePool;
use super::types::{
    AppStyle, AspectRatio, GenerationCandidate, PreferenceRecord, StrategyPair, canonical_styles,
    default_palettes, default_themes,
};
use crate::error::ConfigError;

/// Rounds drawn at random before the record is trusted.
pub const EXPLORATION_ROUNDS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StrategyPhase {
    Exploration,
    Personalization,
}

impl StrategyPhase {
    pub fn for_record(record: &PreferenceRecord) -> Self {
        if record.total_generations < EXPLORATION_ROUNDS {
            Self::Exploration
        } else {
            Self::Personalization
        }
    }
}

/// Value pools the strategy draws candidates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPools {
    pub styles: AttributePool,
    pub themes: AttributePool,
    pub palettes: AttributePool,
}

impl StrategyPools {
    pub fn new(
        styles: &[String],
        themes: &[String],
        palettes: &[String],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            styles: AttributePool::new("style", styles.iter().cloned())?,
            themes: AttributePool::new("theme", themes.iter().cloned())?,
            palettes: AttributePool::new("palette", palettes.iter().cloned())?,
        })
    }
}

impl Default for StrategyPools {
    fn default() -> Self {
        Self::new(&canonical_styles(), &default_themes(), &default_palettes())
            .unwrap_or_else(|_| unreachable!("built-in pools are non-empty"))
    }
}

fn candidate(style: &str, theme: &str, colors: &str) -> GenerationCandidate {
    GenerationCandidate {
        style: style.to_owned(),
        theme: Some(theme.to_owned()),
        colors: Some(colors.to_owned()),
        aspect_ratio: AspectRatio::Portrait,
        quote: String::new(),
        ..GenerationCandidate::default()
    }
}

/// Decide the A/B pair for the next round.
///
/// Pure given `rng`: the first [`EXPLORATION_ROUNDS`] rounds draw styles,
/// themes and palettes uniformly (with distinct styles); afterwards option A
/// exploits the strongest value of every category and option B contrasts on
/// style and theme while keeping A's palette.
pub fn determine_strategy<R: Rng + ?Sized>(
    record: &PreferenceRecord,
    pools: &StrategyPools,
    rng: &mut R,
) -> StrategyPair {
    let phase = StrategyPhase::for_record(record);
    tracing::debug!(
        %phase,
        total_generations = record.total_generations,
        "Determining generation strategy"
    );

    match phase {
        StrategyPhase::Exploration => explore(pools, rng),
        StrategyPhase::Personalization => personalize(record, pools, rng),
    }
}

fn explore<R: Rng + ?Sized>(pools: &StrategyPools, rng: &mut R) -> StrategyPair {
    let style_a = pools.styles.choose(rng);
    // A single-style pool cannot contrast; both sides share it.
    let style_b = pools
        .styles
        .excluding(style_a)
        .choose(rng)
        .copied()
        .unwrap_or(style_a);

    let option_a = candidate(style_a, pools.themes.choose(rng), pools.palettes.choose(rng));
    let option_b = candidate(style_b, pools.themes.choose(rng), pools.palettes.choose(rng));

    StrategyPair { option_a, option_b }
}

fn personalize<R: Rng + ?Sized>(
    record: &PreferenceRecord,
    pools: &StrategyPools,
    rng: &mut R,
) -> StrategyPair {
    let top_style = record.style_history.top_value(&pools.styles, rng);
    let top_theme = record.themes.top_value(&pools.themes, rng);
    let top_color = record.color_palettes.top_value(&pools.palettes, rng);

    let fallback_style = AppStyle::Plaint.to_string();
    let style_b = pools
        .styles
        .excluding(&top_style)
        .first()
        .copied()
        .unwrap_or(fallback_style.as_str())
        .to_owned();
    let theme_b = pools
        .themes
        .excluding(&top_theme)
        .choose(rng)
        .copied()
        .unwrap_or(top_theme.as_str())
        .to_owned();

    // B deliberately reuses A's proven palette.
    let option_b = candidate(&style_b, &theme_b, &top_color);
    let option_a = candidate(&top_style, &top_theme, &top_color);

    StrategyPair { option_a, option_b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::taste::recorder::record_choice;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn record_with_generations(total_generations: u32) -> PreferenceRecord {
        PreferenceRecord {
            total_generations,
            ..PreferenceRecord::default()
        }
    }

    #[test]
    fn phase_switches_at_five_rounds() {
        assert_eq!(
            StrategyPhase::for_record(&record_with_generations(4)),
            StrategyPhase::Exploration
        );
        assert_eq!(
            StrategyPhase::for_record(&record_with_generations(5)),
            StrategyPhase::Personalization
        );
    }

    #[test]
    fn exploration_offers_distinct_styles() {
        let pools = StrategyPools::default();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for generations in 0..EXPLORATION_ROUNDS {
                let pair =
                    determine_strategy(&record_with_generations(generations), &pools, &mut rng);
                assert_ne!(pair.option_a.style, pair.option_b.style);
            }
        }
    }

    #[test]
    fn exploration_draws_from_pools_with_fixed_frame() {
        let pools = StrategyPools::default();
        let mut rng = StdRng::seed_from_u64(3);
        let pair = determine_strategy(&PreferenceRecord::default(), &pools, &mut rng);
        for option in [&pair.option_a, &pair.option_b] {
            assert!(pools.themes.values().contains(option.theme.as_ref().unwrap()));
            assert!(pools.palettes.values().contains(option.colors.as_ref().unwrap()));
            assert_eq!(option.aspect_ratio, AspectRatio::Portrait);
            assert!(option.quote.is_empty());
        }
    }

    #[test]
    fn exploration_with_larger_pool_still_contrasts() {
        let styles: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| (*s).to_string()).collect();
        let pools = StrategyPools::new(&styles, &default_themes(), &default_palettes()).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let pair = determine_strategy(&PreferenceRecord::default(), &pools, &mut rng);
            assert_ne!(pair.option_a.style, pair.option_b.style);
        }
    }

    #[test]
    fn same_seed_same_pair() {
        let pools = StrategyPools::default();
        let record = PreferenceRecord::default();
        let a = determine_strategy(&record, &pools, &mut StdRng::seed_from_u64(42));
        let b = determine_strategy(&record, &pools, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn personalization_shares_palette_and_contrasts_style() {
        let pools = StrategyPools::default();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pair = determine_strategy(&record_with_generations(7), &pools, &mut rng);
            assert_eq!(pair.option_a.colors, pair.option_b.colors);
            assert_ne!(pair.option_a.style, pair.option_b.style);
            assert_ne!(pair.option_a.theme, pair.option_b.theme);
        }
    }

    #[test]
    fn personalization_exploits_top_values() {
        let pools = StrategyPools::default();
        let mut record = PreferenceRecord::default();
        let chosen = candidate("plaint", "hopeful", "dark_moody");
        let rejected = candidate("random_aesthetic", "peaceful", "cool_blues");
        for _ in 0..EXPLORATION_ROUNDS {
            record = record_choice(&record, &chosen, &rejected);
        }

        let mut rng = StdRng::seed_from_u64(1);
        let pair = determine_strategy(&record, &pools, &mut rng);
        assert_eq!(pair.option_a.style, "plaint");
        assert_eq!(pair.option_a.theme.as_deref(), Some("hopeful"));
        assert_eq!(pair.option_a.colors.as_deref(), Some("dark_moody"));
        assert_eq!(pair.option_b.style, "random_aesthetic");
        assert_eq!(pair.option_b.colors.as_deref(), Some("dark_moody"));
    }

    #[test]
    fn single_style_pool_falls_back_to_plaint_for_b() {
        let styles = vec!["random_aesthetic".to_string()];
        let pools = StrategyPools::new(&styles, &default_themes(), &default_palettes()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let pair = determine_strategy(&record_with_generations(9), &pools, &mut rng);
        assert_eq!(pair.option_a.style, "random_aesthetic");
        assert_eq!(pair.option_b.style, "plaint");
    }

    #[test]
    fn single_style_pool_exploration_repeats_style() {
        let styles = vec!["plaint".to_string()];
        let pools = StrategyPools::new(&styles, &default_themes(), &default_palettes()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let pair = determine_strategy(&PreferenceRecord::default(), &pools, &mut rng);
        assert_eq!(pair.option_a.style, pair.option_b.style);
    }
}
