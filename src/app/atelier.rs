use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::gallery::{GalleryEntry, GalleryLog};
use crate::core::storage::{FileStore, KeyValueStore};
use crate::core::studio::{ImageHandle, Studio, create_studio};
use crate::core::taste::{
    AestheticPlan, ArtisticStyle, AspectRatio, GenerationCandidate, MoodProfile,
    PreferenceRecord, PreferenceStore, StrategyPair, StrategyPhase, StrategyPools,
    determine_strategy,
};
use crate::error::{SentienceError, StudioError};

/// Which side of a round the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Choice {
    A,
    B,
}

/// User input applied to both sides of a round, or to a single creation.
/// Style is never overridden.
#[derive(Debug, Clone, Default)]
pub struct RoundOverrides {
    pub quote: Option<String>,
    pub scene: Option<String>,
    pub subject: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    pub mood: Option<MoodProfile>,
}

impl RoundOverrides {
    fn apply(&self, mut candidate: GenerationCandidate) -> GenerationCandidate {
        if let Some(quote) = non_blank(self.quote.as_deref()) {
            candidate.quote = quote.to_string();
        }
        if let Some(scene) = non_blank(self.scene.as_deref()) {
            candidate.scene = Some(scene.to_string());
        }
        if let Some(subject) = non_blank(self.subject.as_deref()) {
            candidate.subject = Some(subject.to_string());
        }
        if let Some(aspect_ratio) = self.aspect_ratio {
            candidate.aspect_ratio = aspect_ratio;
        }
        if self.mood.is_some() {
            candidate.mood = self.mood;
        }
        candidate
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedOption {
    pub candidate: GenerationCandidate,
    pub plan: AestheticPlan,
    pub image: ImageHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPair {
    pub phase: StrategyPhase,
    pub option_a: RenderedOption,
    pub option_b: RenderedOption,
}

impl RoundPair {
    fn split(self, choice: Choice) -> (RenderedOption, RenderedOption) {
        match choice {
            Choice::A => (self.option_a, self.option_b),
            Choice::B => (self.option_b, self.option_a),
        }
    }
}

/// Result of committing a choice.
#[derive(Debug, Clone)]
pub struct ChoiceOutcome {
    pub record: PreferenceRecord,
    /// `None` when the image could not be kept.
    pub gallery_entry: Option<GalleryEntry>,
}

/// A single image made outside the rounds.
#[derive(Debug, Clone)]
pub struct Creation {
    pub rendered: RenderedOption,
    /// `None` when the image could not be kept.
    pub gallery_entry: Option<GalleryEntry>,
}

/// Runs A/B rounds: strategy, generation, and recording the user's pick.
pub struct Atelier {
    studio: Arc<dyn Studio>,
    prefs: PreferenceStore,
    gallery: GalleryLog,
    pools: StrategyPools,
    images_dir: PathBuf,
    rng: Mutex<StdRng>,
}

impl Atelier {
    pub fn new(
        studio: Arc<dyn Studio>,
        storage: Arc<dyn KeyValueStore>,
        pools: StrategyPools,
        gallery_capacity: usize,
        images_dir: impl Into<PathBuf>,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            studio,
            prefs: PreferenceStore::new(storage.clone()),
            gallery: GalleryLog::new(storage, gallery_capacity),
            pools,
            images_dir: images_dir.into(),
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &Config, seed: Option<u64>) -> Result<Self, SentienceError> {
        let pools = config.taste.pools()?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.store_dir()));
        Ok(Self::new(
            create_studio(config),
            storage,
            pools,
            config.gallery.capacity,
            config.images_dir(),
            seed,
        ))
    }

    pub fn preferences(&self) -> PreferenceRecord {
        self.prefs.load()
    }

    pub fn gallery(&self) -> &GalleryLog {
        &self.gallery
    }

    fn draw(&self, record: &PreferenceRecord) -> StrategyPair {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        determine_strategy(record, &self.pools, &mut *rng)
    }

    /// The next A/B pair for the persisted record, without generating.
    pub fn suggest(&self) -> StrategyPair {
        self.draw(&self.prefs.load())
    }

    /// Plan and render both sides of a round.
    ///
    /// Any studio failure aborts the round; the preference record is
    /// untouched either way.
    pub async fn generate_pair(&self, overrides: &RoundOverrides) -> Result<RoundPair, StudioError> {
        let record = self.prefs.load();
        let phase = StrategyPhase::for_record(&record);
        let pair = self.draw(&record);
        let option_a = overrides.apply(pair.option_a);
        let option_b = overrides.apply(pair.option_b);

        info!(
            %phase,
            studio = self.studio.name(),
            style_a = option_a.style.as_str(),
            style_b = option_b.style.as_str(),
            "Generating round"
        );

        let (plan_a, plan_b) = tokio::try_join!(
            self.studio.plan_aesthetic(&option_a),
            self.studio.plan_aesthetic(&option_b)
        )?;
        let (image_a, image_b) = tokio::try_join!(
            self.studio.generate_image(&option_a, &plan_a),
            self.studio.generate_image(&option_b, &plan_b)
        )?;

        Ok(RoundPair {
            phase,
            option_a: RenderedOption {
                candidate: option_a,
                plan: plan_a,
                image: image_a,
            },
            option_b: RenderedOption {
                candidate: option_b,
                plan: plan_b,
                image: image_b,
            },
        })
    }

    /// Record the pick, keep the chosen image and log it to the gallery.
    ///
    /// Persistence failures are logged; the returned record reflects the
    /// choice regardless.
    pub fn choose(&self, pair: RoundPair, choice: Choice) -> ChoiceOutcome {
        let (chosen, rejected) = pair.split(choice);
        let record = self.prefs.commit_choice(&chosen.candidate, &rejected.candidate);

        info!(
            ?choice,
            chosen_style = chosen.candidate.style.as_str(),
            total_generations = record.total_generations,
            confidence = record.confidence_score,
            "Round recorded"
        );

        let gallery_entry = self.keep(&chosen);
        ChoiceOutcome {
            record,
            gallery_entry,
        }
    }

    /// Plan and render one image in `style`, then keep it in the gallery.
    ///
    /// The preference record is never touched. Mood falls back to
    /// [`MoodProfile::default`] when not given.
    pub async fn create(
        &self,
        style: ArtisticStyle,
        overrides: &RoundOverrides,
    ) -> Result<Creation, StudioError> {
        let mut candidate = overrides.apply(GenerationCandidate::new(style.to_string()));
        candidate.mood = Some(candidate.mood.unwrap_or_default());

        info!(
            studio = self.studio.name(),
            %style,
            aspect_ratio = %candidate.aspect_ratio,
            "Creating single image"
        );

        let plan = self.studio.plan_aesthetic(&candidate).await?;
        let image = self.studio.generate_image(&candidate, &plan).await?;
        let rendered = RenderedOption {
            candidate,
            plan,
            image,
        };

        let gallery_entry = self.keep(&rendered);
        Ok(Creation {
            rendered,
            gallery_entry,
        })
    }

    fn keep(&self, chosen: &RenderedOption) -> Option<GalleryEntry> {
        let mut entry =
            GalleryEntry::new(chosen.candidate.clone(), chosen.plan.clone(), PathBuf::new());
        let path = self
            .images_dir
            .join(format!("{}.{}", entry.id, chosen.image.extension()));

        if let Err(e) = write_image(&path, &chosen.image) {
            warn!(path = %path.display(), "Chosen image not saved: {e:#}");
            return None;
        }
        entry.image_path = path;

        if let Err(e) = self.gallery.append(entry.clone()) {
            warn!(id = %entry.id, "Gallery update will not survive reload: {e}");
        }
        Some(entry)
    }

    /// Draft a quote for `scene` through the art director. Empty on failure.
    pub async fn draft_quote(&self, scene: &str) -> String {
        let mut candidate = self.suggest().option_a;
        if let Some(scene) = non_blank(Some(scene)) {
            candidate.scene = Some(scene.to_string());
        }

        match self.studio.plan_aesthetic(&candidate).await {
            Ok(plan) => plan.quote,
            Err(e) => {
                warn!("Quote draft failed: {e}");
                String::new()
            }
        }
    }

    /// Polish `text` into a short quote, falling back to `text` on failure.
    pub async fn refine_quote(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        match self.studio.refine_quote(text).await {
            Ok(refined) => refined,
            Err(e) => {
                warn!("Quote refinement failed, keeping original: {e}");
                text.to_string()
            }
        }
    }
}

fn write_image(path: &Path, image: &ImageHandle) -> anyhow::Result<()> {
    let bytes = image.decode()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
