use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::scoreboard::AttributeCategory;

// AppStyle — the two canonical rendering styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppStyle {
    RandomAesthetic,
    Plaint,
}

// ArtisticStyle — looks offered by the single-shot studio, outside the rounds
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtisticStyle {
    Obsidian,
    Ethereal,
    Raw,
    #[default]
    MoodyAtmosphere,
    LofiStill,
}

// Theme — emotional theme offered to the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Theme {
    Peaceful,
    Melancholic,
    Motivated,
    Hopeful,
}

// ColorPalette — palettes drawn by the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorPalette {
    CoolBlues,
    WarmOranges,
    DarkMoody,
    PastelSoft,
}

// MoodProfile — atmosphere preset for image prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MoodProfile {
    #[default]
    Solace,
    Lustre,
    Intimacy,
    Vanguard,
    Noir,
    Spirit,
    Drift,
}

// AspectRatio — output frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape,
    #[default]
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait,
}

// LayoutType — typographic layout chosen by the art director
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutType {
    HeroStack,
    MinimalTypewriter,
    ClassicSerif,
    BoxedMinimal,
    NeonReflection,
    BoldHeadline,
    WindowScribe,
}

// TextPosition — vertical placement inside the negative space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextPosition {
    Top,
    Center,
    Bottom,
}

// Attribute — a tracked dimension of the preference record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    Style,
    Theme,
    ColorPalette,
    SceneType,
}

pub fn canonical_styles() -> Vec<String> {
    AppStyle::iter().map(|s| s.to_string()).collect()
}

pub fn default_themes() -> Vec<String> {
    Theme::iter().map(|t| t.to_string()).collect()
}

pub fn default_palettes() -> Vec<String> {
    ColorPalette::iter().map(|c| c.to_string()).collect()
}

/// One side of an A/B round, as submitted to the studio. Not persisted
/// except inside gallery entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationCandidate {
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl GenerationCandidate {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..Self::default()
        }
    }
}

/// The two candidates offered in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPair {
    pub option_a: GenerationCandidate,
    pub option_b: GenerationCandidate,
}

/// Typography and layout plan returned by the art-director call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AestheticPlan {
    pub quote: String,
    pub heading: String,
    pub hero_font: String,
    pub support_font: String,
    pub text_color: String,
    pub text_glow_color: String,
    pub text_opacity: f64,
    pub letter_spacing: String,
    pub layout_type: LayoutType,
    pub visual_nuance: String,
    pub vertical_align: TextPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Aggregate taste record, one per profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    #[serde(default)]
    pub style_history: AttributeCategory,
    #[serde(default)]
    pub themes: AttributeCategory,
    #[serde(default)]
    pub color_palettes: AttributeCategory,
    // Reserved: nothing feeds this category yet.
    #[serde(default)]
    pub scene_types: AttributeCategory,
    #[serde(default)]
    pub total_generations: u32,
    #[serde(default)]
    pub confidence_score: f64,
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            style_history: AttributeCategory::seeded(canonical_styles()),
            themes: AttributeCategory::new(),
            color_palettes: AttributeCategory::new(),
            scene_types: AttributeCategory::new(),
            total_generations: 0,
            confidence_score: 0.0,
        }
    }
}

impl PreferenceRecord {
    pub fn category(&self, attribute: Attribute) -> &AttributeCategory {
        match attribute {
            Attribute::Style => &self.style_history,
            Attribute::Theme => &self.themes,
            Attribute::ColorPalette => &self.color_palettes,
            Attribute::SceneType => &self.scene_types,
        }
    }

    pub fn category_mut(&mut self, attribute: Attribute) -> &mut AttributeCategory {
        match attribute {
            Attribute::Style => &mut self.style_history,
            Attribute::Theme => &mut self.themes,
            Attribute::ColorPalette => &mut self.color_palettes,
            Attribute::SceneType => &mut self.scene_types,
        }
    }

    pub fn observe(&mut self, attribute: Attribute, value: Option<&str>, was_chosen: bool) {
        self.category_mut(attribute).observe(value, was_chosen);
    }
}
