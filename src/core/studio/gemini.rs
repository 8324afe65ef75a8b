//! Google Gemini studio.
//!
//! Authentication priority:
//! 1. Explicit API key passed in (config)
//! 2. `GEMINI_API_KEY` environment variable
//! 3. `GOOGLE_API_KEY` environment variable

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use super::gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
};
use super::http_client::build_studio_client;
use super::traits::{Studio, StudioFuture};
use super::types::ImageHandle;
use crate::config::StudioConfig;
use crate::core::taste::{AestheticPlan, GenerationCandidate, MoodProfile};
use crate::error::StudioError;

const MAX_API_ERROR_CHARS: usize = 400;

pub struct GeminiStudio {
    api_key: Option<String>,
    client: Client,
    base_url: String,
    plan_model: String,
    image_model: String,
    refine_model: String,
}

impl GeminiStudio {
    pub fn new(config: &StudioConfig, api_key: Option<&str>) -> Self {
        let resolved_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        Self {
            api_key: resolved_key,
            client: build_studio_client(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            plan_model: config.plan_model.clone(),
            image_model: config.image_model.clone(),
            refine_model: config.refine_model.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, StudioError> {
        self.api_key.as_deref().ok_or_else(|| {
            StudioError::Generation(
                "Gemini API key not found. Set GEMINI_API_KEY or `api_key` in config.toml"
                    .to_string(),
            )
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, StudioError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| StudioError::classify(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("Gemini API error ({status}): {}", truncate_error(&body));
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                StudioError::QuotaExceeded(message)
            } else {
                StudioError::classify(message)
            });
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| StudioError::Generation(format!("unreadable Gemini response: {e}")))?;

        if let Some(err) = result.error.as_ref() {
            let message = format!("Gemini API error: {}", truncate_error(&err.message));
            return Err(if err.code == Some(429) {
                StudioError::QuotaExceeded(message)
            } else {
                StudioError::classify(message)
            });
        }

        Ok(result)
    }

    fn text_request(prompt: String, generation_config: Option<GenerationConfig>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> String {
        let mut out = String::new();
        for text in result.parts().filter_map(|part| part.text.as_deref()) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(text);
        }
        out
    }

    pub(crate) fn build_plan_prompt(candidate: &GenerationCandidate) -> String {
        let mood = candidate
            .mood
            .map_or_else(|| "cinematic moody".to_string(), |m| m.to_string());
        let subject = candidate
            .subject
            .as_deref()
            .or(candidate.scene.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Atmospheric solitude");
        let text = if candidate.quote.trim().is_empty() {
            "Generate a visceral quote"
        } else {
            candidate.quote.as_str()
        };

        [
            "Act as an elite art director for high-impact social photography.".to_string(),
            format!("Mood: {mood}"),
            format!("Style: {}", candidate.style),
            format!("Subject: {subject}"),
            format!("Text: {text}"),
            String::new(),
            "GOAL: Plan typography and layout for a quote laid over the image.".to_string(),
            "RULES:".to_string(),
            "- layoutType: one of hero_stack (large bold heading, small subtext), minimal_typewriter (monospaced, documentary), classic_serif, boxed_minimal (text in a semi-transparent pill), neon_reflection (glowing text reflected on surfaces), bold_headline (heavy sans-serif), window_scribe (handwriting on glass).".to_string(),
            "- verticalAlign: top, center or bottom, whichever sits in the image's negative space.".to_string(),
            "- Fonts: Playfair Display, Lora, Courier Prime, Syne, Space Grotesk, Fraunces, Cormorant Garamond, Caveat, UnifrakturMaguntia, Bebas Neue, Montserrat, Cinzel, Italiana, Major Mono Display, Krona One, Old Standard TT, Six Caps, VT323, Libre Caslon Display, Abril Fatface.".to_string(),
            "- visualNuance: the grain and color grade (e.g. raised blacks, teal-orange, lo-fi matte).".to_string(),
            String::new(),
            "Return ONLY JSON.".to_string(),
        ]
        .join("\n")
    }

    fn atmosphere(mood: Option<MoodProfile>) -> &'static str {
        match mood {
            Some(MoodProfile::Solace) => {
                "Foggy mountain solitude, muted teal and grey, desaturated, Kodak Portra 400 texture, raised blacks, low contrast."
            }
            Some(MoodProfile::Lustre) => {
                "Golden hour highway, long shadows, lens flare, warm cinematic glow, Fuji 400H colors, high-end travel photography."
            }
            Some(MoodProfile::Intimacy) => {
                "Macro raindrops on organic leaves, bokeh, deep greens, misty atmosphere, emotional quietude, soft lighting."
            }
            Some(MoodProfile::Vanguard) => {
                "Minimalist architecture, brutalist lines against vast sky, high contrast black and white or deep monochrome."
            }
            Some(MoodProfile::Noir) => {
                "Cyberpunk night rain, neon signs, wet asphalt reflections, deep blue and magenta, cinematic moody lighting."
            }
            Some(MoodProfile::Spirit) => {
                "Airplane wing over clouds at dusk, or train through landscape, transit loneliness, cinematic motion blur, evocative travel."
            }
            Some(MoodProfile::Drift) => {
                "Lo-fi anime aesthetic, hand-painted digital illustration, pensive character, evening city lights, warm cozy bedroom light, nostalgic texture."
            }
            None => "Cinematic mood, professional color grading, significant negative space.",
        }
    }

    pub(crate) fn build_image_prompt(candidate: &GenerationCandidate) -> String {
        let subject = candidate
            .subject
            .as_deref()
            .or(candidate.scene.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Empty landscape");
        format!(
            "{} Subject: {subject}. Art Style: Professional photography, cinematic grain. \
             Composition: Wide shot with large areas of negative space (empty sky or blur) \
             specifically for text placement. No text in image.",
            Self::atmosphere(candidate.mood)
        )
    }

    fn plan_schema() -> Value {
        let string = json!({ "type": "STRING" });
        json!({
            "type": "OBJECT",
            "properties": {
                "quote": string,
                "heading": string,
                "heroFont": string,
                "supportFont": string,
                "textColor": string,
                "textGlowColor": string,
                "textOpacity": { "type": "NUMBER" },
                "letterSpacing": string,
                "layoutType": string,
                "visualNuance": string,
                "verticalAlign": string,
                "backgroundColor": string
            },
            "required": [
                "quote", "heading", "heroFont", "supportFont", "textColor", "textGlowColor",
                "textOpacity", "letterSpacing", "layoutType", "visualNuance", "verticalAlign"
            ]
        })
    }

    pub(crate) fn parse_plan(text: &str) -> Result<AestheticPlan, StudioError> {
        let trimmed = text.trim();
        let json = if trimmed.is_empty() { "{}" } else { trimmed };
        serde_json::from_str(json)
            .map_err(|e| StudioError::Generation(format!("malformed aesthetic plan: {e}")))
    }
}

impl Studio for GeminiStudio {
    fn name(&self) -> &str {
        "gemini"
    }

    fn plan_aesthetic<'a>(
        &'a self,
        candidate: &'a GenerationCandidate,
    ) -> StudioFuture<'a, AestheticPlan> {
        Box::pin(async move {
            let request = Self::text_request(
                Self::build_plan_prompt(candidate),
                Some(GenerationConfig {
                    response_mime_type: Some("application/json".to_string()),
                    response_schema: Some(Self::plan_schema()),
                    image_config: None,
                }),
            );
            let result = self.generate(&self.plan_model, &request).await?;
            Self::parse_plan(&Self::extract_text(&result))
        })
    }

    fn generate_image<'a>(
        &'a self,
        candidate: &'a GenerationCandidate,
        _plan: &'a AestheticPlan,
    ) -> StudioFuture<'a, ImageHandle> {
        Box::pin(async move {
            let request = Self::text_request(
                Self::build_image_prompt(candidate),
                Some(GenerationConfig {
                    image_config: Some(ImageConfig {
                        aspect_ratio: candidate.aspect_ratio.to_string(),
                    }),
                    ..GenerationConfig::default()
                }),
            );
            let result = self.generate(&self.image_model, &request).await?;

            result
                .parts()
                .find_map(|part| part.inline_data.as_ref())
                .map(|inline| ImageHandle {
                    mime_type: inline.mime_type.clone(),
                    data: inline.data.clone(),
                })
                .ok_or_else(|| StudioError::Generation("Image generation failed.".to_string()))
        })
    }

    fn refine_quote<'a>(&'a self, quote: &'a str) -> StudioFuture<'a, String> {
        Box::pin(async move {
            let prompt = format!(
                "Refine this into a punchy, profound \"impact quote\" under 12 words: \"{quote}\""
            );
            let result = self
                .generate(&self.refine_model, &Self::text_request(prompt, None))
                .await?;
            let refined = Self::extract_text(&result).trim().to_string();
            Ok(if refined.is_empty() {
                quote.to_string()
            } else {
                refined
            })
        })
    }
}

fn truncate_error(input: &str) -> String {
    if input.chars().count() <= MAX_API_ERROR_CHARS {
        return input.to_string();
    }

    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}
