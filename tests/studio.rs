use std::sync::Arc;

use serde_json::json;
use sentience::app::{Atelier, Choice, RoundOverrides};
use sentience::config::StudioConfig;
use sentience::core::storage::MemoryStore;
use sentience::core::studio::{GeminiStudio, ReliableStudio, Studio};
use sentience::core::taste::{
    ArtisticStyle, AspectRatio, GenerationCandidate, LayoutType, PreferenceRecord, StrategyPools,
    TextPosition,
};
use sentience::error::StudioError;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAN_PATH: &str = "/models/gemini-3-pro-preview:generateContent";
const IMAGE_PATH: &str = "/models/gemini-2.5-flash-image:generateContent";
const REFINE_PATH: &str = "/models/gemini-3-flash-preview:generateContent";

fn studio_for(server: &MockServer) -> GeminiStudio {
    let config = StudioConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..StudioConfig::default()
    };
    GeminiStudio::new(&config, Some("test-key"))
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

fn plan_response() -> ResponseTemplate {
    let plan = json!({
        "quote": "The fog keeps what we cannot say.",
        "heading": "STILL",
        "heroFont": "Cormorant Garamond",
        "supportFont": "Courier Prime",
        "textColor": "#f4f1ea",
        "textGlowColor": "#1b2a33",
        "textOpacity": 0.85,
        "letterSpacing": "0.2em",
        "layoutType": "minimal_typewriter",
        "visualNuance": "raised blacks, teal grade",
        "verticalAlign": "top"
    });
    text_response(&plan.to_string())
}

fn image_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [
            { "text": "Here is your image." },
            { "inlineData": { "mimeType": "image/png", "data": "aGk=" } }
        ] } }]
    }))
}

mod gemini {
    use super::*;

    #[tokio::test]
    async fn plan_is_parsed_from_json_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(plan_response())
            .expect(1)
            .mount(&server)
            .await;

        let plan = studio_for(&server)
            .plan_aesthetic(&GenerationCandidate::new("plaint"))
            .await
            .unwrap();

        assert_eq!(plan.layout_type, LayoutType::MinimalTypewriter);
        assert_eq!(plan.vertical_align, TextPosition::Top);
        assert!(plan.background_color.is_none());
    }

    #[tokio::test]
    async fn rate_limit_maps_to_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = studio_for(&server)
            .plan_aesthetic(&GenerationCandidate::new("plaint"))
            .await
            .unwrap_err();
        assert!(err.is_quota());
    }

    #[tokio::test]
    async fn quota_body_maps_to_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("Quota exceeded for project"),
            )
            .mount(&server)
            .await;

        let err = studio_for(&server)
            .plan_aesthetic(&GenerationCandidate::new("plaint"))
            .await
            .unwrap_err();
        assert!(err.is_quota());
    }

    #[tokio::test]
    async fn server_error_is_generation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let err = studio_for(&server)
            .plan_aesthetic(&GenerationCandidate::new("plaint"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::Generation(_)));
    }

    #[tokio::test]
    async fn image_requests_aspect_ratio_and_returns_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(plan_response())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .and(body_partial_json(json!({
                "generationConfig": { "imageConfig": { "aspectRatio": "16:9" } }
            })))
            .respond_with(image_response())
            .expect(1)
            .mount(&server)
            .await;

        let studio = studio_for(&server);
        let candidate = GenerationCandidate {
            aspect_ratio: AspectRatio::Landscape,
            ..GenerationCandidate::new("plaint")
        };
        let plan = studio.plan_aesthetic(&candidate).await.unwrap();
        let image = studio.generate_image(&candidate, &plan).await.unwrap();

        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.decode().unwrap(), b"hi");
    }

    #[tokio::test]
    async fn missing_inline_data_fails_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(plan_response())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(text_response("I cannot draw that."))
            .mount(&server)
            .await;

        let studio = studio_for(&server);
        let candidate = GenerationCandidate::new("plaint");
        let plan = studio.plan_aesthetic(&candidate).await.unwrap();
        let err = studio.generate_image(&candidate, &plan).await.unwrap_err();

        assert_eq!(
            err,
            StudioError::Generation("Image generation failed.".to_string())
        );
    }

    #[tokio::test]
    async fn refine_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFINE_PATH))
            .respond_with(text_response("  Stay where the light stays.\n"))
            .mount(&server)
            .await;

        let refined = studio_for(&server)
            .refine_quote("i want to stay in the light")
            .await
            .unwrap();
        assert_eq!(refined, "Stay where the light stays.");
    }
}

mod retries {
    use super::*;

    #[tokio::test]
    async fn quota_failures_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFINE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFINE_PATH))
            .respond_with(text_response("Enough."))
            .mount(&server)
            .await;

        let studio = ReliableStudio::new(Arc::new(studio_for(&server)), 3, 1);
        assert_eq!(studio.refine_quote("that is enough").await.unwrap(), "Enough.");
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn generation_failures_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFINE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let studio = ReliableStudio::new(Arc::new(studio_for(&server)), 3, 1);
        assert!(studio.refine_quote("x").await.is_err());
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}

mod rounds {
    use super::*;

    #[tokio::test]
    async fn full_round_against_gemini_records_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(plan_response())
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(image_response())
            .expect(2)
            .mount(&server)
            .await;

        let images = TempDir::new().unwrap();
        let atelier = Atelier::new(
            Arc::new(studio_for(&server)),
            Arc::new(MemoryStore::new()),
            StrategyPools::default(),
            50,
            images.path(),
            Some(42),
        );

        let pair = atelier
            .generate_pair(&RoundOverrides {
                quote: Some("stay".into()),
                ..RoundOverrides::default()
            })
            .await
            .unwrap();
        let chosen_style = pair.option_a.candidate.style.clone();
        let outcome = atelier.choose(pair, Choice::A);

        assert_eq!(outcome.record.total_generations, 1);
        assert_eq!(
            outcome.record.style_history.get(&chosen_style).unwrap().chosen,
            1
        );
        let entry = outcome.gallery_entry.unwrap();
        assert!(entry.image_path.starts_with(images.path()));
        assert_eq!(entry.candidate.quote, "stay");
        assert_eq!(atelier.gallery().list().len(), 1);
    }

    #[tokio::test]
    async fn quota_aborts_round_without_learning() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let images = TempDir::new().unwrap();
        let atelier = Atelier::new(
            Arc::new(studio_for(&server)),
            Arc::new(MemoryStore::new()),
            StrategyPools::default(),
            50,
            images.path(),
            Some(42),
        );

        let err = atelier
            .generate_pair(&RoundOverrides::default())
            .await
            .unwrap_err();
        assert!(err.is_quota());
        assert!(err.user_message().contains("Wait"));
        assert_eq!(atelier.preferences().total_generations, 0);
        assert!(atelier.gallery().list().is_empty());
    }

    #[tokio::test]
    async fn create_sends_style_and_subject_then_keeps_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(plan_response())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .and(body_partial_json(json!({
                "generationConfig": { "imageConfig": { "aspectRatio": "1:1" } }
            })))
            .respond_with(image_response())
            .expect(1)
            .mount(&server)
            .await;

        let images = TempDir::new().unwrap();
        let atelier = Atelier::new(
            Arc::new(studio_for(&server)),
            Arc::new(MemoryStore::new()),
            StrategyPools::default(),
            50,
            images.path(),
            None,
        );

        let creation = atelier
            .create(
                ArtisticStyle::Ethereal,
                &RoundOverrides {
                    subject: Some("paper lanterns".into()),
                    aspect_ratio: Some(AspectRatio::Square),
                    ..RoundOverrides::default()
                },
            )
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let plan_body = String::from_utf8_lossy(&requests[0].body).to_string();
        assert!(plan_body.contains("Style: ethereal"));
        assert!(plan_body.contains("Subject: paper lanterns"));
        let image_body = String::from_utf8_lossy(&requests[1].body).to_string();
        assert!(image_body.contains("paper lanterns"));

        assert_eq!(creation.rendered.plan.quote, "The fog keeps what we cannot say.");
        let entry = creation.gallery_entry.unwrap();
        assert!(entry.image_path.starts_with(images.path()));
        assert_eq!(atelier.gallery().list().len(), 1);
        assert_eq!(atelier.preferences(), PreferenceRecord::default());
    }

    #[tokio::test]
    async fn create_quota_is_reported_as_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLAN_PATH))
            .respond_with(plan_response())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let images = TempDir::new().unwrap();
        let atelier = Atelier::new(
            Arc::new(studio_for(&server)),
            Arc::new(MemoryStore::new()),
            StrategyPools::default(),
            50,
            images.path(),
            None,
        );

        let err = atelier
            .create(ArtisticStyle::Raw, &RoundOverrides::default())
            .await
            .unwrap_err();
        assert!(err.is_quota());
        assert!(atelier.gallery().list().is_empty());
    }
}
