//! Integration tests for AppController against a mock Gemini API.

use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use viralflow::app::{AppController, AppMode, Session};
use viralflow::content::{ContentBody, Format, UserInputs, ViralContent};
use viralflow::export::{ExportKind, Exporter, Rasterizer};
use viralflow::gemini::{GatewayConfig, GeminiClient, DEFAULT_TEXT_MODEL};
use viralflow::video::{PollPolicy, VideoCache};

fn controller_for(server: &MockServer) -> AppController {
    let client = GeminiClient::new(
        GatewayConfig::default()
            .with_api_key("test-key")
            .with_base_url(server.uri()),
    )
    .unwrap();
    AppController::with_exporter(client, Exporter::new(Rasterizer::with_scale(1)))
        .with_poll_policy(PollPolicy::default().with_interval(Duration::from_millis(10)))
        .with_status_interval(Duration::from_millis(5))
}

async fn mount_text(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", DEFAULT_TEXT_MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
        .mount(server)
        .await;
}

fn carousel_json(n: u32) -> String {
    let parts: Vec<Value> = (1..=n)
        .map(|i| json!({ "partNumber": i, "title": format!("Slide {}", i), "body": "b" }))
        .collect();
    json!({
        "contentParts": parts,
        "captions": ["A", "B"],
        "hashtags": ["x", "#y"],
        "nextTopicSuggestion": "next"
    })
    .to_string()
}

#[tokio::test]
async fn test_generate_stores_content() {
    let server = MockServer::start().await;
    mount_text(&server, &carousel_json(4)).await;

    let mut app = controller_for(&server);
    app.generate().await;

    assert!(!app.is_loading());
    assert!(app.error().is_none());
    assert_eq!(app.content().unwrap().parts().unwrap().len(), 4);
    assert_eq!(app.current_part(), 0);
}

#[tokio::test]
async fn test_generate_empty_response_message() {
    let server = MockServer::start().await;
    mount_text(&server, "").await;

    let mut app = controller_for(&server);
    app.generate().await;

    assert!(!app.is_loading());
    assert!(app.content().is_none());
    assert_eq!(
        app.error(),
        Some("Failed to generate content. The AI returned an unexpected response.")
    );
}

#[tokio::test]
async fn test_optimize_and_select_alternative() {
    let server = MockServer::start().await;
    mount_text(
        &server,
        &json!([
            { "partNumber": 1, "title": "Original", "body": "b", "viralScore": 50, "rationale": "r" },
            { "partNumber": 1, "title": "Alt 1", "body": "b", "viralScore": 70, "rationale": "r" },
            { "partNumber": 1, "title": "Alt 2", "body": "b2", "viralScore": 90, "rationale": "r" },
            { "partNumber": 1, "title": "Alt 3", "body": "b", "viralScore": 60, "rationale": "r" }
        ])
        .to_string(),
    )
    .await;

    let mut app = controller_for(&server);
    let content: ViralContent = ViralContent {
        body: ContentBody::Carousel(
            (1..=3)
                .map(|i| viralflow::content::ContentPart {
                    part_number: i,
                    title: format!("Slide {}", i),
                    body: "b".to_string(),
                    highlight: None,
                })
                .collect(),
        ),
        captions: vec![],
        hashtags: vec![],
        next_topic_suggestion: String::new(),
    };
    app.set_content(content);

    app.start_optimization().await;
    assert!(!app.is_optimizing());
    assert_eq!(app.optimized().unwrap().len(), 4);

    assert!(app.select_optimized(2));
    assert!(app.optimized().is_none());
    let parts = app.content().unwrap().parts().unwrap();
    assert_eq!(parts[0].title, "Alt 2");
    assert_eq!(parts[0].body, "b2");
    assert_eq!(parts[1].title, "Slide 2");
    assert_eq!(parts.len(), 3);
}

#[tokio::test]
async fn test_generate_video_downloads_and_clears_status() {
    let server = MockServer::start().await;
    let file_uri = format!("{}/files/v.mp4", server.uri());
    Mock::given(method("POST"))
        .and(path("/v1beta/models/veo-2.0-generate-001:predictLongRunning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-9" })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/operations/op-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-9",
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [
                { "video": { "uri": file_uri } }
            ] } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/v.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"VIDEO".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut app = controller_for(&server)
        .with_video_cache(VideoCache::new(temp.path().to_path_buf()), 10);
    app.inputs_mut().set_format(Format::VideoScript);
    app.set_content(ViralContent {
        body: ContentBody::Script("Hook. Body. CTA.".to_string()),
        captions: vec![],
        hashtags: vec![],
        next_topic_suggestion: String::new(),
    });

    app.generate_video().await;

    assert!(app.error().is_none());
    assert!(!app.is_generating_video());
    assert_eq!(app.video_status(), "");
    assert_eq!(app.video().unwrap().bytes, b"VIDEO");
    let cached = app.video_path().unwrap().clone();
    assert_eq!(std::fs::read(&cached).unwrap(), b"VIDEO");

    // A second run for the same script starts a new job even though a copy is cached.
    app.generate_video().await;
    assert!(app.error().is_none());
    assert_eq!(app.video().unwrap().operation, "operations/op-9");
    assert_eq!(app.video().unwrap().bytes, b"VIDEO");
    assert_eq!(app.video_path(), Some(&cached));
}

#[tokio::test]
async fn test_generate_video_failure_sets_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true
        })))
        .mount(&server)
        .await;

    let mut app = controller_for(&server);
    app.set_content(ViralContent {
        body: ContentBody::Script("s".to_string()),
        captions: vec![],
        hashtags: vec![],
        next_topic_suggestion: String::new(),
    });
    app.generate_video().await;

    assert_eq!(
        app.error(),
        Some("Video generation completed, but no download link was provided.")
    );
    assert!(app.video().is_none());
    assert_eq!(app.video_status(), "");
}

#[tokio::test]
async fn test_mode_switch_clears_results() {
    let server = MockServer::start().await;
    mount_text(&server, &carousel_json(3)).await;

    let mut app = controller_for(&server);
    app.generate().await;
    assert!(app.content().is_some());

    app.set_mode(AppMode::Analyze);
    assert_eq!(app.mode(), AppMode::Analyze);
    assert!(app.content().is_none());
    assert!(app.error().is_none());
}

#[tokio::test]
async fn test_session_round_trip_then_export_zip() {
    let server = MockServer::start().await;
    mount_text(&server, &carousel_json(3)).await;

    let mut app = controller_for(&server);
    app.generate().await;

    let temp = TempDir::new().unwrap();
    let session_path = temp.path().join("session.json");
    app.session().unwrap().save(&session_path).unwrap();

    let mut restored = controller_for(&server);
    restored.load_session(Session::load(&session_path).unwrap());
    assert_eq!(restored.inputs(), &UserInputs::default());

    let artifact = restored.export(ExportKind::Zip).unwrap();
    assert_eq!(artifact.file_name, "Why_most_diets_fail.zip");
    assert!(!restored.is_exporting());
    assert!(restored.error().is_none());
}

#[tokio::test]
async fn test_loaded_session_with_bad_colors_exports() {
    let server = MockServer::start().await;
    mount_text(&server, &carousel_json(3)).await;

    let mut app = controller_for(&server);
    app.generate().await;
    let mut session = app.session().unwrap();
    session.inputs.text_color = "#a\u{e9}bcd".to_string();
    session.inputs.highlight_color = "#\u{e9}\u{e9}\u{e9}".to_string();
    session.inputs.title_color = "#0F1".to_string();

    let mut restored = controller_for(&server);
    restored.load_session(session);
    let defaults = UserInputs::default();
    assert_eq!(restored.inputs().text_color, defaults.text_color);
    assert_eq!(restored.inputs().highlight_color, defaults.highlight_color);
    assert_eq!(restored.inputs().title_color, "#0F1000");

    let artifact = restored.export(ExportKind::Png).unwrap();
    assert!(image::load_from_memory(&artifact.bytes).is_ok());
}
