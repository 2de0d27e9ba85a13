use crate::common::chat_reply;
use serde_json::json;
use site_audit::audit::FeatureSet;
use site_audit::suggest::{
    fallback_suggestions, Category, OpenAiClient, SuggestionEngine, MIN_PER_CATEGORY,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer) -> SuggestionEngine {
    let client = OpenAiClient::new(
        format!("{}/v1/chat/completions", server.uri()),
        "test-model".to_string(),
        "sk-test".to_string(),
        0.7,
        Duration::from_secs(5),
    )
    .expect("Failed to build client");
    SuggestionEngine::new(Some(Arc::new(client)))
}

fn features() -> FeatureSet {
    let mut features = FeatureSet {
        url: "https://example.com/".to_string(),
        final_url: "https://example.com/".to_string(),
        ..Default::default()
    };
    features.seo.img_count = 4;
    features.seo.missing_alt = 3;
    features
}

#[tokio::test]
async fn test_model_reply_is_used_and_topped_up() {
    let server = MockServer::start().await;
    let reply = json!({
        "seo": [
            { "issue": "Images lack alt text", "suggestion": "Describe all 3 images" },
            { "issue": "No title", "suggestion": "Add a 50 character title" },
            { "issue": "No H1", "suggestion": "Add one H1" }
        ],
        "security": ["Add a Content-Security-Policy header"]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(&reply.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let set = engine_for(&server).suggest(&features()).await;

    assert!(set.is_complete());
    assert_eq!(set.get(Category::Seo).len(), 3);
    assert_eq!(set.get(Category::Seo)[0].issue, "Images lack alt text");

    // A bare string becomes both issue and suggestion
    let security = set.get(Category::Security);
    assert_eq!(security[0].issue, "Add a Content-Security-Policy header");
    assert_eq!(security[0].suggestion, "Add a Content-Security-Policy header");
    assert!(security.len() >= MIN_PER_CATEGORY);

    for category in Category::ALL {
        assert!(set.get(category).len() >= MIN_PER_CATEGORY, "{} too short", category);
    }
}

#[tokio::test]
async fn test_server_error_falls_back_to_rules() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let set = engine_for(&server).suggest(&features()).await;
    assert_eq!(set, fallback_suggestions(&features()));
}

#[tokio::test]
async fn test_malformed_reply_falls_back_to_rules() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("not json at all")))
        .mount(&server)
        .await;

    let set = engine_for(&server).suggest(&features()).await;
    assert_eq!(set, fallback_suggestions(&features()));
    assert!(set.is_complete());
}

#[tokio::test]
async fn test_simple_contract_backfills_missing_lists() {
    let server = MockServer::start().await;
    let reply = json!({
        "seo_fixes": ["Add alt text to 3 images"],
        "security_fixes": []
    });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(&reply.to_string())))
        .mount(&server)
        .await;

    let legacy = engine_for(&server).suggest_simple(&features()).await;
    assert_eq!(legacy.seo_fixes, vec!["Add alt text to 3 images".to_string()]);
    assert!(!legacy.security_fixes.is_empty());
    assert!(!legacy.performance_fixes.is_empty());
    assert!(!legacy.metadata_fixes.is_empty());
    assert!(!legacy.general_recommendations.is_empty());
}
