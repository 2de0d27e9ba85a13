use crate::common::{chat_reply, mount_page};
use serde_json::json;
use site_audit::audit::Auditor;
use site_audit::config::Config;
use site_audit::output::{format_audit_report, load_statistics};
use site_audit::service::AuditService;
use site_audit::storage::SqliteStorage;
use site_audit::suggest::{Category, OpenAiClient, SuggestionEngine};
use site_audit::{AuditError, AuditStatus};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_with(dir: &TempDir, engine: SuggestionEngine) -> AuditService<SqliteStorage> {
    let storage =
        SqliteStorage::new(&dir.path().join("audits.db")).expect("Failed to open database");
    let auditor = Auditor::new(&Config::default()).expect("Failed to build auditor");
    AuditService::new(storage, auditor, engine)
}

#[tokio::test]
async fn test_submit_runs_to_completion() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        "<html><head><title>Service Test</title></head><body><h1>Hi</h1></body></html>"
            .to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let service = service_with(&dir, SuggestionEngine::fallback_only());

    let dispatched = service.submit(&site.uri()).await.expect("Submit failed");
    assert_eq!(service.latest_audit_id().unwrap(), Some(dispatched.audit_id));
    dispatched.task.await.expect("Audit task panicked");

    let view = service.status(dispatched.audit_id).unwrap();
    assert_eq!(view.status, AuditStatus::Completed);
    assert!(view.has_results);

    let record = service.get(dispatched.audit_id).unwrap();
    assert_eq!(record.title.as_deref(), Some("Service Test"));
    assert!(format_audit_report(&record).unwrap().contains("Service Test"));

    let stats = service.with_store(|store| load_statistics(store)).unwrap();
    assert_eq!(stats.count(AuditStatus::Completed), 1);
}

#[tokio::test]
async fn test_failed_audit_is_recorded() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let service = service_with(&dir, SuggestionEngine::fallback_only());

    let dispatched = service.submit(&site.uri()).await.unwrap();
    dispatched.task.await.unwrap();

    let record = service.get(dispatched.audit_id).unwrap();
    assert_eq!(record.status, AuditStatus::Failed);
    assert!(record.error_message().unwrap_or_default().contains("500"));

    assert!(matches!(
        service.suggestions(dispatched.audit_id).await,
        Err(AuditError::NotReady {
            status: AuditStatus::Failed,
            ..
        })
    ));
}

#[tokio::test]
async fn test_suggestions_generated_once_and_cached() {
    let site = MockServer::start().await;
    mount_page(&site, "/", "<html><body>Plain</body></html>".to_string()).await;

    let model = MockServer::start().await;
    let reply = json!({
        "seo": [
            { "issue": "Missing title", "suggestion": "Add a descriptive title" },
            { "issue": "Missing H1", "suggestion": "Add a single H1" }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(&reply.to_string())))
        .expect(1)
        .mount(&model)
        .await;

    let client = OpenAiClient::new(
        format!("{}/v1/chat/completions", model.uri()),
        "test-model".to_string(),
        "sk-test".to_string(),
        0.7,
        Duration::from_secs(5),
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let service = service_with(&dir, SuggestionEngine::new(Some(Arc::new(client))));

    let dispatched = service.submit(&site.uri()).await.unwrap();
    dispatched.task.await.unwrap();

    let first = service.suggestions(dispatched.audit_id).await.unwrap();
    let second = service.suggestions(dispatched.audit_id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.get(Category::Seo)[0].issue, "Missing title");
    assert!(first.is_complete());

    let record = service.get(dispatched.audit_id).unwrap();
    assert_eq!(record.suggestions(), Some(&first));
}

#[tokio::test]
async fn test_concurrent_first_access_generates_once() {
    let site = MockServer::start().await;
    mount_page(&site, "/", "<html><body>Plain</body></html>".to_string()).await;

    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("{}")))
        .expect(1)
        .mount(&model)
        .await;

    let client = OpenAiClient::new(
        format!("{}/v1/chat/completions", model.uri()),
        "test-model".to_string(),
        "sk-test".to_string(),
        0.7,
        Duration::from_secs(5),
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let service = service_with(&dir, SuggestionEngine::new(Some(Arc::new(client))));

    let dispatched = service.submit(&site.uri()).await.unwrap();
    dispatched.task.await.unwrap();
    let id = dispatched.audit_id;

    let (a, b) = tokio::join!(service.suggestions(id), service.suggestions(id));
    assert_eq!(a.unwrap(), b.unwrap());
}
