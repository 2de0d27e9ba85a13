use crate::common::{mount_head, mount_page, spawn_status_server};
use site_audit::audit::{Auditor, LcpCandidate, LengthBand};
use site_audit::config::Config;
use site_audit::AuditError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auditor() -> Auditor {
    Auditor::new(&Config::default()).expect("Failed to build auditor")
}

fn landing_page(status_base: &str) -> String {
    format!(
        r#"<html><head>
        <title>{title}</title>
        <meta name="description" content="{meta}">
        <link rel="canonical" href="/">
        <link rel="stylesheet" href="/style.css">
        <script src="/app.js"></script>
        </head><body>
        <h1>Welcome</h1><h2>One</h2><h2>Two</h2>
        <img src="/thumb.png" alt="Thumbnail">
        <img src="/hero.jpg">
        <a href="/ok">ok</a>
        <a href="/ok">ok again</a>
        <a href="{status_base}/moved">moved</a>
        <a href="/bad">bad</a>
        <a href="{status_base}/gone">gone</a>
        <a href="mailto:team@example.com">mail</a>
        </body></html>"#,
        title = "A".repeat(40),
        meta = "B".repeat(130),
        status_base = status_base,
    )
}

#[tokio::test]
async fn test_full_audit_of_single_page() {
    let server = MockServer::start().await;
    let status_base = spawn_status_server(vec![("/moved", 399), ("/gone", 499)]).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(landing_page(&status_base))
                .insert_header("content-type", "text/html")
                .insert_header("x-frame-options", "DENY")
                .insert_header("strict-transport-security", "max-age=31536000"),
        )
        .mount(&server)
        .await;

    mount_head(&server, "/sitemap.xml", 200, 0).await;
    // robots.txt is left unmounted, so it answers 404

    mount_head(&server, "/app.js", 200, 2048).await;
    mount_head(&server, "/style.css", 200, 1024).await;
    mount_head(&server, "/thumb.png", 200, 512).await;
    mount_head(&server, "/hero.jpg", 200, 4096).await;

    mount_head(&server, "/ok", 200, 0).await;
    mount_head(&server, "/bad", 400, 0).await;

    let result = auditor()
        .audit(&format!("{}/", server.uri()))
        .await
        .expect("Audit failed");
    let features = &result.features;

    // SEO
    assert_eq!(features.seo.title_length, 40);
    assert_eq!(features.seo.title_status, LengthBand::Ideal);
    assert_eq!(features.seo.meta_length, 130);
    assert_eq!(features.seo.meta_status, LengthBand::Ideal);
    assert_eq!(features.seo.h1_count, 1);
    assert_eq!(features.seo.h2_count, 2);
    assert_eq!(features.seo.img_count, 2);
    assert_eq!(features.seo.missing_alt, 1);
    assert!(features.seo.canonical_present);
    assert!(features.seo.sitemap_available);
    assert!(!features.seo.robots_available);

    // Performance
    assert_eq!(features.performance.js_count, 1);
    assert_eq!(features.performance.js_size_kb, 2.0);
    assert_eq!(features.performance.css_size_kb, 1.0);
    assert_eq!(features.performance.external_scripts, 0);
    assert_eq!(features.performance.largest_image_kb, 4.0);
    assert_eq!(
        features.performance.lcp_candidate,
        LcpCandidate::Image(format!("{}/hero.jpg", server.uri()))
    );

    // Security
    assert!(features.security_headers.x_frame_options);
    assert!(features.security_headers.strict_transport_security);
    assert!(!features.security_headers.content_security_policy);
    assert_eq!(result.scores.security, 40);

    // Links: 200 and 399 work; 400, 499 and the mailto: anchor do not.
    // The duplicate is checked once.
    assert_eq!(features.links.working_links, 2);
    assert_eq!(features.links.broken_links, 3);
    // Hosts match regardless of port, and the hostless mailto: is internal
    assert_eq!(features.links.internal_links, 6);
    assert_eq!(features.links.external_links, 0);

    assert!(result.scores.seo <= 100);
    assert!(result.scores.performance <= 100);
}

#[tokio::test]
async fn test_error_page_fails_the_audit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = auditor()
        .audit(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::Fetch { .. }));
}

#[tokio::test]
async fn test_relative_links_resolve_against_final_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/docs/"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/docs/",
        r#"<html><head><title>Docs</title></head><body>
        <a href="intro">Intro</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_head(&server, "/docs/intro", 200, 0).await;

    let features = auditor()
        .run_audit(&format!("{}/old", server.uri()))
        .await
        .expect("Audit failed");

    assert_eq!(features.final_url, format!("{}/docs/", server.uri()));
    assert_eq!(features.url, format!("{}/old", server.uri()));
    assert_eq!(features.links.working_links, 1);
    assert_eq!(features.links.broken_links, 0);
}

#[tokio::test]
async fn test_bare_page_scores() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body><p>Hello</p></body></html>".to_string()).await;

    let result = auditor()
        .audit(&format!("{}/", server.uri()))
        .await
        .expect("Audit failed");

    assert!(!result.features.seo.has_title);
    assert_eq!(result.features.seo.img_count, 0);
    assert_eq!(result.features.links.working_links, 0);
    assert_eq!(result.features.performance.lcp_candidate, LcpCandidate::NotDetected);
    assert_eq!(result.scores.security, 0);
    assert_eq!(result.scores.performance, 100);
}
