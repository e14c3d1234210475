//! WebExtractor against a local HTTP server.

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use skimmer_config::ExtractionConfig;
use skimmer_core::error::ExtractionError;
use skimmer_core::extractor::Extractor;
use skimmer_extract::WebExtractor;
use std::time::Duration;

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Ignored</title><style>p { margin: 0 }</style></head>
<body>
  <script>window.tracking = true;</script>
  <!-- navigation -->
  <h1>Ownership &amp; Borrowing</h1>
  <p>Every value in Rust has a single owner. When the owner goes out of scope,
     the value is dropped.</p>
  <p>References let you use a value without taking ownership of it.</p>
</body>
</html>"#;

async fn serve() -> String {
    let app = Router::new()
        .route("/article", get(|| async { Html(ARTICLE) }))
        .route("/short", get(|| async { Html("<p>Too short.</p>") }))
        .route(
            "/json",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{\"a\":1}") }),
        )
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "nope").into_response() }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html(ARTICLE)
            }),
        )
        .route(
            "/huge",
            get(|| async { Html(format!("<p>{}</p>", "word ".repeat(100_000))) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn extractor() -> WebExtractor {
    WebExtractor::from_config(&ExtractionConfig::default()).unwrap()
}

#[tokio::test]
async fn extracts_readable_text() {
    let base = serve().await;
    let text = extractor().extract(&format!("{base}/article")).await.unwrap();

    assert!(text.starts_with("Ownership & Borrowing"));
    assert!(text.contains("Every value in Rust has a single owner. When the owner goes out of scope, the value is dropped."));
    assert!(!text.contains("tracking"));
    assert!(!text.contains("Ignored"));
    assert!(!text.contains("navigation"));
}

#[tokio::test]
async fn short_pages_are_rejected() {
    let base = serve().await;
    let err = extractor().extract(&format!("{base}/short")).await.unwrap_err();
    assert!(matches!(err, ExtractionError::TooShort { min: 50, .. }));
}

#[tokio::test]
async fn non_html_is_rejected() {
    let base = serve().await;
    let err = extractor().extract(&format!("{base}/json")).await.unwrap_err();
    assert!(matches!(err, ExtractionError::NotHtml { content_type } if content_type == "application/json"));
}

#[tokio::test]
async fn error_status_is_reported() {
    let base = serve().await;
    let err = extractor().extract(&format!("{base}/missing")).await.unwrap_err();
    assert!(matches!(err, ExtractionError::HttpStatus { status: 404 }));
}

#[tokio::test]
async fn slow_pages_time_out() {
    let base = serve().await;
    let extractor = extractor().with_timeout(Duration::from_millis(200)).unwrap();
    let err = extractor.extract(&format!("{base}/slow")).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Timeout { .. }));
}

#[tokio::test]
async fn oversized_bodies_are_capped() {
    let base = serve().await;
    let config = ExtractionConfig {
        max_body_bytes: 4096,
        ..ExtractionConfig::default()
    };
    let extractor = WebExtractor::from_config(&config).unwrap();
    let text = extractor.extract(&format!("{base}/huge")).await.unwrap();
    assert!(text.len() <= 4096);
    assert!(text.starts_with("word word"));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = extractor().extract(&format!("http://{addr}/")).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Network(_)));
}

#[tokio::test]
async fn bad_scheme_fails_before_io() {
    let err = extractor().extract("mailto:someone@example.com").await.unwrap_err();
    assert!(matches!(err, ExtractionError::UnsupportedScheme(_)));
}
