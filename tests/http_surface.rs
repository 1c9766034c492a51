//! HTTP surface behaviour against shared run state.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use edgelink::config::ServiceConfig;
use edgelink::http::handlers::{GREETING, NOT_READY};
use edgelink::http::{AppState, HttpServer};
use edgelink::process::ProcessSupervisor;
use edgelink::publish::SubscriptionArtifact;
use edgelink::{RunContext, Shutdown, Stage};

mod common;

use common::FakeLauncher;

fn app(config: ServiceConfig) -> (Router, Arc<RunContext>) {
    let context = Arc::new(RunContext::new());
    let server = HttpServer::new(AppState {
        config: Arc::new(config),
        context: context.clone(),
        supervisor: Arc::new(ProcessSupervisor::new(Arc::new(FakeLauncher::default()))),
    });
    (server.router(), context)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_root_returns_greeting() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _context) = app(common::test_config(dir.path()));

    let (status, _, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, GREETING);
}

#[tokio::test]
async fn test_subscription_not_ready_before_publication() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.sub_path = Some("links".to_string());
    // Left over from a previous run; must not be served before cleanup.
    std::fs::write(dir.path().join("sub.txt"), "c3RhbGUK").unwrap();
    let (router, _context) = app(config);

    let (status, content_type, body) = get(&router, "/links").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, NOT_READY);
}

#[tokio::test]
async fn test_subscription_served_from_memory() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.sub_path = Some("links".to_string());
    let (router, context) = app(config);

    let artifact = Arc::new(SubscriptionArtifact::from_descriptors(["vless://example"]));
    context.publish_subscription(artifact.clone());

    let (_, _, body) = get(&router, "/links").await;
    assert_eq!(body, artifact.as_str());
}

#[tokio::test]
async fn test_subscription_falls_back_to_disk_copy() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.sub_path = Some("links".to_string());
    let (router, context) = app(config);

    context.advance(Stage::Published);
    std::fs::write(dir.path().join("sub.txt"), "ZGlzawo=").unwrap();

    let (_, _, body) = get(&router, "/links").await;
    assert_eq!(body, "ZGlzawo=");
}

#[tokio::test]
async fn test_status_reports_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.sub_path = Some("links".to_string());
    let (router, context) = app(config);

    context.advance(Stage::DomainKnown);
    context.publish_domain("edge.trycloudflare.com");

    let (status, _, body) = get(&router, "/status").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["stage"], "domain_known");
    assert_eq!(json["domain"], "edge.trycloudflare.com");
    assert_eq!(json["subscription_ready"], false);
    assert_eq!(json["subscription_path"], "/links");
    assert_eq!(json["front_running"], false);
    assert_eq!(json["backend_running"], false);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (router, _context) = app(common::test_config(dir.path()));

    let (status, _, _) = get(&router, "/definitely-not-configured").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(common::test_config(dir.path()));
    let server = HttpServer::new(AppState {
        config: config.clone(),
        context: Arc::new(RunContext::new()),
        supervisor: Arc::new(ProcessSupervisor::new(Arc::new(FakeLauncher::default()))),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let body = reqwest::get(format!("http://{addr}/{}", config.sub_path()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, NOT_READY);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
