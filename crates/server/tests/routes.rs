use std::fs;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use clap::Parser;
use server::{app, Cli};
use tempfile::TempDir;
use tower::ServiceExt;

const SHELL: &str = "<!doctype html><title>Car Wash Manager</title>";

fn setup() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), SHELL).unwrap();
    fs::write(dir.path().join("main.dart.js"), "main()").unwrap();

    let args = Cli::parse_from([
        "server",
        "--static-path",
        dir.path().to_str().unwrap(),
        "--worker-path",
        "/sw/service_worker.js",
    ]);
    (dir, app(&args))
}

async fn get(app: Router, uri: &str) -> (StatusCode, header::HeaderMap, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_worker_script_can_claim_root_scope() {
    let (_dir, app) = setup();

    let (status, headers, body) = get(app, "/sw/service_worker.js").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["service-worker-allowed"], "/");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::CONTENT_TYPE], "text/javascript");
    assert!(body.contains("importScripts('/wasm/service_worker.js');"));
    assert!(body.contains("self.addEventListener('fetch'"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let (_dir, app) = setup();

    let (status, headers, body) = get(app, "/main.dart.js").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "main()");
    assert!(headers.get("service-worker-allowed").is_none());
}

#[tokio::test]
async fn test_client_routes_get_the_shell() {
    let (_dir, app) = setup();

    let (status, _, body) = get(app, "/orders/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SHELL);
}
