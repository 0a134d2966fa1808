//! Router wired to a real GitHub provider (against mockito) and a directory
//! asset store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use get_opentofu::asset::DirAssetStore;
use get_opentofu::config::UpstreamConfig;
use get_opentofu::server::{AppState, router};
use mockito::Server;
use tempfile::TempDir;
use tower::ServiceExt;

fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("install-opentofu.sh"), "#!/bin/sh\necho sh\n").unwrap();
    std::fs::write(dir.path().join("install-opentofu.ps1"), "Write-Output ps1\n").unwrap();
    std::fs::write(dir.path().join("index.sh"), "#!/bin/sh\necho index\n").unwrap();
    dir
}

fn app(api_url: &str, public: &TempDir) -> axum::Router {
    let config = UpstreamConfig {
        api_url: api_url.to_string(),
        ..UpstreamConfig::default()
    };
    let provider = config.provider(config.client().unwrap()).unwrap();
    let assets = DirAssetStore::new(public.path());
    router(AppState::new(Arc::new(provider), Arc::new(assets)))
}

fn get(uri: &str, user_agent: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(ua) = user_agent {
        builder = builder.header(header::USER_AGENT, ua);
    }
    builder.body(Body::empty()).unwrap()
}

fn header_value(response: &Response, name: header::HeaderName) -> String {
    response.headers()[name].to_str().unwrap().to_string()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_installer_serves_platform_script() {
    let server = Server::new_async().await;
    let public = public_dir();

    let response = app(&server.url(), &public)
        .oneshot(get("/install-opentofu", Some("Mozilla/5.0 (Windows NT 10.0)")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=install-opentofu.ps1"
    );
    assert_eq!(body_string(response).await, "Write-Output ps1\n");

    let response = app(&server.url(), &public)
        .oneshot(get("/install-opentofu.ps1", Some("curl/8.4.0")))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "#!/bin/sh\necho sh\n");
}

#[tokio::test]
async fn test_root_installer_uses_shared_asset() {
    let server = Server::new_async().await;
    let public = public_dir();

    let response = app(&server.url(), &public)
        .oneshot(get("/", Some("windows")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), "text/x-shellscript");
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=opentofu-install.ps1"
    );
    assert_eq!(header_value(&response, header::VARY), "user-agent");
    assert_eq!(body_string(response).await, "#!/bin/sh\necho index\n");
}

#[tokio::test]
async fn test_installer_missing_asset_passes_through_404() {
    let server = Server::new_async().await;
    let empty = tempfile::tempdir().unwrap();

    let response = app(&server.url(), &empty)
        .oneshot(get("/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header_value(&response, header::VARY), "user-agent");
}

#[tokio::test]
async fn test_release_list_proxies_upstream() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/opentofu/opentofu/releases")
        .match_header("user-agent", "OpenTofu Releases Page")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "v1.6.0"}, {"name": "v1.5.0"}]"#)
        .create_async()
        .await;
    let public = public_dir();

    let response = app(&server.url(), &public)
        .oneshot(get("/releases", None))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CACHE_CONTROL), "max-age=3600");
    let body = body_string(response).await;
    assert!(body.contains(r#"<li><a href="/releases/1.6.0">1.6.0</a></li><li><a href="/releases/1.5.0">1.5.0</a></li>"#));
}

#[tokio::test]
async fn test_release_detail_proxies_upstream() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/opentofu/opentofu/releases/tags/v1.6.0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"assets": [{"name": "tofu_1.6.0_linux_amd64.zip", "browser_download_url": "https://example/x.zip"}]}"#,
        )
        .create_async()
        .await;
    let public = public_dir();

    let response = app(&server.url(), &public)
        .oneshot(get("/releases/1.6.0", None))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        "text/html; charset=utf-8"
    );
    assert_eq!(header_value(&response, header::CACHE_CONTROL), "max-age=31556926");
    let body = body_string(response).await;
    assert!(body.contains(r#"<li><a href="/releases/">../</a></li>"#));
    assert!(body.contains(r#"<a href="https://example/x.zip">tofu_1.6.0_linux_amd64.zip</a>"#));
}

#[tokio::test]
async fn test_release_detail_upstream_404_is_500() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/repos/opentofu/opentofu/releases/tags/v0.0.0")
        .with_status(404)
        .create_async()
        .await;
    let public = public_dir();

    let response = app(&server.url(), &public)
        .oneshot(get("/releases/0.0.0", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        "text/html; charset=utf-8"
    );
    assert!(body_string(response).await.starts_with("Not found"));
}

#[tokio::test]
async fn test_release_list_unreachable_upstream_is_500() {
    let public = public_dir();

    let response = app("http://127.0.0.1:9", &public)
        .oneshot(get("/releases", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body_string(response).await.is_empty());
}
