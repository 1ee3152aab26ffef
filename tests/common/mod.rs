// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::header,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use gamefinder_api::config::Config;
use gamefinder_api::routes::create_router;
use gamefinder_api::services::{OAuthClient, ProviderMetadata, TokenService, UserDirectory};
use gamefinder_api::store::ExpiringMap;
use gamefinder_api::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

/// Authorization endpoint used in assertions; never contacted by tests.
#[allow(dead_code)]
pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Subject/identity asserted by the stub provider.
#[allow(dead_code)]
pub const STUB_SUBJECT: &str = "google-subject-1";
#[allow(dead_code)]
pub const STUB_EMAIL: &str = "player@example.com";
#[allow(dead_code)]
pub const STUB_NAME: &str = "Test Player";
#[allow(dead_code)]
pub const STUB_PICTURE: &str = "https://example.com/avatar.png";

/// Endpoint metadata that never requires network access. Tests that use it
/// must not drive the flow past the pending-state check.
#[allow(dead_code)]
pub fn offline_metadata() -> ProviderMetadata {
    serde_json::from_value(json!({
        "authorization_endpoint": GOOGLE_AUTH_ENDPOINT,
        "token_endpoint": "https://oauth2.googleapis.com/token",
        "userinfo_endpoint": "https://openidconnect.googleapis.com/v1/userinfo",
    }))
    .expect("static metadata must deserialize")
}

/// Spawn a stub identity provider on an ephemeral local port and return
/// endpoint metadata pointing at it. The authorization endpoint stays on
/// accounts.google.com since tests never follow it.
#[allow(dead_code)]
pub async fn spawn_stub_provider() -> ProviderMetadata {
    async fn token() -> Json<Value> {
        Json(json!({
            "access_token": "stub-access-token",
            "token_type": "Bearer",
            "expires_in": 3600,
        }))
    }

    async fn userinfo() -> Json<Value> {
        Json(json!({
            "sub": STUB_SUBJECT,
            "email": STUB_EMAIL,
            "name": STUB_NAME,
            "picture": STUB_PICTURE,
        }))
    }

    let app = Router::new()
        .route("/token", post(token))
        .route("/userinfo", get(userinfo));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub provider");
    let base = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub provider");
    });

    serde_json::from_value(json!({
        "authorization_endpoint": GOOGLE_AUTH_ENDPOINT,
        "token_endpoint": format!("{base}/token"),
        "userinfo_endpoint": format!("{base}/userinfo"),
    }))
    .expect("stub metadata must deserialize")
}

/// Build the app with explicit config and provider metadata.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    metadata: ProviderMetadata,
) -> (Router, Arc<AppState>) {
    let oauth = OAuthClient::with_static_metadata(&config, "google", metadata)
        .expect("static OAuth client");
    let token_service = TokenService::new(config.jwt_secret.clone(), config.token_ttl_secs);

    let state = Arc::new(AppState {
        config,
        users: UserDirectory::default(),
        oauth,
        token_service,
        pending_logins: ExpiringMap::new(),
    });

    (create_router(state.clone()), state)
}

/// Default test app; offline metadata, development config.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::default(), offline_metadata())
}

/// Test app wired to a live stub provider for callback-path tests.
#[allow(dead_code)]
pub async fn create_test_app_with_stub_provider() -> (Router, Arc<AppState>) {
    let metadata = spawn_stub_provider().await;
    create_test_app_with(Config::default(), metadata)
}

/// GET request with optional Cookie header.
#[allow(dead_code)]
pub fn get_request(uri: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

/// All Set-Cookie header values on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Find the Set-Cookie header for a named cookie.
#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

/// Extract the value part of a Set-Cookie header ("name=value; ...").
#[allow(dead_code)]
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_else(|| panic!("malformed Set-Cookie header: {set_cookie}"))
}

/// Location header of a redirect response.
#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Extract a single query parameter from a URL.
#[allow(dead_code)]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
