// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session middleware behavior through the real router.
//!
//! A bad cookie must never error or block a request; it downgrades the
//! request to unauthenticated and is cleared on the response.

use axum::http::StatusCode;
use gamefinder_api::models::ExternalProfile;
use tower::ServiceExt;

mod common;

fn stub_profile() -> ExternalProfile {
    ExternalProfile {
        provider: "google".to_string(),
        subject: common::STUB_SUBJECT.to_string(),
        email: common::STUB_EMAIL.to_string(),
        name: common::STUB_NAME.to_string(),
        picture: Some(common::STUB_PICTURE.to_string()),
    }
}

#[tokio::test]
async fn test_me_without_cookie_is_unauthorized() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::get_request("/auth/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "authentication_required");
}

#[tokio::test]
async fn test_me_with_valid_session() {
    let (app, state) = common::create_test_app();

    let user = state.users.upsert(stub_profile());
    let token = state.token_service.issue(&user).unwrap();

    let response = app
        .oneshot(common::get_request(
            "/auth/me",
            Some(&format!("access_token={token}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["id"], user.id);
    assert_eq!(body["email"], common::STUB_EMAIL);
    assert_eq!(body["name"], common::STUB_NAME);
}

#[tokio::test]
async fn test_me_with_tampered_token_is_unauthorized_and_clears_cookie() {
    let (app, state) = common::create_test_app();

    let user = state.users.upsert(stub_profile());
    let token = state.token_service.issue(&user).unwrap();

    // Corrupt a single byte of the signature.
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = app
        .oneshot(common::get_request(
            "/auth/me",
            Some(&format!("access_token={tampered}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookies = common::set_cookie_headers(&response);
    let removal = common::find_cookie(&cookies, "access_token");
    assert!(removal.contains("Max-Age=0"));
    assert_eq!(common::cookie_value(&removal), "");
}

#[tokio::test]
async fn test_me_with_token_for_missing_user_is_unauthorized() {
    let (app, state) = common::create_test_app();

    // Valid signature, but the subject was never stored in the directory.
    let ghost = gamefinder_api::models::User {
        id: "no-such-user".to_string(),
        email: "ghost@example.com".to_string(),
        name: "Ghost".to_string(),
        picture: None,
        provider: "google".to_string(),
        provider_user_id: "ghost-subject".to_string(),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        last_login_at: "2026-01-01T00:00:00Z".to_string(),
    };
    let token = state.token_service.issue(&ghost).unwrap();

    let response = app
        .oneshot(common::get_request(
            "/auth/me",
            Some(&format!("access_token={token}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_cookie_does_not_block_public_routes() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::get_request(
            "/health",
            Some("access_token=definitely-not-a-jwt"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // The stale cookie is cleared even on a public route.
    let cookies = common::set_cookie_headers(&response);
    let removal = common::find_cookie(&cookies, "access_token");
    assert!(removal.contains("Max-Age=0"));
}
