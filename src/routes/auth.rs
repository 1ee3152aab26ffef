// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth authentication routes.
//!
//! The login flow is authorization-code with PKCE:
//! - `/auth/{provider}` stores a pending login keyed by a random state
//!   token and redirects to the provider.
//! - `/auth/{provider}/callback` consumes the state exactly once, exchanges
//!   the code, upserts the user, and sets the session cookie.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::middleware::session::{removal_cookie, session_cookie};
use crate::middleware::AuthSession;
use crate::models::PublicUser;
use crate::services::oauth::{
    generate_pkce, generate_state_token, AuthorizationParams, OAUTH_SCOPES,
};
use crate::AppState;

/// How long an initiated login may wait for its callback.
const LOGIN_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Ephemeral per-login state, stored under the state token between the
/// redirect to the provider and the callback.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub code_verifier: String,
    pub redirect_path: String,
    pub created_at: DateTime<Utc>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", get(logout))
        .route("/auth/{provider}", get(login_start))
        .route("/auth/{provider}/callback", get(login_callback))
}

/// Routes behind the auth guard (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}

/// Query parameters for starting the login flow.
#[derive(Deserialize)]
pub struct LoginParams {
    /// Frontend path to land on after login completes.
    #[serde(default)]
    redirect: Option<String>,
}

/// Start the login flow - redirect to the provider's authorization page.
async fn login_start(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<LoginParams>,
) -> Result<Response> {
    let metadata = state.oauth.discover(&provider).await?;

    let redirect_path = sanitize_redirect_path(params.redirect.as_deref());
    let state_token = generate_state_token();
    let pkce = generate_pkce();

    state.pending_logins.insert_with_ttl(
        state_token.clone(),
        PendingLogin {
            code_verifier: pkce.verifier,
            redirect_path,
            created_at: Utc::now(),
        },
        LOGIN_STATE_TTL,
    );

    let auth_url = state.oauth.authorization_url(
        &metadata,
        &AuthorizationParams {
            scope: OAUTH_SCOPES,
            state: &state_token,
            code_challenge: &pkce.challenge,
        },
    );

    tracing::info!(provider = %provider, "Starting login, redirecting to provider");

    Ok(redirect_found(&auth_url))
}

/// Query parameters on the provider callback.
#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Provider callback - consume the pending login, exchange the code, and
/// establish the session.
async fn login_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = &params.error {
        tracing::warn!(provider = %provider, error = %error, "Provider returned an error");
    }

    let (code, state_token) = match (params.code, params.state) {
        (Some(code), Some(state_token)) if !code.is_empty() && !state_token.is_empty() => {
            (code, state_token)
        }
        _ => {
            return Err(AppError::MissingParameters(
                "callback requires code and state".to_string(),
            ))
        }
    };

    // Consume-once: removing the entry up front means a duplicate or
    // replayed callback takes the not-found path, and no network call has
    // happened yet for either request.
    let pending = state
        .pending_logins
        .remove_if_present(&state_token)
        .ok_or(AppError::UnknownOrExpiredState)?;

    let metadata = state.oauth.discover(&provider).await?;

    let tokens = state
        .oauth
        .exchange_code(&metadata, &code, &pending.code_verifier)
        .await?;

    let profile = state
        .oauth
        .fetch_identity(&provider, &metadata, &tokens)
        .await?;

    let user = state.users.upsert(profile);
    let token = state.token_service.issue(&user)?;

    tracing::info!(
        user_id = %user.id,
        provider = %provider,
        "Login completed, session established"
    );

    let jar = jar.add(session_cookie(&state.config, token));
    let destination = format!("{}{}", state.config.frontend_url, pending.redirect_path);

    Ok((jar, redirect_found(&destination)).into_response())
}

/// Logout - clear the session cookie and return to the frontend.
///
/// Client-side only; issued tokens stay valid until they expire.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = jar.add(removal_cookie(&state.config));
    (jar, redirect_found(&state.config.frontend_url)).into_response()
}

/// Current user profile.
async fn me(Extension(session): Extension<AuthSession>) -> Result<Json<PublicUser>> {
    let user = session.user.ok_or(AppError::AuthRequired)?;
    Ok(Json(user.public()))
}

/// A 302 Found redirect.
fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Reduce a caller-supplied redirect target to a same-origin path.
///
/// The final redirect is always `frontend_url` + path; anything that could
/// escape the frontend origin (absolute URLs, scheme-relative `//`, path
/// traversal, embedded schemes) falls back to "/".
fn sanitize_redirect_path(redirect: Option<&str>) -> String {
    match redirect {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains("..")
                && !path.contains(':')
                && !path.contains('\\') =>
        {
            path.to_string()
        }
        Some(other) => {
            tracing::warn!(redirect = %other, "Discarding unsafe redirect target");
            "/".to_string()
        }
        None => "/".to_string(),
    }
}
