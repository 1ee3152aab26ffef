// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session middleware: resolves the caller's identity from the session
//! cookie.
//!
//! `authenticate` never blocks a request; it only attaches an `AuthSession`
//! extension. Route-level protection is the job of `require_auth`.

use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Resolved session attached to every request.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub user: Option<User>,
}

impl AuthSession {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Middleware that resolves the session cookie into an `AuthSession`.
///
/// A missing cookie leaves the request unauthenticated. An invalid or
/// expired token also leaves it unauthenticated and clears the cookie on
/// the response, so a stale cookie heals itself on the next round trip. A
/// token whose user no longer exists is treated the same way.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut session = AuthSession::default();
    let mut clear_stale_cookie = false;

    if let Some(cookie) = jar.get(&state.config.cookie_name) {
        match state.token_service.verify(cookie.value()) {
            Ok(claims) => match state.users.find_by_id(&claims.sub) {
                Some(user) => session.user = Some(user),
                None => {
                    tracing::debug!(
                        subject = %claims.sub,
                        "Session token references a user that no longer exists"
                    );
                    clear_stale_cookie = true;
                }
            },
            Err(_) => {
                tracing::debug!("Rejected session cookie with invalid token");
                clear_stale_cookie = true;
            }
        }
    }

    request.extensions_mut().insert(session);
    let mut response = next.run(request).await;

    if clear_stale_cookie {
        if let Ok(value) = HeaderValue::from_str(&removal_cookie(&state.config).to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Route-layer guard that rejects unauthenticated requests.
pub async fn require_auth(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<AuthSession>()
        .is_some_and(AuthSession::is_authenticated);

    if !authenticated {
        return AppError::AuthRequired.into_response();
    }

    next.run(request).await
}

/// Build the session cookie carrying a freshly issued token.
///
/// Development keeps SameSite=Lax over plain http; production runs the
/// frontend and API on different origins, which requires SameSite=None and
/// therefore Secure.
pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = base_cookie(config, token);
    cookie.set_max_age(time::Duration::seconds(config.token_ttl_secs as i64));
    cookie
}

/// Build the removal cookie used by logout and stale-cookie cleanup.
///
/// Attributes must match the creation attributes or browsers keep the
/// original cookie alive.
pub fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = base_cookie(config, String::new());
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

fn base_cookie(config: &Config, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.cookie_name.clone(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(config.is_production());
    cookie.set_same_site(if config.is_production() {
        SameSite::None
    } else {
        SameSite::Lax
    });
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}
