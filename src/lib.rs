// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GameFinder API Server
//!
//! This crate provides the backend authentication service for the GameFinder
//! web application: Google OAuth login with PKCE, signed session tokens
//! carried in an http-only cookie, and the user directory behind them.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use config::Config;
use routes::auth::PendingLogin;
use services::{OAuthClient, TokenService, UserDirectory};
use store::ExpiringMap;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserDirectory,
    pub oauth: OAuthClient,
    pub token_service: TokenService,
    pub pending_logins: ExpiringMap<PendingLogin>,
}
