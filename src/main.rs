// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GameFinder API Server
//!
//! Serves the authentication endpoints for the GameFinder frontend:
//! Google OAuth login, session cookies, and the current-user lookup.

use gamefinder_api::{
    config::Config,
    services::{OAuthClient, TokenService, UserDirectory},
    store::ExpiringMap,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        environment = %config.environment,
        "Starting GameFinder API"
    );

    // OAuth client with process-wide provider metadata cache
    let oauth = OAuthClient::new(&config).expect("Failed to initialize OAuth client");

    let token_service = TokenService::new(config.jwt_secret.clone(), config.token_ttl_secs);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        users: UserDirectory::default(),
        oauth,
        token_service,
        pending_logins: ExpiringMap::new(),
    });

    // Build router
    let app = gamefinder_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gamefinder_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
