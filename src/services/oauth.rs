// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth client adapter for external identity providers.
//!
//! Handles:
//! - OIDC endpoint discovery with a per-provider, process-lifetime cache
//! - PKCE verifier/challenge generation (RFC 7636 S256)
//! - Authorization URL construction
//! - Authorization code exchange and userinfo fetch

use crate::config::Config;
use crate::error::AppError;
use crate::models::ExternalProfile;
use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

const GOOGLE_ISSUER: &str = "https://accounts.google.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Scopes requested at login.
pub const OAUTH_SCOPES: &str = "openid email profile";

/// Provider endpoint metadata from OIDC discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Token response from the provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Userinfo response from the provider's identity endpoint.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// A PKCE verifier/challenge pair (S256).
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

/// Parameters for building an authorization URL.
pub struct AuthorizationParams<'a> {
    pub scope: &'a str,
    pub state: &'a str,
    pub code_challenge: &'a str,
}

enum MetadataSource {
    /// Resolve endpoints via OIDC discovery on first use.
    Discovery,
    /// Fixed endpoints, for deterministic tests.
    Static(HashMap<String, Arc<ProviderMetadata>>),
}

/// OAuth client for the configured identity providers.
///
/// Endpoint metadata is discovered lazily, cached by provider name for the
/// lifetime of the process, and never invalidated; provider metadata is
/// assumed stable within a process lifetime.
pub struct OAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    source: MetadataSource,
    metadata_cache: RwLock<HashMap<String, Arc<ProviderMetadata>>>,
    init_lock: Mutex<()>,
}

impl OAuthClient {
    /// Create a production client that discovers provider endpoints.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::build(config, MetadataSource::Discovery)
    }

    /// Create a client with fixed endpoint metadata for one provider.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn with_static_metadata(
        config: &Config,
        provider: impl Into<String>,
        metadata: ProviderMetadata,
    ) -> anyhow::Result<Self> {
        let mut endpoints = HashMap::new();
        endpoints.insert(provider.into(), Arc::new(metadata));
        Self::build(config, MetadataSource::Static(endpoints))
    }

    fn build(config: &Config, source: MetadataSource) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            source,
            metadata_cache: RwLock::new(HashMap::new()),
            init_lock: Mutex::new(()),
        })
    }

    /// Resolve endpoint metadata for a provider, fetching it on first use.
    pub async fn discover(&self, provider: &str) -> Result<Arc<ProviderMetadata>, AppError> {
        if let MetadataSource::Static(endpoints) = &self.source {
            return endpoints.get(provider).cloned().ok_or_else(|| {
                AppError::ProviderUnavailable(format!("unsupported provider: {provider}"))
            });
        }

        if let Some(metadata) = self.metadata_cache.read().await.get(provider) {
            return Ok(metadata.clone());
        }

        let issuer = issuer_for(provider)?;

        // Serialize initialization so a burst of first logins produces a
        // single discovery request.
        let _guard = self.init_lock.lock().await;
        if let Some(metadata) = self.metadata_cache.read().await.get(provider) {
            return Ok(metadata.clone());
        }

        let url = format!("{issuer}/.well-known/openid-configuration");
        tracing::debug!(provider = %provider, url = %url, "Fetching OIDC discovery document");

        let response = self.http.get(&url).send().await.map_err(|e| {
            AppError::ProviderUnavailable(format!("discovery request failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ProviderUnavailable(format!(
                "discovery returned status {}",
                response.status()
            )));
        }

        let metadata: ProviderMetadata = response.json().await.map_err(|e| {
            AppError::ProviderUnavailable(format!("invalid discovery document: {e}"))
        })?;

        let metadata = Arc::new(metadata);
        self.metadata_cache
            .write()
            .await
            .insert(provider.to_string(), metadata.clone());

        tracing::info!(provider = %provider, "Cached provider endpoint metadata");
        Ok(metadata)
    }

    /// Build the provider authorization URL. Pure construction, no I/O.
    pub fn authorization_url(
        &self,
        metadata: &ProviderMetadata,
        params: &AuthorizationParams<'_>,
    ) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
             code_challenge={}&code_challenge_method=S256&state={}",
            metadata.authorization_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(params.scope),
            urlencoding::encode(params.code_challenge),
            urlencoding::encode(params.state),
        )
    }

    /// Exchange an authorization code for a token set.
    ///
    /// Single attempt; any transport error or non-success response is
    /// surfaced as `ExchangeFailed` and not retried.
    pub async fn exchange_code(
        &self,
        metadata: &ProviderMetadata,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, AppError> {
        let response = self
            .http
            .post(&metadata.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExchangeFailed(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExchangeFailed(format!("invalid token response: {e}")))
    }

    /// Fetch the external identity behind a token set.
    ///
    /// The email claim is a hard requirement; a response without one fails
    /// with `IdentityFetchFailed`.
    pub async fn fetch_identity(
        &self,
        provider: &str,
        metadata: &ProviderMetadata,
        tokens: &TokenSet,
    ) -> Result<ExternalProfile, AppError> {
        let response = self
            .http
            .get(&metadata.userinfo_endpoint)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityFetchFailed(format!("userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::IdentityFetchFailed(format!(
                "userinfo returned status {}",
                response.status()
            )));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| AppError::IdentityFetchFailed(format!("invalid userinfo: {e}")))?;

        let email = info
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                AppError::IdentityFetchFailed("userinfo did not include an email claim".to_string())
            })?;

        Ok(ExternalProfile {
            provider: provider.to_string(),
            subject: info.sub,
            email,
            name: info.name.unwrap_or_default(),
            picture: info.picture,
        })
    }
}

fn issuer_for(provider: &str) -> Result<&'static str, AppError> {
    match provider {
        "google" => Ok(GOOGLE_ISSUER),
        _ => Err(AppError::ProviderUnavailable(format!(
            "unsupported provider: {provider}"
        ))),
    }
}

/// Generate a PKCE verifier/challenge pair.
///
/// Verifier: 32 random bytes, base64url without padding (43 chars).
/// Challenge: base64url(SHA-256(verifier)), per RFC 7636 section 4.2.
pub fn generate_pkce() -> PkcePair {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let verifier = URL_SAFE_NO_PAD.encode(bytes);

    let digest = Sha256::digest(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(digest.as_slice());

    PkcePair {
        verifier,
        challenge,
    }
}

/// Generate an unguessable login state token (32 random bytes, base64url).
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
