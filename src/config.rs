//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see the cached
//! `Config` inside the shared state.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment ("development" or "production")
    pub environment: String,
    /// Server port
    pub port: u16,
    /// Frontend origin for post-login redirects and CORS
    pub frontend_url: String,
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Redirect URI registered with Google
    pub google_redirect_uri: String,
    /// HMAC key for session token signing (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// Session token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Cookie domain (unset for host-only cookies)
    pub cookie_domain: Option<String>,
}

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3001,
            frontend_url: "http://localhost:3000".to_string(),
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_client_secret".to_string(),
            google_redirect_uri: "http://localhost:3001/auth/google/callback".to_string(),
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            token_ttl_secs: 24 * 60 * 60,
            cookie_name: "access_token".to_string(),
            cookie_domain: None,
        }
    }
}

impl Config {
    /// Whether we are running with production cookie/security settings.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Load configuration from environment variables.
    ///
    /// Missing OAuth credentials are tolerated so the server can still come
    /// up for frontend development; login will fail until they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment =
            env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_production = environment == "production";

        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
        if google_client_id.is_empty() || google_client_secret.is_empty() {
            tracing::warn!(
                "Google OAuth credentials not configured; authentication will not work"
            );
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if is_production {
                tracing::error!("JWT_SECRET is unset in production; using the dev default");
            } else {
                tracing::warn!("JWT_SECRET is unset; using the dev default");
            }
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            environment,
            port: parse_var("PORT", 3001)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            google_client_id,
            google_client_secret,
            google_redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                "http://localhost:3001/auth/google/callback".to_string()
            }),
            jwt_secret: jwt_secret.into_bytes(),
            token_ttl_secs: parse_var("TOKEN_TTL_SECS", 24 * 60 * 60)?,
            cookie_name: env::var("COOKIE_NAME").unwrap_or_else(|_| "access_token".to_string()),
            cookie_domain: env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
        })
    }
}

/// Parse a numeric environment variable, falling back to a default when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
