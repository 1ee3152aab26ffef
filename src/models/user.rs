//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User record held by the user directory.
///
/// `(provider, provider_user_id)` is unique across the directory; `id` is
/// the internal identifier that session tokens bind to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal user ID (UUID)
    pub id: String,
    /// Email address asserted by the provider (required)
    pub email: String,
    /// Display name (may be empty if the provider omits it)
    pub name: String,
    /// Avatar URL
    pub picture: Option<String>,
    /// External identity provider name (e.g. "google")
    pub provider: String,
    /// Subject identifier asserted by the provider
    pub provider_user_id: String,
    /// When the user first logged in (RFC 3339)
    pub created_at: String,
    /// Most recent login (RFC 3339)
    pub last_login_at: String,
}

impl User {
    /// Public projection returned to clients.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// Minimal user shape exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// Identity claims fetched from an external provider after login.
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    /// Provider name (e.g. "google")
    pub provider: String,
    /// Provider subject identifier (`sub` claim)
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}
