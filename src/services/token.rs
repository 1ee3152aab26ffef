// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs binding a session to an internal user ID. The
//! service is stateless; there is no revocation list, so logout is purely
//! cookie removal on the client side.

use crate::error::AppError;
use crate::models::User;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (internal user ID)
    pub sub: String,
    /// Email at issue time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: Vec<u8>, ttl_secs: u64) -> Self {
        Self { secret, ttl_secs }
    }

    /// Token lifetime in seconds, as configured.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a signed session token for a user.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
            .as_secs() as usize;

        let claims = SessionClaims {
            sub: user.id.clone(),
            email: Some(user.email.clone()),
            iat: now,
            exp: now + self.ttl_secs as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token signing failed: {}", e)))
    }

    /// Verify a session token and return its claims.
    ///
    /// All failure modes (bad signature, malformed token, expired token)
    /// collapse into `InvalidToken`; callers treat every one of them as
    /// "no session".
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let key = DecodingKey::from_secret(&self.secret);
        let validation = Validation::new(Algorithm::HS256);

        decode::<SessionClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}
