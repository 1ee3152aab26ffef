// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod oauth;
pub mod token;
pub mod users;

pub use oauth::{OAuthClient, ProviderMetadata, TokenSet};
pub use token::{SessionClaims, TokenService};
pub use users::UserDirectory;
