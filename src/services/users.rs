// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory user directory keyed by external provider identity.
//!
//! Process-local stand-in for a database table with a uniqueness constraint
//! on `(provider, provider_user_id)`. Upsert is the only mutation path;
//! records are never deleted by the auth flow.

use crate::models::{ExternalProfile, User};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

type ProviderKey = (String, String);

/// Looks up and creates user records.
#[derive(Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
    provider_index: DashMap<ProviderKey, String>,
}

impl UserDirectory {
    /// Find a user by internal ID.
    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|user| user.clone())
    }

    /// Find a user by `(provider, subject)`; index-backed, at most one match.
    pub fn find_by_provider_identity(&self, provider: &str, subject: &str) -> Option<User> {
        let key = (provider.to_string(), subject.to_string());
        let id = self.provider_index.get(&key)?.clone();
        self.find_by_id(&id)
    }

    /// Create or update the user for an external profile.
    ///
    /// An existing record keeps its `id` and `created_at`; the mutable
    /// fields (email, name, picture) are overwritten and `last_login_at`
    /// refreshed. The index entry lock is held across the check-then-write,
    /// so concurrent logins by the same external account always converge on
    /// one record.
    pub fn upsert(&self, profile: ExternalProfile) -> User {
        let key = (profile.provider.clone(), profile.subject.clone());
        let now = chrono::Utc::now().to_rfc3339();

        match self.provider_index.entry(key) {
            Entry::Occupied(slot) => {
                let id = slot.get().clone();
                match self.users.get_mut(&id) {
                    Some(mut user) => {
                        user.email = profile.email;
                        user.name = profile.name;
                        user.picture = profile.picture;
                        user.last_login_at = now;
                        user.clone()
                    }
                    None => {
                        // Index without a record; recreate under the known ID.
                        let user = Self::new_record(id, profile, now);
                        self.users.insert(user.id.clone(), user.clone());
                        user
                    }
                }
            }
            Entry::Vacant(slot) => {
                let id = Uuid::new_v4().to_string();
                let user = Self::new_record(id.clone(), profile, now);
                self.users.insert(id.clone(), user.clone());
                slot.insert(id);
                tracing::info!(user_id = %user.id, provider = %user.provider, "Created user");
                user
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn new_record(id: String, profile: ExternalProfile, now: String) -> User {
        User {
            id,
            email: profile.email,
            name: profile.name,
            picture: profile.picture,
            provider: profile.provider,
            provider_user_id: profile.subject,
            created_at: now.clone(),
            last_login_at: now,
        }
    }
}
