// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models.

pub mod user;

pub use user::{ExternalProfile, PublicUser, User};
