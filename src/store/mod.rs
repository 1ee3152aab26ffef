// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyed in-memory stores.

pub mod memory;

pub use memory::ExpiringMap;
