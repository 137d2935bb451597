// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Card identification via a remote vision model, fronted by a
//! content-addressed result cache.

pub mod cache;
pub mod client;
pub mod service;

pub use cache::{CacheEntry, IdentificationCache};
pub use client::{CardIdentifier, IdentificationResult, IdentifyError, VisionIdClient};
pub use service::{IdentifyOutcome, IdentifyParams, IdentifyService};
