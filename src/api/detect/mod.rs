// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Border detection API endpoint module
//!
//! Provides POST /detect-card-border for locating the card face in a photo.

pub mod handler;
pub mod request;

pub use handler::detect_border_handler;
pub use request::DetectBorderRequest;
