// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based card analysis
//!
//! This module provides:
//! - Card border detection (contour and color-seed strategies)
//! - Perspective normalization of the detected card face
//! - Printed-signal extraction (collector number, name, set token)

pub mod border;
pub mod geometry;
pub mod image_utils;
pub mod name_extract;
pub mod number_scan;
pub mod signals;
pub mod warp;

pub use border::{detect_border, DetectionResult};
pub use geometry::{order_quad, Point, Quad};
pub use image_utils::{decode_base64_image, decode_image_bytes, ImageError};
pub use signals::{extract_signals, Signal, SignalBundle};
