// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod identify;
pub mod ocr;
pub mod vision;

pub use config::ServiceConfig;
pub use identify::{IdentificationCache, IdentificationResult, IdentifyService};
pub use vision::{
    border::{detect_border, DetectionResult},
    geometry::{order_quad, Point, Quad},
    signals::{extract_signals, Signal, SignalBundle},
};
