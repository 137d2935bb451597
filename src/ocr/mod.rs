// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Text recognition seam
//!
//! The scan pipeline only needs "text out of a prepared grayscale region",
//! so recognition sits behind a trait. The production engine is an ONNX
//! CRNN model; tests inject scripted recognizers.

pub mod preprocessing;
pub mod recognition;

use image::GrayImage;
use thiserror::Error;

pub use recognition::OnnxRecognizer;

/// Layout assumption handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// Region holds a single line of text.
    SingleLine,
    /// Region may hold several stacked lines.
    Block,
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("recognition engine not ready: {0}")]
    NotReady(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Common interface for all text recognition engines.
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Recognize text in a preprocessed grayscale region. Lines are joined
    /// with `\n` in block mode.
    fn recognize(&self, region: &GrayImage, mode: RecognitionMode) -> Result<String, OcrError>;
}

/// Placeholder engine used when no model is configured. Always reads
/// nothing, which the pipeline degrades to null signals.
#[derive(Debug, Default)]
pub struct NoopRecognizer;

impl TextRecognizer for NoopRecognizer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn recognize(&self, _: &GrayImage, _: RecognitionMode) -> Result<String, OcrError> {
        Ok(String::new())
    }
}
