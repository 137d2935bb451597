// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Card signal extraction API endpoint module
//!
//! Provides POST /ocr-card-signals for reading the printed name,
//! collector number, and set token from a card photo.

pub mod handler;
pub mod request;

pub use handler::card_signals_handler;
pub use request::CardSignalsRequest;
