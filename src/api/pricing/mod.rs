// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Pricing import API endpoint module
//!
//! Provides POST /pricing/import for validating and normalizing batches
//! of observed card prices. Rows are normalized and counted; persistence
//! belongs to the collaborator service that consumes the report.

pub mod handler;
pub mod models;

pub use handler::pricing_import_handler;
pub use models::{Condition, GradeAgency, ImportReport, ListingType, NormalizedRow, PriceRow};
