// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod http_server;
pub mod identify;
pub mod pricing;
pub mod signals;

pub use detect::{detect_border_handler, DetectBorderRequest};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{start_server, AppState};
pub use identify::{identify_handler, IdentifyRequest, IdentifyResponse};
pub use pricing::{pricing_import_handler, ImportReport, PriceRow};
pub use signals::{card_signals_handler, CardSignalsRequest};
