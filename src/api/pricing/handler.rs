// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Pricing import endpoint handler

use std::collections::HashSet;
use std::time::Instant;

use axum::{extract::State, Json};
use tracing::{debug, info, warn};

use super::models::{ImportReport, PriceRow};
use crate::api::http_server::AppState;

/// POST /pricing/import - Validate and normalize a batch of price rows
///
/// Rows that fail validation are quarantined; duplicates within the
/// batch (same print, source, and observation time) count as updates;
/// zero-quantity rows are skipped. The batch never fails as a whole.
pub async fn pricing_import_handler(
    State(_state): State<AppState>,
    Json(rows): Json<Vec<PriceRow>>,
) -> Json<ImportReport> {
    let start = Instant::now();
    let mut report = ImportReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let normalized = match row.normalize() {
            Ok(normalized) => normalized,
            Err(fault) => {
                debug!("price row {} quarantined: {:?}", index, fault);
                report.quarantined += 1;
                continue;
            }
        };

        if normalized.quantity <= 0 {
            report.skipped += 1;
            continue;
        }

        if seen.insert(normalized.dedup_key()) {
            report.inserted += 1;
        } else {
            report.updated += 1;
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    if report.quarantined > 0 {
        warn!(
            quarantined = report.quarantined,
            total = rows.len(),
            "pricing import had quarantined rows"
        );
    }
    info!(
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        quarantined = report.quarantined,
        duration_ms = report.duration_ms,
        "pricing import complete"
    );

    Json(report)
}
