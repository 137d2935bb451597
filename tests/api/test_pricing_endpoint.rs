// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /pricing/import

use axum::{extract::State, Json};
use cardscan_node::api::pricing::{pricing_import_handler, PriceRow};
use chrono::{TimeZone, Utc};

use super::common::plain_state;

fn row(card_id: &str, price: f64, condition: Option<&str>) -> PriceRow {
    PriceRow {
        card_id: Some(card_id.to_string()),
        set_id: None,
        number: None,
        variant: None,
        source: "ebay".to_string(),
        currency: "USD".to_string(),
        price,
        observed_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
        condition: condition.map(|c| c.to_string()),
        grade_agency: None,
        grade_value: None,
        grade_qualifier: None,
        listing_type: Some("sold".to_string()),
        quantity: 1,
        notes: None,
    }
}

#[tokio::test]
async fn test_clean_batch_all_inserted() {
    let rows = vec![
        row("sv3-27", 12.5, Some("NM")),
        row("sv3-28", 4.0, Some("LP")),
    ];
    let Json(report) = pricing_import_handler(State(plain_state()), Json(rows)).await;
    assert_eq!(report.inserted, 2);
    assert_eq!(report.updated, 0);
    assert_eq!(report.quarantined, 0);
}

#[tokio::test]
async fn test_duplicate_rows_count_as_updates() {
    let rows = vec![
        row("sv3-27", 12.5, Some("NM")),
        row("sv3-27", 13.0, Some("NM")),
    ];
    let Json(report) = pricing_import_handler(State(plain_state()), Json(rows)).await;
    assert_eq!(report.inserted, 1);
    assert_eq!(report.updated, 1);
}

#[tokio::test]
async fn test_invalid_rows_quarantined_not_fatal() {
    let rows = vec![
        row("sv3-27", 12.5, Some("NM")),
        row("sv3-28", 0.0, Some("NM")),     // non-positive price
        row("sv3-29", 5.0, Some("Mint")),   // unknown condition
        row("sv3-30", 5.0, None),           // no condition, no grade
    ];
    let Json(report) = pricing_import_handler(State(plain_state()), Json(rows)).await;
    assert_eq!(report.inserted, 1);
    assert_eq!(report.quarantined, 3);
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn test_zero_quantity_skipped() {
    let mut zero = row("sv3-27", 12.5, Some("NM"));
    zero.quantity = 0;
    let Json(report) = pricing_import_handler(State(plain_state()), Json(vec![zero])).await;
    assert_eq!(report.skipped, 1);
    assert_eq!(report.inserted, 0);
}

#[tokio::test]
async fn test_graded_row_without_condition_accepted() {
    let mut graded = row("sv3-27", 99.0, None);
    graded.grade_agency = Some("PSA".to_string());
    graded.grade_value = Some("10".to_string());
    let Json(report) = pricing_import_handler(State(plain_state()), Json(vec![graded])).await;
    assert_eq!(report.inserted, 1);
    assert_eq!(report.quarantined, 0);
}

#[tokio::test]
async fn test_empty_batch() {
    let Json(report) = pricing_import_handler(State(plain_state()), Json(vec![])).await;
    assert_eq!(report.inserted + report.updated + report.skipped + report.quarantined, 0);
}
