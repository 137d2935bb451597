// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Signal pipeline driver: normalize, scan the collector number, then
//! read the name from the final orientation.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ocr::TextRecognizer;
use crate::vision::geometry::Quad;
use crate::vision::name_extract::{extract_name, NAME_CONFIDENCE};
use crate::vision::number_scan::scan_number;
use crate::vision::warp::normalize_perspective;

/// Recognized text plus operating confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub text: String,
    pub confidence: f32,
}

/// Parsed numeric value plus operating confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSignal {
    pub value: u32,
    pub confidence: f32,
}

/// Diagnostic trail; consumers treat this as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalDebug {
    pub orientation: String,
    pub notes: Vec<String>,
}

/// All signals read from one card image. Absent signals are `null` on the
/// wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBundle {
    pub name: Option<Signal>,
    pub number_raw: Option<Signal>,
    pub printed_total: Option<ValueSignal>,
    pub printed_set_abbrev_raw: Option<Signal>,
    pub debug: SignalDebug,
}

/// Run the full signal pipeline over a card photo. When a border polygon
/// is supplied the image is perspective-normalized first; otherwise the
/// scanner works on the photo as-is.
pub fn extract_signals(
    image: &DynamicImage,
    polygon: Option<Quad>,
    recognizer: &dyn TextRecognizer,
) -> SignalBundle {
    let normalized = match polygon {
        Some(quad) => normalize_perspective(image, quad),
        None => image.clone(),
    };

    let scan = scan_number(&normalized, recognizer);
    let name = extract_name(&scan.oriented, recognizer);

    debug!(
        orientation = scan.orientation.label(),
        has_name = name.is_some(),
        has_number = scan.number_raw.is_some(),
        "signal extraction complete"
    );

    SignalBundle {
        name: name.map(|text| Signal {
            text,
            confidence: NAME_CONFIDENCE,
        }),
        number_raw: scan.number_raw.clone().map(|text| Signal {
            text,
            confidence: scan.confidence,
        }),
        printed_total: scan.printed_total.map(|value| ValueSignal {
            value,
            confidence: scan.confidence,
        }),
        printed_set_abbrev_raw: scan.set_abbrev_raw.clone().map(|text| Signal {
            text,
            confidence: scan.confidence,
        }),
        debug: SignalDebug {
            orientation: scan.orientation.label().to_string(),
            notes: scan.notes,
        },
    }
}
