// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Collector-number scanning tests
//!
//! The recognizer here reads a synthetic bar code painted into the test
//! image: each digit `d` is a black column run of `d + 3` units, the
//! slash is a 15-unit run, and tokens are separated by 2-unit gaps.
//! Decoding only works when the bars are upright and in the scanned
//! region, so these tests exercise the rotation search end to end.

use cardscan_node::ocr::{OcrError, RecognitionMode, TextRecognizer};
use cardscan_node::vision::signals::extract_signals;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};

/// Pixels per unit in the painted image (before the scanner's upscale).
const UNIT_PX: u32 = 2;
/// Token gap in units.
const GAP_UNITS: u32 = 2;

fn token_units(token: char) -> u32 {
    match token {
        '/' => 15,
        d => d.to_digit(10).expect("digit token") + 3,
    }
}

/// Paint `text` as a bar code with its top-left corner at (x, y).
fn paint_code(image: &mut RgbImage, text: &str, x: u32, y: u32, height: u32) {
    let mut cursor = x;
    for token in text.chars() {
        let width = token_units(token) * UNIT_PX;
        for dy in 0..height {
            for dx in 0..width {
                image.put_pixel(cursor + dx, y + dy, Rgb([0, 0, 0]));
            }
        }
        cursor += width + GAP_UNITS * UNIT_PX;
    }
}

/// Decodes the bar code from a prepared (binarized) region.
struct BarCodeRecognizer;

impl BarCodeRecognizer {
    fn decode_row(row: &[u8]) -> Option<String> {
        // Collect black runs and the gaps between them.
        let mut runs: Vec<u32> = Vec::new();
        let mut gaps: Vec<u32> = Vec::new();
        let mut run = 0u32;
        let mut gap = 0u32;
        let mut started = false;
        for &px in row {
            if px < 128 {
                if started && run == 0 && gap > 0 {
                    gaps.push(gap);
                }
                gap = 0;
                run += 1;
                started = true;
            } else if started {
                if run > 0 {
                    runs.push(run);
                    run = 0;
                }
                gap += 1;
            }
        }
        if run > 0 {
            runs.push(run);
        }
        if runs.len() < 4 || gaps.is_empty() {
            return None;
        }

        // The narrowest gap is GAP_UNITS wide.
        let unit = (*gaps.iter().min().unwrap() as f32) / GAP_UNITS as f32;
        if unit < 1.0 {
            return None;
        }
        let mut out = String::new();
        for &width in &runs {
            let units = (width as f32 / unit).round() as i32;
            if units >= 14 {
                out.push('/');
            } else if (4..=12).contains(&units) {
                out.push(char::from_digit((units - 3) as u32, 10)?);
            } else {
                return None;
            }
        }
        Some(out)
    }
}

impl TextRecognizer for BarCodeRecognizer {
    fn name(&self) -> &'static str {
        "barcode"
    }

    fn recognize(&self, image: &GrayImage, _: RecognitionMode) -> Result<String, OcrError> {
        // Find rows containing ink and decode the middle one.
        let (width, height) = image.dimensions();
        let ink_rows: Vec<u32> = (0..height)
            .filter(|&y| (0..width).any(|x| image.get_pixel(x, y)[0] < 128))
            .collect();
        let Some(&mid) = ink_rows.get(ink_rows.len() / 2) else {
            return Ok(String::new());
        };
        let row: Vec<u8> = (0..width).map(|x| image.get_pixel(x, mid)[0]).collect();
        Ok(Self::decode_row(&row).unwrap_or_default())
    }
}

/// Portrait card photo with "27/159" bar-coded into the lower right
/// corner, where the printed collector number lives.
fn card_with_number() -> DynamicImage {
    let mut image = RgbImage::from_pixel(800, 1120, Rgb([255, 255, 255]));
    paint_code(&mut image, "27/159", 656, 1010, 60);
    DynamicImage::ImageRgb8(image)
}

#[test]
fn test_decode_row_roundtrip() {
    let mut image = RgbImage::from_pixel(400, 20, Rgb([255, 255, 255]));
    paint_code(&mut image, "27/159", 10, 2, 16);
    let gray = DynamicImage::ImageRgb8(image).to_luma8();
    let row: Vec<u8> = (0..gray.width()).map(|x| gray.get_pixel(x, 10)[0]).collect();
    assert_eq!(BarCodeRecognizer::decode_row(&row).as_deref(), Some("27/159"));
}

#[test]
fn test_scan_reads_upright_card() {
    let bundle = extract_signals(&card_with_number(), None, &BarCodeRecognizer);
    let number = bundle.number_raw.expect("number expected");
    assert_eq!(number.text, "27/159");
    assert!(number.confidence >= 0.85);
    assert_eq!(bundle.printed_total.unwrap().value, 159);
    assert_eq!(bundle.debug.orientation, "0");
}

#[test]
fn test_scan_recovers_rotated_card() {
    // The photo arrives rotated a quarter turn; the scanner must find
    // the number anyway and report the rotation that fixed it.
    let rotated = card_with_number().rotate90();
    let bundle = extract_signals(&rotated, None, &BarCodeRecognizer);
    let number = bundle.number_raw.expect("number expected after rotation");
    assert_eq!(number.text, "27/159");
    assert_eq!(bundle.printed_total.unwrap().value, 159);
    // rotate270 undoes the rotate90 above.
    assert_eq!(bundle.debug.orientation, "270");
}

#[test]
fn test_scan_upside_down_card() {
    let flipped = card_with_number().rotate180();
    let bundle = extract_signals(&flipped, None, &BarCodeRecognizer);
    let number = bundle.number_raw.expect("number expected after flip");
    assert_eq!(number.text, "27/159");
    assert_eq!(bundle.debug.orientation, "180");
}

#[test]
fn test_scan_recovers_three_quarter_rotated_card() {
    let rotated = card_with_number().rotate270();
    let bundle = extract_signals(&rotated, None, &BarCodeRecognizer);
    let number = bundle.number_raw.expect("number expected after rotation");
    assert_eq!(number.text, "27/159");
    // rotate90 undoes the rotate270 above.
    assert_eq!(bundle.debug.orientation, "90");
}

#[test]
fn test_blank_card_yields_null_signals() {
    let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 1120, Rgb([255, 255, 255])));
    let bundle = extract_signals(&blank, None, &BarCodeRecognizer);
    assert!(bundle.number_raw.is_none());
    assert!(bundle.printed_total.is_none());
    assert_eq!(bundle.debug.orientation, "0");
}
