// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Collector-number scanning
//!
//! The printed "N/total" is small, low-contrast, and moves around between
//! card layouts, so the scanner searches a grid of candidate regions at all
//! four rotations, then runs a second pass over the rightmost strip. The
//! strip pass is the higher-precision signal: any valid strip candidate
//! overrides the grid result and fixes the final orientation used by name
//! extraction.

use image::{imageops, DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use regex::Regex;
use tracing::debug;

use crate::ocr::{RecognitionMode, TextRecognizer};

/// Upscale factor applied to candidate regions before recognition.
const REGION_UPSCALE: u32 = 4;
/// Denoise strength for candidate regions.
const REGION_BLUR_SIGMA: f32 = 0.8;

/// Vertical bands searched by the grid pass (fractions of height).
const Y_BANDS: [(f32, f32); 3] = [(0.70, 1.00), (0.55, 0.85), (0.80, 1.00)];
/// Horizontal bands searched by the grid pass (fractions of width).
const X_BANDS: [(f32, f32); 3] = [(0.00, 0.38), (0.31, 0.69), (0.62, 1.00)];

/// The strip pass scans the rightmost 20% of the image.
const STRIP_X_START: f32 = 0.80;

/// Printed totals outside this range are OCR noise.
const TOTAL_MIN: u32 = 10;
const TOTAL_MAX: u32 = 400;
/// Most printed totals land here; reward candidates inside.
const TOTAL_PLAUSIBLE: (u32, u32) = (50, 250);
const TOTAL_LIKELY: (u32, u32) = (100, 220);
/// Common reference total used for the proximity reward.
const REFERENCE_TOTAL: f32 = 165.0;

const STRIP_BASE_SCORE: f32 = 50.0;
const PLAUSIBLE_BONUS: f32 = 30.0;
const LIKELY_BONUS: f32 = 15.0;
const SHORT_DENOMINATOR_BONUS: f32 = 5.0;

/// The four axis-aligned rotations tried to recover from unknown photo
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    R0,
    R90,
    R180,
    R270,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::R0,
        Orientation::R90,
        Orientation::R180,
        Orientation::R270,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Orientation::R0 => "0",
            Orientation::R90 => "90",
            Orientation::R180 => "180",
            Orientation::R270 => "270",
        }
    }

    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        match self {
            Orientation::R0 => image.clone(),
            Orientation::R90 => image.rotate90(),
            Orientation::R180 => image.rotate180(),
            Orientation::R270 => image.rotate270(),
        }
    }
}

/// Result of the two-pass number scan.
#[derive(Debug)]
pub struct NumberScanOutcome {
    pub number_raw: Option<String>,
    pub printed_total: Option<u32>,
    pub set_abbrev_raw: Option<String>,
    pub confidence: f32,
    pub orientation: Orientation,
    /// Input image rotated into the final orientation.
    pub oriented: DynamicImage,
    /// Diagnostic trail; not part of the signal contract.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone)]
struct Candidate {
    number_raw: String,
    denominator: u32,
    score: f32,
    orientation: Orientation,
    region_text: String,
}

/// Scan for the printed collector number across candidate regions and all
/// four rotations.
pub fn scan_number(image: &DynamicImage, recognizer: &dyn TextRecognizer) -> NumberScanOutcome {
    let pattern = Regex::new(r"(\d{1,3})\s*/\s*(\d{2,4})").expect("static pattern");
    let mut notes = Vec::new();

    let grid = grid_pass(image, recognizer, &pattern, &mut notes);
    let strip = strip_pass(image, recognizer, &pattern, &mut notes);

    // The strip pass, when it finds anything valid, overrides the grid
    // result outright and fixes the final orientation.
    let (winner, confidence) = match (&strip, &grid) {
        (Some(s), _) => (Some(s.clone()), (s.score / 100.0).min(0.95)),
        // Grid score is the matched span length, which also drives its
        // confidence.
        (None, Some(g)) => (Some(g.clone()), (0.55 + 0.05 * g.score).min(0.95)),
        (None, None) => (None, 0.0),
    };

    match winner {
        Some(c) => {
            debug!(
                number = %c.number_raw,
                orientation = c.orientation.label(),
                confidence,
                "collector number located"
            );
            NumberScanOutcome {
                number_raw: Some(c.number_raw.clone()),
                printed_total: Some(c.denominator),
                set_abbrev_raw: find_set_abbrev(&c.region_text),
                confidence,
                orientation: c.orientation,
                oriented: c.orientation.apply(image),
                notes,
            }
        }
        None => {
            notes.push("no_number_match".to_string());
            NumberScanOutcome {
                number_raw: None,
                printed_total: None,
                set_abbrev_raw: None,
                confidence: 0.0,
                orientation: Orientation::R0,
                oriented: image.clone(),
                notes,
            }
        }
    }
}

/// First pass: 3x3 region grid at each rotation; the first matching region
/// per rotation contributes that rotation's candidate, scored by match
/// length.
fn grid_pass(
    image: &DynamicImage,
    recognizer: &dyn TextRecognizer,
    pattern: &Regex,
    notes: &mut Vec<String>,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for orientation in Orientation::ALL {
        let rotated = orientation.apply(image).to_luma8();

        'regions: for (yi, &(y0, y1)) in Y_BANDS.iter().enumerate() {
            for (xi, &(x0, x1)) in X_BANDS.iter().enumerate() {
                let Some(region) = crop_fraction(&rotated, x0, x1, y0, y1) else {
                    continue;
                };
                let prepared = prepare_region(&region);
                let Ok(text) = recognizer.recognize(&prepared, RecognitionMode::SingleLine) else {
                    continue;
                };

                if let Some((raw, span, _, den)) = match_number(pattern, &text) {
                    let score = span as f32;
                    notes.push(format!(
                        "grid rot={} region={}x{} text={}",
                        orientation.label(),
                        yi,
                        xi,
                        raw
                    ));
                    if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                        best = Some(Candidate {
                            number_raw: raw,
                            denominator: den,
                            score,
                            orientation,
                            region_text: text,
                        });
                    }
                    // Scanning order is fixed; later regions at this
                    // rotation are not consulted.
                    break 'regions;
                }
            }
        }
    }

    best
}

/// Second pass: rightmost strip only, with denominator-plausibility
/// scoring.
fn strip_pass(
    image: &DynamicImage,
    recognizer: &dyn TextRecognizer,
    pattern: &Regex,
    notes: &mut Vec<String>,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for orientation in Orientation::ALL {
        let rotated = orientation.apply(image).to_luma8();
        let Some(strip) = crop_fraction(&rotated, STRIP_X_START, 1.0, 0.0, 1.0) else {
            continue;
        };
        let prepared = prepare_region(&strip);
        let Ok(text) = recognizer.recognize(&prepared, RecognitionMode::SingleLine) else {
            continue;
        };

        if let Some((raw, _, num, den)) = match_number(pattern, &text) {
            if !(TOTAL_MIN..=TOTAL_MAX).contains(&den) || num > den {
                continue;
            }
            let score = strip_score(den);
            notes.push(format!(
                "strip rot={} text={} score={:.1}",
                orientation.label(),
                raw,
                score
            ));
            if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                best = Some(Candidate {
                    number_raw: raw,
                    denominator: den,
                    score,
                    orientation,
                    region_text: text,
                });
            }
        }
    }

    best
}

/// Reward denominators in the plausible printed-total range, proximity to
/// the common reference total, and fewer digits (fewer OCR confusion
/// opportunities).
fn strip_score(denominator: u32) -> f32 {
    let mut score = STRIP_BASE_SCORE;
    if (TOTAL_PLAUSIBLE.0..=TOTAL_PLAUSIBLE.1).contains(&denominator) {
        score += PLAUSIBLE_BONUS;
    }
    if (TOTAL_LIKELY.0..=TOTAL_LIKELY.1).contains(&denominator) {
        score += LIKELY_BONUS;
    }
    score += (10.0 - (denominator as f32 - REFERENCE_TOTAL).abs() / 20.0).max(0.0);
    let digits = denominator.to_string().len() as f32;
    score += (4.0 - digits) * SHORT_DENOMINATOR_BONUS;
    score
}

/// Returns the normalized `N/total` string, the length of the matched
/// span (spacing around the slash included), and the parsed pair.
fn match_number(pattern: &Regex, text: &str) -> Option<(String, usize, u32, u32)> {
    let caps = pattern.captures(text)?;
    let span = caps.get(0)?.as_str().len();
    let num: u32 = caps[1].parse().ok()?;
    let den: u32 = caps[2].parse().ok()?;
    let raw = format!("{}/{}", &caps[1], &caps[2]);
    Some((raw, span, num, den))
}

/// Short alphanumeric token containing both letters and digits, adjacent
/// to the number print on many layouts.
fn find_set_abbrev(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| {
            token.len() <= 5
                && token.chars().all(|c| c.is_ascii_alphanumeric())
                && token.chars().any(|c| c.is_ascii_alphabetic())
                && token.chars().any(|c| c.is_ascii_digit())
        })
        .map(|t| t.to_ascii_uppercase())
}

fn crop_fraction(image: &GrayImage, x0: f32, x1: f32, y0: f32, y1: f32) -> Option<GrayImage> {
    let (width, height) = image.dimensions();
    let px0 = (width as f32 * x0) as u32;
    let px1 = ((width as f32 * x1) as u32).min(width);
    let py0 = (height as f32 * y0) as u32;
    let py1 = ((height as f32 * y1) as u32).min(height);
    if px1 <= px0 + 4 || py1 <= py0 + 4 {
        return None;
    }
    Some(imageops::crop_imm(image, px0, py0, px1 - px0, py1 - py0).to_image())
}

/// Upscale, denoise and binarize a candidate region. Output convention:
/// dark digits on a light background; polarity is flipped when the
/// binarized region comes out mostly foreground.
pub(crate) fn prepare_region(region: &GrayImage) -> GrayImage {
    let (w, h) = region.dimensions();
    let upscaled = imageops::resize(
        region,
        w * REGION_UPSCALE,
        h * REGION_UPSCALE,
        imageops::FilterType::CatmullRom,
    );
    let denoised = gaussian_blur_f32(&upscaled, REGION_BLUR_SIGMA);

    let level = otsu_level(&denoised);
    let binary = threshold(&denoised, level, ThresholdType::Binary);

    let dark = binary.pixels().filter(|p| p[0] == 0).count();
    if dark * 2 > (binary.width() * binary.height()) as usize {
        threshold(&denoised, level, ThresholdType::BinaryInverted)
    } else {
        binary
    }
}
