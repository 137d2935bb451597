// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Card-name extraction from the top band of a normalized card image.

use image::{imageops, DynamicImage, GrayImage};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::gaussian_blur_f32;
use regex::Regex;
use tracing::debug;

use crate::ocr::{RecognitionMode, TextRecognizer};

/// The name line sits in the top band of the card face.
const NAME_BAND_FRAC: f32 = 0.22;
/// Upscale factor for the name band before recognition.
const NAME_UPSCALE: f32 = 2.5;
/// Tile grid for local histogram equalization.
const EQUALIZE_TILES: u32 = 8;
/// Unsharp blend weights.
const SHARPEN_WEIGHT: f32 = 1.5;
const BLUR_WEIGHT: f32 = 0.5;
const UNSHARP_SIGMA: f32 = 2.0;

/// Name candidates need at least this many letters to be reported.
const MIN_ALPHA_CHARS: usize = 3;

/// Reported confidence for an accepted name read. The recognizer does not
/// expose per-character scores, so this is a fixed operating point.
pub const NAME_CONFIDENCE: f32 = 0.85;

/// Extract the card name from the top band of an upright card image.
/// Returns `None` when no plausible name line is recognized.
pub fn extract_name(image: &DynamicImage, recognizer: &dyn TextRecognizer) -> Option<String> {
    let band = name_band(image)?;
    let prepared = prepare_band(&band);

    // Single-line reads are cleaner when the band really is one line;
    // block mode recovers names that wrap or share the band with other
    // print. Keep whichever read carries more letters.
    let single = recognizer
        .recognize(&prepared, RecognitionMode::SingleLine)
        .unwrap_or_default();
    let block = recognizer
        .recognize(&prepared, RecognitionMode::Block)
        .unwrap_or_default();
    let text = if alpha_count(&block) > alpha_count(&single) {
        block
    } else {
        single
    };

    let cleaned = clean_name(&text)?;
    debug!(name = %cleaned, "card name extracted");
    Some(cleaned)
}

fn name_band(image: &DynamicImage) -> Option<GrayImage> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let band_height = (height as f32 * NAME_BAND_FRAC) as u32;
    if width < 8 || band_height < 8 {
        return None;
    }
    Some(imageops::crop_imm(&gray, 0, 0, width, band_height).to_image())
}

/// Upscale, locally equalize, and unsharp-mask the name band.
fn prepare_band(band: &GrayImage) -> GrayImage {
    let (w, h) = band.dimensions();
    let upscaled = imageops::resize(
        band,
        (w as f32 * NAME_UPSCALE) as u32,
        (h as f32 * NAME_UPSCALE) as u32,
        imageops::FilterType::CatmullRom,
    );

    let equalized = tiled_equalize(&upscaled);
    let blurred = gaussian_blur_f32(&equalized, UNSHARP_SIGMA);

    let mut sharpened = GrayImage::new(equalized.width(), equalized.height());
    for (x, y, pixel) in sharpened.enumerate_pixels_mut() {
        let e = equalized.get_pixel(x, y)[0] as f32;
        let b = blurred.get_pixel(x, y)[0] as f32;
        let v = SHARPEN_WEIGHT * e - BLUR_WEIGHT * b;
        pixel[0] = v.clamp(0.0, 255.0) as u8;
    }
    sharpened
}

/// Histogram equalization applied per tile, so glossy highlights in one
/// corner do not wash out contrast across the whole band.
fn tiled_equalize(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let tile_w = (width / EQUALIZE_TILES).max(1);
    let tile_h = (height / EQUALIZE_TILES).max(1);

    let mut out = GrayImage::new(width, height);
    let mut ty = 0;
    while ty < height {
        let th = tile_h.min(height - ty);
        let mut tx = 0;
        while tx < width {
            let tw = tile_w.min(width - tx);
            let tile = imageops::crop_imm(image, tx, ty, tw, th).to_image();
            let equalized = equalize_histogram(&tile);
            imageops::replace(&mut out, &equalized, tx as i64, ty as i64);
            tx += tw;
        }
        ty += th;
    }
    out
}

/// Strip trailing hit-point print and leading junk, then require a
/// minimum of letters. Works from the first non-empty line; recognizers
/// may emit leading blank lines in block mode.
fn clean_name(text: &str) -> Option<String> {
    let first_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    let hp_tail = Regex::new(r"(?i)\s*HP\s*\d+\s*$").expect("static pattern");
    let stripped = hp_tail.replace(first_line, "");
    let trimmed = stripped
        .trim_start_matches(|c: char| !c.is_ascii_alphabetic())
        .trim_end();

    if alpha_count(trimmed) < MIN_ALPHA_CHARS {
        return None;
    }
    Some(trimmed.to_string())
}

fn alpha_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_alphabetic()).count()
}
