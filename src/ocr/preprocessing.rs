// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Tensor preparation and row segmentation for the recognition model

use image::{imageops, GrayImage};
use ndarray::Array4;

/// Recognition model input height.
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input.
pub const REC_MAX_WIDTH: u32 = 640;

/// Mean values for normalization (ImageNet).
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet).
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Rows with at least this fraction of dark pixels count as ink rows
/// during block segmentation.
const INK_ROW_FRAC: f32 = 0.02;

/// Minimum pixel height for a segmented row to be worth recognizing.
const MIN_ROW_HEIGHT: u32 = 6;

/// Convert a grayscale line region into the model's NCHW tensor:
/// height-normalized to [`REC_INPUT_HEIGHT`], dynamic width, gray value
/// replicated over three channels and normalized with ImageNet mean/std.
pub fn line_tensor(region: &GrayImage) -> Array4<f32> {
    let (orig_w, orig_h) = region.dimensions();

    let scale = REC_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let new_width = ((orig_w as f32 * scale).round() as u32)
        .clamp(4, REC_MAX_WIDTH);

    let resized = imageops::resize(
        region,
        new_width,
        REC_INPUT_HEIGHT,
        imageops::FilterType::Lanczos3,
    );

    let width = new_width as usize;
    let mut tensor = Array4::zeros((1, 3, REC_INPUT_HEIGHT as usize, width));
    for y in 0..REC_INPUT_HEIGHT as usize {
        for x in 0..width {
            let value = resized.get_pixel(x as u32, y as u32)[0] as f32 / 255.0;
            for c in 0..3 {
                tensor[[0, c, y, x]] = (value - MEAN[c]) / STD[c];
            }
        }
    }
    tensor
}

/// Split a block region into candidate text rows using a horizontal ink
/// projection. Dark pixels are treated as ink.
pub fn segment_rows(region: &GrayImage) -> Vec<GrayImage> {
    let (width, height) = region.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let min_ink = ((width as f32) * INK_ROW_FRAC).max(1.0) as u32;
    let is_ink_row: Vec<bool> = (0..height)
        .map(|y| {
            let dark = (0..width).filter(|&x| region.get_pixel(x, y)[0] < 128).count() as u32;
            dark >= min_ink
        })
        .collect();

    let mut rows = Vec::new();
    let mut start: Option<u32> = None;
    for y in 0..height {
        match (is_ink_row[y as usize], start) {
            (true, None) => start = Some(y),
            (false, Some(s)) => {
                if y - s >= MIN_ROW_HEIGHT {
                    rows.push(imageops::crop_imm(region, 0, s, width, y - s).to_image());
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if height - s >= MIN_ROW_HEIGHT {
            rows.push(imageops::crop_imm(region, 0, s, width, height - s).to_image());
        }
    }
    rows
}
