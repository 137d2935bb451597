// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Perspective normalization of a detected card quadrilateral
//!
//! Best-effort stage: any failure (degenerate polygon, singular transform)
//! returns the input image unchanged so OCR can still proceed.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::debug;

use super::geometry::{order_quad, Point, Quad};

/// Outward padding applied around the quad centroid before warping.
/// Recovers border margin lost to slightly tight detection.
const PAD_FRACTION: f32 = 0.03;

/// Coordinates at or below this magnitude are treated as normalized.
const NORMALIZED_COORD_LIMIT: f32 = 1.5;

/// Warp the given quadrilateral region into an upright, axis-aligned view.
///
/// `polygon` may be in normalized [0,1] or pixel coordinates; corners may
/// arrive in any order.
pub fn normalize_perspective(image: &DynamicImage, polygon: Quad) -> DynamicImage {
    match try_normalize(image, polygon) {
        Some(warped) => warped,
        None => {
            debug!("perspective normalization failed, continuing with unwarped image");
            image.clone()
        }
    }
}

fn try_normalize(image: &DynamicImage, polygon: Quad) -> Option<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    if width < 2 || height < 2 {
        return None;
    }

    let pixel_quad = if is_normalized(&polygon) {
        polygon.to_pixels(width, height)
    } else {
        polygon
    };
    let quad = order_quad(pixel_quad.0);

    // Target size: the larger of each pair of opposite edge lengths
    // handles slight foreshortening.
    let (tl, tr, br, bl) = (
        quad.top_left(),
        quad.top_right(),
        quad.bottom_right(),
        quad.bottom_left(),
    );
    let target_w = tl.distance(&tr).max(bl.distance(&br)).round() as u32;
    let target_h = tl.distance(&bl).max(tr.distance(&br)).round() as u32;
    if target_w < 4 || target_h < 4 {
        return None;
    }

    let padded = quad.pad(PAD_FRACTION).clamp(width, height);

    let from = [
        (padded.top_left().x, padded.top_left().y),
        (padded.top_right().x, padded.top_right().y),
        (padded.bottom_right().x, padded.bottom_right().y),
        (padded.bottom_left().x, padded.bottom_left().y),
    ];
    let to = [
        (0.0, 0.0),
        (target_w as f32 - 1.0, 0.0),
        (target_w as f32 - 1.0, target_h as f32 - 1.0),
        (0.0, target_h as f32 - 1.0),
    ];

    let projection = Projection::from_control_points(from, to)?;

    let mut out = RgbImage::new(target_w, target_h);
    warp_into(
        &image.to_rgb8(),
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut out,
    );

    let warped = DynamicImage::ImageRgb8(out);
    if warped.height() > warped.width() {
        Some(warped.rotate90())
    } else {
        Some(warped)
    }
}

fn is_normalized(quad: &Quad) -> bool {
    quad.0
        .iter()
        .all(|p| p.x.abs() <= NORMALIZED_COORD_LIMIT && p.y.abs() <= NORMALIZED_COORD_LIMIT)
}

/// Build a [`Quad`] from the wire representation (4 `[x, y]` pairs).
pub fn quad_from_pairs(pairs: &[[f32; 2]]) -> Option<Quad> {
    if pairs.len() != 4 {
        return None;
    }
    Some(Quad([
        Point::new(pairs[0][0], pairs[0][1]),
        Point::new(pairs[1][0], pairs[1][1]),
        Point::new(pairs[2][0], pairs[2][1]),
        Point::new(pairs[3][0], pairs[3][1]),
    ]))
}
