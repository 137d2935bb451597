// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Border detection tests on synthetic card photos

use cardscan_node::vision::border::detect_border;
use image::{DynamicImage, Rgb, RgbImage};

/// A light card silhouette on a dark table, axis-aligned.
fn synthetic_card_photo() -> DynamicImage {
    let mut image = RgbImage::from_pixel(400, 400, Rgb([25, 30, 28]));
    for y in 60..340 {
        for x in 100..300 {
            image.put_pixel(x, y, Rgb([235, 230, 220]));
        }
    }
    DynamicImage::ImageRgb8(image)
}

#[test]
fn test_detects_card_silhouette() {
    let result = detect_border(&synthetic_card_photo());
    assert!(result.ok, "notes: {:?}", result.notes);
    assert!(result.confidence > 0.0);

    let polygon = result.polygon_norm.expect("polygon expected");
    // Corners are normalized and near the painted rectangle.
    for [x, y] in polygon {
        assert!((0.0..=1.0).contains(&x));
        assert!((0.0..=1.0).contains(&y));
    }
    let (tl, br) = (polygon[0], polygon[2]);
    assert!((tl[0] - 0.25).abs() < 0.08, "tl.x = {}", tl[0]);
    assert!((tl[1] - 0.15).abs() < 0.08, "tl.y = {}", tl[1]);
    assert!((br[0] - 0.75).abs() < 0.08, "br.x = {}", br[0]);
    assert!((br[1] - 0.85).abs() < 0.08, "br.y = {}", br[1]);
}

#[test]
fn test_uniform_image_never_reports_quad_contour() {
    // With no edges anywhere the quad strategy cannot fire; the center
    // seed matches the whole frame instead.
    let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 300, Rgb([128, 128, 128])));
    let result = detect_border(&flat);
    assert!(!result.notes.iter().any(|n| n == "quad_contour"));
    if let Some(polygon) = result.polygon_norm {
        for [x, y] in polygon {
            assert!((0.0..=1.0).contains(&x));
            assert!((0.0..=1.0).contains(&y));
        }
    }
}

#[test]
fn test_tiny_image_is_soft_failure() {
    let tiny = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([200, 0, 0])));
    let result = detect_border(&tiny);
    assert!(!result.ok);
}

#[test]
fn test_center_seed_fallback_on_rotated_card() {
    // A card tilted 45 degrees still binarizes into a big center
    // component even when the contour stage misses a clean quad, so
    // detection must come back with some polygon or an honest failure,
    // never a polygon outside [0,1].
    let mut image = RgbImage::from_pixel(400, 400, Rgb([20, 60, 20]));
    for y in 0..400i32 {
        for x in 0..400i32 {
            // Diamond centered at (200, 200).
            if (x - 200).abs() + (y - 200).abs() < 150 {
                image.put_pixel(x as u32, y as u32, Rgb([240, 235, 225]));
            }
        }
    }
    let result = detect_border(&DynamicImage::ImageRgb8(image));
    if let Some(polygon) = result.polygon_norm {
        for [x, y] in polygon {
            assert!((-0.01..=1.01).contains(&x));
            assert!((-0.01..=1.01).contains(&y));
        }
    }
}
