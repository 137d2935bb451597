// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Card border localization
//!
//! Two strategies, first success wins:
//! 1. Quad-contour: edge detection plus polygon approximation, keeping the
//!    largest convex quadrilateral.
//! 2. Center-seed: HSV-threshold around the median color of a small center
//!    patch, then take the connected component under the image center.
//!
//! All failures degrade to an `ok: false` result with a diagnostic trail;
//! this stage never surfaces a fault to the caller.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::{close, open};
use imageproc::point::Point as IPoint;
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::{order_quad, Point, Quad};

/// Contours below this fraction of image area are never card candidates.
const MIN_CONTOUR_AREA_FRAC: f32 = 0.03;
/// Polygon approximation tolerance, as a fraction of contour perimeter.
const APPROX_EPSILON_FRAC: f64 = 0.02;
/// Canny hysteresis thresholds.
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
/// Pre-edge blur strength.
const BLUR_SIGMA: f32 = 1.4;
/// Radius for the dilate/erode pass that closes small edge gaps.
const EDGE_CLOSE_RADIUS: u8 = 2;
/// Center patch radius as a fraction of the short image edge.
const CENTER_PATCH_FRAC: f32 = 0.03;
/// HSV tolerance window around the sampled median (OpenCV-scale hue 0-179).
const HUE_TOL: i32 = 18;
const SAT_TOL: i32 = 70;
const VAL_TOL: i32 = 70;
/// Radius for the mask cleanup passes in the center-seed strategy.
const SEED_KERNEL_RADIUS: u8 = 4;
/// Center-seed detections below this area fraction are rejected.
const MIN_SEED_AREA_FRAC: f32 = 0.05;
/// Confidence floor for accepted detections.
const CONFIDENCE_FLOOR: f32 = 0.1;

/// Result of a border detection attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub ok: bool,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_norm: Option<[[f32; 2]; 4]>,
    pub notes: Vec<String>,
}

impl DetectionResult {
    fn found(quad: Quad, width: u32, height: u32, area_frac: f32, strategy: &str) -> Self {
        DetectionResult {
            ok: true,
            confidence: area_frac.clamp(CONFIDENCE_FLOOR, 1.0),
            polygon_norm: Some(quad.to_normalized(width, height).to_arrays()),
            notes: vec![strategy.to_string(), format!("area={:.3}", area_frac)],
        }
    }

    fn failed(confidence: f32, notes: Vec<String>) -> Self {
        DetectionResult {
            ok: false,
            confidence,
            polygon_norm: None,
            notes,
        }
    }
}

/// Locate the card's bounding quadrilateral in an arbitrary photo.
pub fn detect_border(image: &DynamicImage) -> DetectionResult {
    let (width, height) = (image.width(), image.height());
    if width < 8 || height < 8 {
        return DetectionResult::failed(
            0.0,
            vec!["exception".to_string(), "image_too_small".to_string()],
        );
    }

    // Attempt 1: edge/quad detection.
    if let Some((quad, area_frac)) = find_largest_quad(image) {
        debug!(area_frac, "border located via quad contour");
        return DetectionResult::found(quad, width, height, area_frac, "quad_contour");
    }

    // Attempt 2 (fallback): center-seeded mask bbox.
    match center_seed_bbox(image) {
        None => DetectionResult::failed(
            0.0,
            vec!["no_big_contours".to_string(), "center_seed_failed".to_string()],
        ),
        Some((_, area_frac)) if area_frac < MIN_SEED_AREA_FRAC => DetectionResult::failed(
            area_frac,
            vec![
                "center_seed_too_small".to_string(),
                format!("area={:.3}", area_frac),
            ],
        ),
        Some((quad, area_frac)) => {
            debug!(area_frac, "border located via center seed");
            DetectionResult::found(quad, width, height, area_frac, "center_seed_bbox")
        }
    }
}

/// Edge-based strategy: keep the largest convex 4-vertex approximation
/// among external contours of at least 3% image area.
fn find_largest_quad(image: &DynamicImage) -> Option<(Quad, f32)> {
    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
    let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);

    // Dilate-then-erode closes small gaps without growing the shape.
    let edges = binarize(&close(&edges, imageproc::distance_transform::Norm::LInf, EDGE_CLOSE_RADIUS));

    let image_area = (image.width() * image.height()) as f32;
    let min_area = image_area * MIN_CONTOUR_AREA_FRAC;

    let mut best: Option<(Quad, f32)> = None;

    for contour in find_contours::<i32>(&edges) {
        if contour.border_type != BorderType::Outer || contour.points.len() < 4 {
            continue;
        }

        let area = polygon_area(&contour.points);
        if area < min_area {
            continue;
        }

        let perimeter = arc_length(&contour.points, true);
        let approx = approximate_polygon_dp(&contour.points, APPROX_EPSILON_FRAC * perimeter, true);
        if approx.len() != 4 || !is_convex(&approx) {
            continue;
        }

        if best.as_ref().map(|(_, a)| area > *a * image_area).unwrap_or(true) {
            let corners = [
                Point::new(approx[0].x as f32, approx[0].y as f32),
                Point::new(approx[1].x as f32, approx[1].y as f32),
                Point::new(approx[2].x as f32, approx[2].y as f32),
                Point::new(approx[3].x as f32, approx[3].y as f32),
            ];
            best = Some((order_quad(corners), area / image_area));
        }
    }

    best
}

/// Shoelace area over integer contour points.
fn polygon_area(points: &[IPoint<i32>]) -> f32 {
    let n = points.len();
    let mut acc = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        acc += points[i].x as i64 * points[j].y as i64 - points[j].x as i64 * points[i].y as i64;
    }
    (acc as f32 / 2.0).abs()
}

/// Cross-product sign test: every consecutive edge pair must turn the
/// same way.
fn is_convex(points: &[IPoint<i32>]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    let mut sign = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross =
            (b.x - a.x) as i64 * (c.y - b.y) as i64 - (b.y - a.y) as i64 * (c.x - b.x) as i64;
        if cross == 0 {
            continue;
        }
        let s = cross.signum();
        if sign == 0 {
            sign = s;
        } else if s != sign {
            return false;
        }
    }
    sign != 0
}

/// Fallback strategy: threshold around the median HSV of a center patch
/// and take the bounding box of the component containing the center.
fn center_seed_bbox(image: &DynamicImage) -> Option<(Quad, f32)> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (cx, cy) = (width / 2, height / 2);

    let r = ((width.min(height) as f32 * CENTER_PATCH_FRAC) as u32).max(8);
    let (x0, x1) = (cx.saturating_sub(r), (cx + r).min(width));
    let (y0, y1) = (cy.saturating_sub(r), (cy + r).min(height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    // Median HSV of the center patch.
    let mut hs = Vec::new();
    let mut ss = Vec::new();
    let mut vs = Vec::new();
    for y in y0..y1 {
        for x in x0..x1 {
            let p = rgb.get_pixel(x, y);
            let (h, s, v) = rgb_to_hsv(p[0], p[1], p[2]);
            hs.push(h);
            ss.push(s);
            vs.push(v);
        }
    }
    let (h0, s0, v0) = (median(&mut hs), median(&mut ss), median(&mut vs));

    // Tolerances are fairly wide; the connected component refines them.
    let (h_lo, h_hi) = ((h0 - HUE_TOL).max(0), (h0 + HUE_TOL).min(179));
    let (s_lo, s_hi) = ((s0 - SAT_TOL).max(0), (s0 + SAT_TOL).min(255));
    let (v_lo, v_hi) = ((v0 - VAL_TOL).max(0), (v0 + VAL_TOL).min(255));

    let mut mask = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let p = rgb.get_pixel(x, y);
            let (h, s, v) = rgb_to_hsv(p[0], p[1], p[2]);
            let inside =
                h >= h_lo && h <= h_hi && s >= s_lo && s <= s_hi && v >= v_lo && v <= v_hi;
            mask.put_pixel(x, y, Luma([if inside { 255u8 } else { 0 }]));
        }
    }

    // Close twice, then open once.
    let norm = imageproc::distance_transform::Norm::LInf;
    let mask = close(&close(&mask, norm, SEED_KERNEL_RADIUS), norm, SEED_KERNEL_RADIUS);
    let mask = binarize(&open(&mask, norm, SEED_KERNEL_RADIUS));

    let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

    let center_label = labels.get_pixel(cx.min(width - 1), cy.min(height - 1))[0];
    let chosen = if center_label != 0 {
        center_label
    } else {
        // Center fell on background; fall back to the largest component.
        let mut counts = std::collections::HashMap::new();
        for p in labels.pixels() {
            if p[0] != 0 {
                *counts.entry(p[0]).or_insert(0u64) += 1;
            }
        }
        *counts.iter().max_by_key(|(_, c)| **c)?.0
    };

    // Bounding box of the chosen component.
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0u32, 0u32);
    for (x, y, p) in labels.enumerate_pixels() {
        if p[0] == chosen {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x > max_x || min_y > max_y {
        return None;
    }

    let (w, h) = ((max_x - min_x + 1) as f32, (max_y - min_y + 1) as f32);
    let area_frac = (w * h) / (width as f32 * height as f32);

    let quad = order_quad([
        Point::new(min_x as f32, min_y as f32),
        Point::new(max_x as f32, min_y as f32),
        Point::new(max_x as f32, max_y as f32),
        Point::new(min_x as f32, max_y as f32),
    ]);
    Some((quad, area_frac))
}

/// Force a grayscale mask back to strict 0/255 after morphology.
fn binarize(mask: &GrayImage) -> GrayImage {
    threshold(mask, 127, ThresholdType::Binary)
}

/// RGB to HSV on the OpenCV scale: hue 0-179, saturation/value 0-255.
pub(crate) fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (i32, i32, i32) {
    let (rf, gf, bf) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };

    let sat = if max == 0.0 { 0.0 } else { delta / max };

    // Hues just under 360 would round to 180, off the OpenCV scale.
    let h = ((hue / 2.0).round() as i32).min(179);
    (h, (sat * 255.0).round() as i32, (max * 255.0).round() as i32)
}

fn median(values: &mut [i32]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    values.sort_unstable();
    values[values.len() / 2]
}
