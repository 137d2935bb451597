// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Quad ordering and geometry property tests

use cardscan_node::vision::geometry::{order_quad, Point, Quad};

fn p(x: f32, y: f32) -> Point {
    Point { x, y }
}

#[test]
fn test_order_quad_from_shuffled_corners() {
    // Corners of the unit square in a scrambled order.
    let quad = order_quad([p(1.0, 1.0), p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)]);
    assert_eq!(quad.top_left(), p(0.0, 0.0));
    assert_eq!(quad.top_right(), p(1.0, 0.0));
    assert_eq!(quad.bottom_right(), p(1.0, 1.0));
    assert_eq!(quad.bottom_left(), p(0.0, 1.0));
}

#[test]
fn test_order_quad_is_idempotent() {
    let quad = order_quad([p(0.2, 0.9), p(0.8, 0.1), p(0.1, 0.1), p(0.9, 0.85)]);
    let again = order_quad([
        quad.top_left(),
        quad.top_right(),
        quad.bottom_right(),
        quad.bottom_left(),
    ]);
    assert_eq!(quad.to_arrays(), again.to_arrays());
}

#[test]
fn test_area_invariant_under_ordering() {
    // Whatever input order the corners come in, the ordered quad covers
    // the same region.
    let corners = [p(0.0, 0.0), p(2.0, 0.0), p(2.0, 3.0), p(0.0, 3.0)];
    let shuffled = [corners[2], corners[0], corners[3], corners[1]];
    assert!((order_quad(corners).area() - order_quad(shuffled).area()).abs() < 1e-6);
}

#[test]
fn test_normalized_roundtrip() {
    let quad = order_quad([p(10.0, 20.0), p(190.0, 25.0), p(185.0, 270.0), p(12.0, 265.0)]);
    let norm = quad.to_normalized(200, 300);
    let back = norm.to_pixels(200, 300);
    for (a, b) in quad.to_arrays().iter().zip(back.to_arrays().iter()) {
        assert!((a[0] - b[0]).abs() < 1e-3);
        assert!((a[1] - b[1]).abs() < 1e-3);
    }
}

#[test]
fn test_quad_from_arrays_preserves_order() {
    let arrays = [[0.1, 0.1], [0.9, 0.12], [0.88, 0.9], [0.11, 0.88]];
    let quad = Quad::from_arrays(arrays);
    assert_eq!(quad.to_arrays(), arrays);
}
