// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Point and quadrilateral helpers shared by every stage that touches
//! polygons.
//!
//! Corners are always kept in canonical order: top-left, top-right,
//! bottom-right, bottom-left. The ordering rule is the sum/difference
//! heuristic: top-left minimizes x+y, bottom-right maximizes x+y,
//! top-right minimizes x-y, bottom-left maximizes x-y.

/// A 2-D point in either pixel or normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A quadrilateral with corners in canonical TL/TR/BR/BL order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn top_left(&self) -> Point {
        self.0[0]
    }

    pub fn top_right(&self) -> Point {
        self.0[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.0[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.0[3]
    }

    /// Polygon area via the shoelace formula.
    pub fn area(&self) -> f32 {
        let p = &self.0;
        let mut acc = 0.0f32;
        for i in 0..4 {
            let j = (i + 1) % 4;
            acc += p[i].x * p[j].y - p[j].x * p[i].y;
        }
        (acc / 2.0).abs()
    }

    pub fn centroid(&self) -> Point {
        let p = &self.0;
        Point::new(
            (p[0].x + p[1].x + p[2].x + p[3].x) / 4.0,
            (p[0].y + p[1].y + p[2].y + p[3].y) / 4.0,
        )
    }

    /// Scale normalized ([0,1]) corners to pixel space.
    pub fn to_pixels(&self, width: u32, height: u32) -> Quad {
        Quad(self
            .0
            .map(|p| Point::new(p.x * width as f32, p.y * height as f32)))
    }

    /// Scale pixel-space corners down to normalized [0,1] coordinates.
    pub fn to_normalized(&self, width: u32, height: u32) -> Quad {
        Quad(self
            .0
            .map(|p| Point::new(p.x / width as f32, p.y / height as f32)))
    }

    /// Clamp every corner into the given pixel bounds.
    pub fn clamp(&self, width: u32, height: u32) -> Quad {
        let max_x = (width.saturating_sub(1)) as f32;
        let max_y = (height.saturating_sub(1)) as f32;
        Quad(self
            .0
            .map(|p| Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))))
    }

    /// Push every corner outward from the centroid by `fraction` of its
    /// distance. Used to recover border margin lost to tight detection.
    pub fn pad(&self, fraction: f32) -> Quad {
        let c = self.centroid();
        Quad(self.0.map(|p| {
            Point::new(c.x + (p.x - c.x) * (1.0 + fraction), c.y + (p.y - c.y) * (1.0 + fraction))
        }))
    }

    pub fn to_arrays(&self) -> [[f32; 2]; 4] {
        self.0.map(|p| [p.x, p.y])
    }

    pub fn from_arrays(arr: [[f32; 2]; 4]) -> Quad {
        Quad(arr.map(|[x, y]| Point::new(x, y)))
    }
}

/// Order four arbitrary corners into canonical TL/TR/BR/BL positions.
///
/// Idempotent: reordering an already-ordered quad returns the same quad.
pub fn order_quad(points: [Point; 4]) -> Quad {
    let mut tl = points[0];
    let mut tr = points[0];
    let mut br = points[0];
    let mut bl = points[0];

    for p in points {
        if p.x + p.y < tl.x + tl.y {
            tl = p;
        }
        if p.x + p.y > br.x + br.y {
            br = p;
        }
        if p.x - p.y > tr.x - tr.y {
            tr = p;
        }
        if p.x - p.y < bl.x - bl.y {
            bl = p;
        }
    }

    Quad([tl, tr, br, bl])
}
