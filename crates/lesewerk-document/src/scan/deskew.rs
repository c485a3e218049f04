// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew correction — estimate the text block's rotation from the minimum-area
// rectangle around its foreground pixels and rotate it back to horizontal.

use image::{GrayImage, Luma};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Which pixels count as text when estimating skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Foreground {
    /// Every non-zero pixel.
    #[default]
    NonZero,
    /// Pixels darker than mid-grey, i.e. ink on a binarized page.
    DarkInk,
}

impl Foreground {
    fn contains(self, value: u8) -> bool {
        match self {
            Self::NonZero => value > 0,
            Self::DarkInk => value < 128,
        }
    }
}

/// Rotate `image` so its text lines run horizontally.
///
/// Images without foreground pixels are returned unchanged. Output always has
/// the input's dimensions; exposed corners replicate the nearest edge pixel.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn deskew(image: &GrayImage, foreground: Foreground) -> GrayImage {
    match estimate_skew(image, foreground) {
        Some(angle) => {
            info!(angle, "Correcting skew");
            rotate_replicate(image, angle)
        }
        None => {
            debug!("No foreground pixels; skipping rotation");
            image.clone()
        }
    }
}

/// Effective correction angle in degrees, in `[-45, 45)`, or `None` when the
/// image has fewer than two distinct foreground points.
pub fn estimate_skew(image: &GrayImage, foreground: Foreground) -> Option<f32> {
    let points: Vec<Point<i32>> = image
        .enumerate_pixels()
        .filter(|(_, _, p)| foreground.contains(p.0[0]))
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect();
    if points.is_empty() {
        return None;
    }
    let raw = min_area_rect_angle(&points)?;
    let angle = normalize_angle(raw);
    debug!(points = points.len(), raw, angle, "Skew estimated");
    Some(angle)
}

/// Rotation of the minimum-area bounding rectangle, reported in `[-90, 0)`.
///
/// Rotating calipers over the convex hull: the optimal rectangle always has
/// one side flush with a hull edge, so each edge direction is tried and the
/// smallest enclosing area wins.
pub fn min_area_rect_angle(points: &[Point<i32>]) -> Option<f32> {
    let hull = convex_hull(points);
    if hull.len() < 2 {
        return None;
    }

    let mut best: Option<(f64, f64)> = None;
    for (i, p) in hull.iter().enumerate() {
        let q = hull[(i + 1) % hull.len()];
        let (ex, ey) = ((q.x - p.x) as f64, (q.y - p.y) as f64);
        let len = ex.hypot(ey);
        if len == 0.0 {
            continue;
        }
        let (ux, uy) = (ex / len, ey / len);

        let (mut min_s, mut max_s, mut min_t, mut max_t) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for h in &hull {
            let (dx, dy) = ((h.x - p.x) as f64, (h.y - p.y) as f64);
            let s = dx * ux + dy * uy;
            let t = -dx * uy + dy * ux;
            min_s = min_s.min(s);
            max_s = max_s.max(s);
            min_t = min_t.min(t);
            max_t = max_t.max(t);
        }
        let area = (max_s - min_s) * (max_t - min_t);
        if best.is_none_or(|(best_area, _)| area < best_area) {
            best = Some((area, uy.atan2(ux).to_degrees()));
        }
    }

    best.map(|(_, edge_angle)| (edge_angle.rem_euclid(90.0) - 90.0) as f32)
}

/// Map a raw rectangle angle to the correction to apply: below -45 degrees
/// the rectangle is read as turned a quarter, giving `90 + raw`.
pub fn normalize_angle(raw: f32) -> f32 {
    if raw < -45.0 { 90.0 + raw } else { raw }
}

/// Rotate about the image centre by `degrees` (positive turns content
/// counter-clockwise on screen) with bicubic sampling and replicated borders.
pub fn rotate_replicate(image: &GrayImage, degrees: f32) -> GrayImage {
    if degrees == 0.0 {
        return image.clone();
    }
    let (width, height) = image.dimensions();
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let (sin, cos) = degrees.to_radians().sin_cos();

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let sx = cx + cos * dx - sin * dy;
        let sy = cy + sin * dx + cos * dy;
        Luma([sample_bicubic(image, sx, sy)])
    })
}

/// Keys cubic convolution weights (a = -0.75).
fn cubic_weights(t: f32) -> [f32; 4] {
    const A: f32 = -0.75;
    let w0 = ((A * (t + 1.0) - 5.0 * A) * (t + 1.0) + 8.0 * A) * (t + 1.0) - 4.0 * A;
    let w1 = ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0;
    let w2 = ((A + 2.0) * (1.0 - t) - (A + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

fn sample_bicubic(image: &GrayImage, x: f32, y: f32) -> u8 {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = cubic_weights(x - x0);
    let wy = cubic_weights(y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = 0f32;
    for (j, wyj) in wy.iter().enumerate() {
        let sy = (y0 - 1 + j as i64).clamp(0, max_y) as u32;
        let mut row = 0f32;
        for (i, wxi) in wx.iter().enumerate() {
            let sx = (x0 - 1 + i as i64).clamp(0, max_x) as u32;
            row += wxi * image.get_pixel(sx, sy).0[0] as f32;
        }
        acc += wyj * row;
    }
    acc.round().clamp(0.0, 255.0) as u8
}
