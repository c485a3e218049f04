// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization — two black/white renderings of the enhanced scan, one with a
// local Gaussian-weighted threshold and one with a global Otsu threshold.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::separable_filter_equal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Local threshold settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveParams {
    /// Side of the square neighbourhood. Must be odd.
    pub window: u32,
    /// Subtracted from the weighted local mean to form the threshold.
    pub offset: f32,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            window: 21,
            offset: 10.0,
        }
    }
}

/// Both binary renderings of one enhanced image. Pixels are 0 or 255.
#[derive(Debug, Clone)]
pub struct BinarizedPair {
    /// Local Gaussian threshold; copes with uneven lighting.
    pub adaptive: GrayImage,
    /// Global Otsu threshold; best for evenly lit scans.
    pub otsu: GrayImage,
}

/// Produce both binary variants of `gray`.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn binarize(gray: &GrayImage, params: &AdaptiveParams) -> BinarizedPair {
    info!(window = params.window, offset = params.offset, "Binarizing");
    BinarizedPair {
        adaptive: adaptive_gaussian_threshold(gray, params.window, params.offset),
        otsu: otsu_binarize(gray),
    }
}

/// Per-pixel threshold from a Gaussian-weighted `window` x `window`
/// neighbourhood mean minus `offset`. Pixels above the threshold turn white.
///
/// The Gaussian sigma follows the usual derivation from the window size,
/// `0.3 * ((window - 1) / 2 - 1) + 0.8`, and borders replicate.
pub fn adaptive_gaussian_threshold(gray: &GrayImage, window: u32, offset: f32) -> GrayImage {
    let window = (window | 1).max(3);
    let kernel = gaussian_kernel(window);
    let mean = local_mean(gray, &kernel);

    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y).0[0] as f32;
        let local = mean.get_pixel(x, y).0[0].round();
        if value > local - offset {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Global threshold minimising intra-class variance.
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!(level, "Otsu level computed");
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if gray.get_pixel(x, y).0[0] > level {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Normalised 1-D Gaussian of odd length `size`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;
    let scale = -0.5 / (sigma * sigma);
    let raw: Vec<f32> = (-half..=half)
        .map(|i| ((i * i) as f32 * scale).exp())
        .collect();
    let total: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Gaussian-weighted local mean, computed in floating point so the
/// threshold comparison is not quantised. Borders replicate.
fn local_mean(gray: &GrayImage, kernel: &[f32]) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let (width, height) = gray.dimensions();
    let float = ImageBuffer::from_fn(width, height, |x, y| Luma([gray.get_pixel(x, y).0[0] as f32]));
    separable_filter_equal(&float, kernel)
}
