// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement — local contrast equalisation (CLAHE), edge-preserving
// denoising, and speckle removal by morphological closing.

use image::{GrayImage, Luma};
use imageproc::filter::bilateral_filter;
use imageproc::morphology::{Mask, grayscale_close};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::image::SourceImage;

/// Contrast-limited adaptive histogram equalisation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClaheParams {
    /// Histogram clip limit, relative to a flat histogram.
    pub clip_limit: f32,
    /// Number of tiles along each axis.
    pub tile_grid: u32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: 8,
        }
    }
}

/// Bilateral filter and closing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenoiseParams {
    /// Neighbourhood diameter in pixels.
    pub diameter: u32,
    /// Intensity-difference sigma.
    pub sigma_color: f32,
    /// Spatial-distance sigma.
    pub sigma_space: f32,
    /// Side of the square closing kernel. 1 leaves the image unchanged.
    pub close_kernel: u32,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
            close_kernel: 1,
        }
    }
}

/// Enhances a single-channel scan ahead of binarization.
///
/// Each step consumes `self` and returns the transformed enhancer, so the
/// stages chain:
///
/// ```ignore
/// let gray = ScanEnhancer::from_source(&source)
///     .equalize(&ClaheParams::default())
///     .denoise(&DenoiseParams::default())
///     .into_gray();
/// ```
pub struct ScanEnhancer {
    /// The working intensity image.
    image: GrayImage,
}

impl ScanEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Start from a source image, converting colour to luma.
    pub fn from_source(source: &SourceImage) -> Self {
        Self {
            image: source.to_luma(),
        }
    }

    /// Wrap an existing intensity image.
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn into_gray(self) -> GrayImage {
        self.image
    }

    // -- Stages ---------------------------------------------------------------

    /// Local contrast normalisation.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn equalize(self, params: &ClaheParams) -> Self {
        info!(
            clip_limit = params.clip_limit,
            tile_grid = params.tile_grid,
            "Applying CLAHE"
        );
        Self {
            image: clahe(&self.image, params.clip_limit, params.tile_grid),
        }
    }

    /// Edge-preserving smoothing followed by a closing.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn denoise(self, params: &DenoiseParams) -> Self {
        info!(
            diameter = params.diameter,
            sigma_color = params.sigma_color,
            sigma_space = params.sigma_space,
            close_kernel = params.close_kernel,
            "Denoising"
        );
        let smoothed = bilateral(
            &self.image,
            params.diameter,
            params.sigma_color,
            params.sigma_space,
        );
        Self {
            image: close(&smoothed, params.close_kernel),
        }
    }
}

// -- CLAHE --------------------------------------------------------------------

/// Contrast-limited adaptive histogram equalisation.
///
/// The image is split into a `tile_grid` x `tile_grid` grid. Each tile gets an
/// equalisation lookup table built from its histogram, clipped at
/// `clip_limit` times the flat-histogram height with the excess spread evenly
/// over all bins. Output pixels blend the tables of the four nearest tile
/// centres bilinearly, which hides tile seams.
pub fn clahe(gray: &GrayImage, clip_limit: f32, tile_grid: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tile_grid = tile_grid.max(1);
    let tile_w = width.div_ceil(tile_grid);
    let tile_h = height.div_ceil(tile_grid);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let area = (x1 - x0) * (y1 - y0);
            luts.push(tile_lut(&mut histogram, area, clip_limit));
        }
    }
    debug!(tiles_x, tiles_y, tile_w, tile_h, "CLAHE tables built");

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];
    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;

    GrayImage::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y).0[0] as usize;

        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor();
        let ya = tyf - ty1;
        let ty2 = ((ty1 as i64 + 1).min(tiles_y as i64 - 1)) as u32;
        let ty1 = ty1.max(0.0) as u32;

        let txf = x as f32 * inv_tw - 0.5;
        let tx1 = txf.floor();
        let xa = txf - tx1;
        let tx2 = ((tx1 as i64 + 1).min(tiles_x as i64 - 1)) as u32;
        let tx1 = tx1.max(0.0) as u32;

        let top = lut_at(tx1, ty1)[value] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[value] as f32 * xa;
        let bottom =
            lut_at(tx1, ty2)[value] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[value] as f32 * xa;
        let blended = top * (1.0 - ya) + bottom * ya;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Clip a tile histogram, redistribute the excess, and integrate it into an
/// equalisation table.
fn tile_lut(histogram: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in histogram.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let batch = excess / 256;
        let mut residual = excess % 256;
        for bin in histogram.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (256 / residual as usize).max(1);
            for bin in histogram.iter_mut().step_by(step) {
                if residual == 0 {
                    break;
                }
                *bin += 1;
                residual -= 1;
            }
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0u32;
    for (entry, &count) in lut.iter_mut().zip(histogram.iter()) {
        sum += count;
        *entry = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

// -- Denoising ----------------------------------------------------------------

/// Edge-preserving smoothing with `imageproc`'s square-window bilateral
/// filter. Borders replicate. Empty images and diameters below 2 pass
/// through.
pub fn bilateral(gray: &GrayImage, diameter: u32, sigma_color: f32, sigma_space: f32) -> GrayImage {
    if diameter < 2 || gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    bilateral_filter(gray, diameter, sigma_color, sigma_space)
}

/// Grayscale closing (dilate, then erode) with a square of side
/// `2 * (kernel / 2) + 1`. A 1x1 kernel returns the image unchanged.
pub fn close(gray: &GrayImage, kernel: u32) -> GrayImage {
    if kernel <= 1 {
        return gray.clone();
    }
    let radius = u8::try_from(kernel / 2).unwrap_or(u8::MAX);
    grayscale_close(gray, &Mask::square(radius))
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    /// Left half dark, right half light, with low contrast overall.
    fn low_contrast(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < width / 2 { Luma([110u8]) } else { Luma([140u8]) }
        })
    }

    #[test]
    fn clahe_keeps_dimensions_and_stretches_contrast() {
        // Faint texture spanning only 16 grey levels.
        let input = GrayImage::from_fn(256, 256, |x, y| Luma([120 + ((x + y) % 16) as u8]));
        let output = clahe(&input, 2.0, 8);
        assert_eq!(output.dimensions(), (256, 256));

        let min = output.pixels().map(|p| p.0[0]).min().unwrap();
        let max = output.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(
            max - min > 30,
            "expected spread wider than 30, got {min}..{max}"
        );
    }

    #[test]
    fn clahe_flat_image_stays_flat() {
        let input = GrayImage::from_pixel(40, 40, Luma([90u8]));
        let output = clahe(&input, 2.0, 8);
        let first = output.get_pixel(0, 0).0[0];
        assert!(output.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn clahe_handles_images_smaller_than_grid() {
        let input = low_contrast(5, 3);
        let output = clahe(&input, 2.0, 8);
        assert_eq!(output.dimensions(), (5, 3));
    }

    #[test]
    fn clip_limit_redistributes_excess() {
        let mut histogram = [0u32; 256];
        histogram[10] = 64;
        let lut = tile_lut(&mut histogram, 64, 2.0);
        // Limit is max(1, 2*64/256) = 1; the spike is flattened so the table
        // ramps instead of jumping straight to white at bin 10.
        assert!(lut[10] < 255);
        assert_eq!(lut[255], 255);
    }

    #[test]
    fn bilateral_smooths_noise_but_keeps_edges() {
        let mut input = GrayImage::from_fn(30, 30, |x, _| {
            if x < 15 { Luma([20u8]) } else { Luma([230u8]) }
        });
        input.put_pixel(5, 5, Luma([60u8]));

        let output = bilateral(&input, 9, 75.0, 75.0);
        assert_eq!(output.dimensions(), (30, 30));
        // Isolated speck pulled back toward its neighbourhood.
        assert!(output.get_pixel(5, 5).0[0] < 40);
        // Edge survives: columns either side stay far apart.
        let left = output.get_pixel(13, 15).0[0] as i32;
        let right = output.get_pixel(16, 15).0[0] as i32;
        assert!(right - left > 150, "edge blurred: {left} vs {right}");
    }

    #[test]
    fn unit_closing_is_identity() {
        let input = low_contrast(10, 10);
        assert_eq!(close(&input, 1), input);
    }

    #[test]
    fn closing_fills_dark_speck() {
        let mut input = GrayImage::from_pixel(9, 9, Luma([200u8]));
        input.put_pixel(4, 4, Luma([0u8]));
        let output = close(&input, 3);
        assert_eq!(output.get_pixel(4, 4).0[0], 200);
    }

    #[test]
    fn closing_matches_square_mask_of_half_kernel() {
        let input = GrayImage::from_fn(16, 16, |x, y| Luma([((x * 37 + y * 11) % 256) as u8]));
        assert_eq!(close(&input, 3), grayscale_close(&input, &Mask::square(1)));
    }

    #[test]
    fn bilateral_passes_empty_and_unit_windows_through() {
        let empty = GrayImage::new(0, 0);
        assert_eq!(bilateral(&empty, 9, 75.0, 75.0).dimensions(), (0, 0));
        let input = low_contrast(6, 6);
        assert_eq!(bilateral(&input, 1, 75.0, 75.0), input);
    }

    #[test]
    fn enhancer_converts_colour_to_luma() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 8, Rgb([200, 40, 40])));
        let source = SourceImage::from_dynamic(rgb, None);
        let gray = ScanEnhancer::from_source(&source)
            .equalize(&ClaheParams::default())
            .denoise(&DenoiseParams::default())
            .into_gray();
        assert_eq!(gray.dimensions(), (12, 8));
    }
}
