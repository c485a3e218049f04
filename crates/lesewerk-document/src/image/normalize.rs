// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution normalisation — upsample low-resolution scans to the target DPI
// before any enhancement runs.

use image::imageops::FilterType;
use tracing::{debug, info, instrument};

use super::source::SourceImage;

/// Upsample `source` to `target_dpi` if its declared resolution is lower.
///
/// A missing declaration, or one below 20 dpi, counts as 72 dpi. Both dimensions are scaled by
/// `target / declared` (truncated to whole pixels) with a Lanczos3 filter and
/// the result declares `target_dpi`. Images already at or above the target
/// are returned untouched, so re-applying with the same target is a no-op.
#[instrument(skip(source), fields(width = source.width(), height = source.height()))]
pub fn normalize_resolution(source: SourceImage, target_dpi: u32) -> SourceImage {
    let declared = source.declared_dpi_or_default();
    let target = target_dpi as f32;
    if declared >= target {
        debug!(declared, target_dpi, "Resolution already sufficient");
        return source;
    }

    let (new_w, new_h) = scaled_dimensions(source.width(), source.height(), declared, target_dpi);
    info!(
        declared,
        target_dpi,
        from_w = source.width(),
        from_h = source.height(),
        new_w,
        new_h,
        "Upsampling to target resolution"
    );
    let resized = source
        .into_dynamic()
        .resize_exact(new_w, new_h, FilterType::Lanczos3);
    SourceImage::from_dynamic(resized, Some(target))
}

/// `floor(dim * target / declared)`, never below one pixel.
fn scaled_dimensions(width: u32, height: u32, declared: f32, target_dpi: u32) -> (u32, u32) {
    let scale = |dim: u32| -> u32 {
        let scaled = (dim as f64 * target_dpi as f64 / declared as f64).floor();
        (scaled as u32).max(1)
    };
    (scale(width), scale(height))
}
