// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source image — the decoded upload plus its declared resolution.

use image::{DynamicImage, GrayImage, ImageFormat};
use lesewerk_core::error::{LesewerkError, Result};
use tracing::{debug, info, instrument};

use super::dpi::{MIN_DECLARED_DPI, probe_dpi};

/// Resolution assumed when the file does not declare one.
pub const FALLBACK_DPI: f32 = 72.0;

/// Formats accepted from the user.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// File extensions offered in the file picker.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// A user-provided image and its optional declared resolution.
///
/// Immutable once loaded; pipeline stages derive new images from it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
    dpi: Option<f32>,
}

impl SourceImage {
    /// Decode raw image bytes (JPEG, PNG, BMP or TIFF).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = image::guess_format(data).map_err(|err| {
            LesewerkError::UnsupportedImage(format!("unrecognised image data: {}", err))
        })?;
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(LesewerkError::UnsupportedImage(format!("{:?}", format)));
        }

        let image = image::load_from_memory_with_format(data, format).map_err(|err| {
            LesewerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        let dpi = probe_dpi(data, format);
        info!(
            width = image.width(),
            height = image.height(),
            ?format,
            ?dpi,
            "Source image loaded"
        );
        Ok(Self { image, dpi })
    }

    /// Read and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Wrap an already-decoded image.
    pub fn from_dynamic(image: DynamicImage, dpi: Option<f32>) -> Self {
        Self { image, dpi }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Declared resolution, if the file carried one.
    pub fn dpi(&self) -> Option<f32> {
        self.dpi
    }

    /// Declared resolution, or 72 when absent.
    pub fn declared_dpi_or_default(&self) -> f32 {
        self.dpi
            .filter(|dpi| *dpi >= MIN_DECLARED_DPI)
            .unwrap_or(FALLBACK_DPI)
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Single-channel intensity via the standard luma transform.
    pub fn to_luma(&self) -> GrayImage {
        debug!("Converting source to luma");
        self.image.to_luma8()
    }

    /// Encode as PNG for display.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }
}

/// Encode any image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| LesewerkError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}
