// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Declared resolution probing. The `image` crate decodes pixels but drops
// density metadata. EXIF resolution tags come from `kamadak-exif`; the PNG
// `pHYs`, JFIF and BMP header fields it does not cover are read directly.

use std::io::Cursor;

use exif::{In, Tag, Value};
use image::ImageFormat;
use tracing::debug;

const INCHES_PER_METRE: f32 = 39.370_08;
const CM_PER_INCH: f32 = 2.54;

/// Densities below this are treated as undeclared. Real scans never declare
/// them, and honouring one would scale the page by hundreds.
pub const MIN_DECLARED_DPI: f32 = 20.0;

/// Read the declared horizontal resolution (dots per inch) from encoded image
/// bytes. Returns `None` when the container has no usable density.
pub fn probe_dpi(data: &[u8], format: ImageFormat) -> Option<f32> {
    let dpi = match format {
        ImageFormat::Png => png_dpi(data).or_else(|| exif_dpi(data)),
        ImageFormat::Jpeg => jfif_dpi(data).or_else(|| exif_dpi(data)),
        ImageFormat::Bmp => bmp_dpi(data),
        ImageFormat::Tiff => exif_dpi(data),
        _ => None,
    }?;
    if !dpi.is_finite() || dpi < MIN_DECLARED_DPI {
        debug!(dpi, "Ignoring implausible declared resolution");
        return None;
    }
    Some(dpi)
}

fn per_metre_to_dpi(per_metre: u32) -> f32 {
    (per_metre as f32 / INCHES_PER_METRE).round()
}

// -- EXIF ---------------------------------------------------------------------

/// `XResolution` scaled by `ResolutionUnit` (2 = inch, the default; 3 = cm).
/// Covers TIFF files, JPEG `APP1` and PNG `eXIf`.
fn exif_dpi(data: &[u8]) -> Option<f32> {
    let reader = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;

    let x_resolution = match &reader.get_field(Tag::XResolution, In::PRIMARY)?.value {
        Value::Rational(values) => {
            let r = values.first()?;
            (r.denom > 0).then(|| r.num as f32 / r.denom as f32)?
        }
        _ => return None,
    };
    let unit = reader
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(2);
    match unit {
        2 => Some(x_resolution),
        3 => Some((x_resolution * CM_PER_INCH).round()),
        _ => None,
    }
}

// -- PNG ----------------------------------------------------------------------

/// `pHYs` chunk: x/y pixels per unit and a unit byte (1 = metre).
fn png_dpi(data: &[u8]) -> Option<f32> {
    let mut pos = 8;
    while pos + 8 <= data.len() {
        let len = be_u32(data, pos)? as usize;
        let kind = data.get(pos + 4..pos + 8)?;
        let body = data.get(pos + 8..pos + 8 + len)?;
        match kind {
            b"pHYs" => {
                let per_unit = be_u32(body, 0)?;
                let unit = *body.get(8)?;
                return (unit == 1).then(|| per_metre_to_dpi(per_unit));
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        // length + type + body + crc
        pos += 12 + len;
    }
    None
}

// -- JPEG ---------------------------------------------------------------------

/// JFIF `APP0` density.
fn jfif_dpi(data: &[u8]) -> Option<f32> {
    if data.get(0..2)? != [0xFF, 0xD8] {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Start of scan: no more metadata segments.
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        let len = be_u16(data, pos + 2)? as usize;
        let body = data.get(pos + 4..pos + 2 + len)?;
        if marker == 0xE0 && body.starts_with(b"JFIF\0") {
            let units = *body.get(7)?;
            let x_density = be_u16(body, 8)? as f32;
            return match units {
                1 => Some(x_density),
                2 => Some((x_density * CM_PER_INCH).round()),
                _ => None,
            };
        }
        pos += 2 + len;
    }
    None
}

// -- BMP ----------------------------------------------------------------------

/// `biXPelsPerMeter` from a BITMAPINFOHEADER (or any larger DIB header).
fn bmp_dpi(data: &[u8]) -> Option<f32> {
    if data.get(0..2)? != b"BM" {
        return None;
    }
    let header_size = le_u32(data, 14)?;
    if header_size < 40 {
        return None;
    }
    let per_metre = le_u32(data, 38)?;
    (per_metre > 0).then(|| per_metre_to_dpi(per_metre))
}

// -- Byte helpers -------------------------------------------------------------

fn be_u16(data: &[u8], pos: usize) -> Option<u16> {
    Some(u16::from_be_bytes(data.get(pos..pos + 2)?.try_into().ok()?))
}

fn be_u32(data: &[u8], pos: usize) -> Option<u32> {
    Some(u32::from_be_bytes(data.get(pos..pos + 4)?.try_into().ok()?))
}

fn le_u32(data: &[u8], pos: usize) -> Option<u32> {
    Some(u32::from_le_bytes(data.get(pos..pos + 4)?.try_into().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([200u8])));
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    /// Insert a `pHYs` chunk right after IHDR (signature + 25-byte IHDR chunk).
    fn with_phys(png: &[u8], per_metre: u32, unit: u8) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&per_metre.to_be_bytes());
        body.extend_from_slice(&per_metre.to_be_bytes());
        body.push(unit);
        let mut chunk = Vec::new();
        chunk.extend_from_slice(&(body.len() as u32).to_be_bytes());
        chunk.extend_from_slice(b"pHYs");
        chunk.extend_from_slice(&body);
        chunk.extend_from_slice(&[0, 0, 0, 0]);
        let split = 8 + 25;
        [&png[..split], &chunk[..], &png[split..]].concat()
    }

    #[test]
    fn png_without_phys_has_no_dpi() {
        assert_eq!(probe_dpi(&encode(ImageFormat::Png), ImageFormat::Png), None);
    }

    #[test]
    fn png_phys_metres_converted_and_rounded() {
        let png = with_phys(&encode(ImageFormat::Png), 11811, 1);
        assert_eq!(probe_dpi(&png, ImageFormat::Png), Some(300.0));
    }

    #[test]
    fn png_phys_unknown_unit_ignored() {
        let png = with_phys(&encode(ImageFormat::Png), 1, 0);
        assert_eq!(probe_dpi(&png, ImageFormat::Png), None);
    }

    #[test]
    fn jfif_density_in_dpi() {
        // SOI, APP0 JFIF 1.01, units=1, 150x150 dpi, no thumbnail.
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[1, 1, 1, 0, 150, 0, 150, 0, 0]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        assert_eq!(probe_dpi(&jpeg, ImageFormat::Jpeg), Some(150.0));
    }

    #[test]
    fn jfif_density_in_dots_per_cm() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[1, 1, 2, 0, 118, 0, 118, 0, 0]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        assert_eq!(probe_dpi(&jpeg, ImageFormat::Jpeg), Some(300.0));
    }

    #[test]
    fn bmp_pixels_per_metre() {
        let mut bmp = encode(ImageFormat::Bmp);
        bmp[38..42].copy_from_slice(&2835u32.to_le_bytes());
        assert_eq!(probe_dpi(&bmp, ImageFormat::Bmp), Some(72.0));
    }

    /// Little-endian TIFF header and one IFD holding XResolution = `dpi`/1
    /// and ResolutionUnit = `unit`.
    fn tiff_header(dpi: u32, unit: u16) -> Vec<u8> {
        let mut tiff = vec![b'I', b'I', 42, 0, 8, 0, 0, 0];
        tiff.extend_from_slice(&2u16.to_le_bytes());
        // XResolution, RATIONAL, count 1, value at offset 38.
        tiff.extend_from_slice(&282u16.to_le_bytes());
        tiff.extend_from_slice(&5u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&38u32.to_le_bytes());
        // ResolutionUnit, SHORT, count 1, inline.
        tiff.extend_from_slice(&296u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&[unit as u8, 0, 0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(tiff.len(), 38);
        tiff.extend_from_slice(&dpi.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff
    }

    #[test]
    fn tiff_resolution_in_inches() {
        assert_eq!(probe_dpi(&tiff_header(600, 2), ImageFormat::Tiff), Some(600.0));
    }

    #[test]
    fn tiff_resolution_in_centimetres() {
        assert_eq!(probe_dpi(&tiff_header(118, 3), ImageFormat::Tiff), Some(300.0));
    }

    #[test]
    fn jpeg_exif_resolution_without_jfif() {
        let tiff = tiff_header(200, 2);
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
        jpeg.extend_from_slice(b"Exif\0\0");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        assert_eq!(probe_dpi(&jpeg, ImageFormat::Jpeg), Some(200.0));
    }

    #[test]
    fn tiny_declared_density_is_ignored() {
        // 20 px/m rounds to 1 dpi; honouring it would scale by hundreds.
        let png = with_phys(&encode(ImageFormat::Png), 20, 1);
        assert_eq!(probe_dpi(&png, ImageFormat::Png), None);
        assert_eq!(probe_dpi(&tiff_header(5, 2), ImageFormat::Tiff), None);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(probe_dpi(b"not an image", ImageFormat::Jpeg), None);
        assert_eq!(probe_dpi(&[], ImageFormat::Tiff), None);
    }
}
