// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesewerk-document — Scan preprocessing and text recognition for Lesewerk.
//
// Loads images with their declared resolution, prepares three binarized
// candidates (adaptive, Otsu, deskewed), sweeps the recognition engine's
// page-segmentation presets over each, and keeps the most confident reading.

pub mod image;
pub mod ocr;
pub mod pipeline;
pub mod scan;

// Re-export the primary types so callers can use `lesewerk_document::DocumentPipeline` etc.
pub use image::SourceImage;
pub use ocr::{EngineConfig, RecognitionEngine, TesseractEngine, resolve_engine};
pub use pipeline::{DocumentPipeline, PipelineConfig, RecognitionResult};
pub use scan::ScanEnhancer;
