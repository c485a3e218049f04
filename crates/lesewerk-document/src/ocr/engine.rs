// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition engine boundary — what the selector needs from any OCR backend.

use image::GrayImage;
use lesewerk_core::error::Result;
use lesewerk_core::{EngineMode, PageSegMode};
use serde::{Deserialize, Serialize};

/// Configuration for a single engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub psm: PageSegMode,
    pub engine_mode: EngineMode,
    /// Engine language string, e.g. `eng+fra`.
    pub languages: String,
}

impl RecognitionRequest {
    pub fn new(psm: PageSegMode, engine_mode: EngineMode, languages: impl Into<String>) -> Self {
        Self {
            psm,
            engine_mode,
            languages: languages.into(),
        }
    }
}

/// One word reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    /// Certainty in `0..=100`; `None` when the engine reports it as unknown.
    pub confidence: Option<f32>,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Anything that turns an image into words with per-word confidence.
///
/// A failed call affects only that trial; the selector logs and moves on.
pub trait RecognitionEngine {
    fn recognize(&self, image: &GrayImage, request: &RecognitionRequest) -> Result<Vec<RecognizedWord>>;
}

impl<F> RecognitionEngine for F
where
    F: Fn(&GrayImage, &RecognitionRequest) -> Result<Vec<RecognizedWord>>,
{
    fn recognize(&self, image: &GrayImage, request: &RecognitionRequest) -> Result<Vec<RecognizedWord>> {
        self(image, request)
    }
}

/// Arithmetic mean of the known confidences, or `None` if there are none.
pub fn mean_confidence(words: &[RecognizedWord]) -> Option<f32> {
    let known: Vec<f32> = words.iter().filter_map(|w| w.confidence).collect();
    if known.is_empty() {
        return None;
    }
    Some(known.iter().sum::<f32>() / known.len() as f32)
}

/// Words with visible content, in engine order, separated by single spaces.
pub fn join_words(words: &[RecognizedWord]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of words with visible content.
pub fn visible_word_count(words: &[RecognizedWord]) -> usize {
    words.iter().filter(|w| !w.text.trim().is_empty()).count()
}
