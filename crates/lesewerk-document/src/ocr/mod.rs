// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition — the engine boundary, the Tesseract binding, preset
// selection, and output normalisation.

pub mod engine;
pub mod select;
pub mod tesseract;
pub mod tokenize;

pub use engine::{RecognitionEngine, RecognitionRequest, RecognizedWord};
pub use select::{RecognitionSelector, Selection};
pub use tesseract::{EngineConfig, TesseractEngine, resolve_engine};
pub use tokenize::{Tokenizer, WhitespaceTokenizer, normalize_text};
