// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Lesewerk.

use thiserror::Error;

/// Top-level error type for all Lesewerk operations.
#[derive(Debug, Error)]
pub enum LesewerkError {
    // -- Recognition engine --
    /// The engine executable could not be located or does not run. Fatal at
    /// startup.
    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A single engine invocation failed. Callers skip the trial and carry on.
    #[error("recognition engine failed: {0}")]
    Engine(String),

    // -- User input --
    #[error("no language selected")]
    NoLanguageSelected,

    #[error("invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("target resolution {0} dpi is outside the allowed range 72..=600")]
    InvalidTargetDpi(u32),

    // -- Images --
    #[error("unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LesewerkError>;
