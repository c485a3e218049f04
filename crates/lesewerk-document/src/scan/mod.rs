// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan preprocessing — contrast enhancement, denoising, binarization, and
// skew correction.

pub mod binarize;
pub mod deskew;
pub mod enhance;

pub use binarize::{AdaptiveParams, BinarizedPair, binarize};
pub use deskew::{Foreground, deskew};
pub use enhance::{ClaheParams, DenoiseParams, ScanEnhancer};
