// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — loading with resolution metadata and resolution normalisation.

pub mod dpi;
pub mod normalize;
pub mod source;

pub use normalize::normalize_resolution;
pub use source::SourceImage;
