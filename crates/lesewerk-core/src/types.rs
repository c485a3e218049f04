// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Lesewerk document reader.

use serde::{Deserialize, Serialize};

use crate::error::{LesewerkError, Result};

/// Target resolution for recognition, in dots per inch.
///
/// The UI offers 72..=600 in steps of 72; the default of 300 is the usual
/// sweet spot for printed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TargetDpi(u32);

impl TargetDpi {
    pub const MIN: u32 = 72;
    pub const MAX: u32 = 600;
    pub const STEP: u32 = 72;
    pub const DEFAULT: u32 = 300;

    /// Validate and wrap a resolution value.
    pub fn new(dpi: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&dpi) {
            Ok(Self(dpi))
        } else {
            Err(LesewerkError::InvalidTargetDpi(dpi))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Positions for a stepped slider: every step from the minimum, plus the
    /// default and the maximum, which fall between steps.
    pub fn slider_stops() -> Vec<u32> {
        let mut stops: Vec<u32> = (Self::MIN..=Self::MAX)
            .step_by(Self::STEP as usize)
            .collect();
        stops.extend([Self::DEFAULT, Self::MAX]);
        stops.sort_unstable();
        stops.dedup();
        stops
    }

    /// Index into [`slider_stops`](Self::slider_stops) closest to `dpi`.
    pub fn stop_index(dpi: u32) -> usize {
        Self::slider_stops()
            .iter()
            .enumerate()
            .min_by_key(|(_, stop)| stop.abs_diff(dpi))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

impl Default for TargetDpi {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u32> for TargetDpi {
    type Error = LesewerkError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TargetDpi> for u32 {
    fn from(value: TargetDpi) -> Self {
        value.0
    }
}

impl std::fmt::Display for TargetDpi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} dpi", self.0)
    }
}

/// Page segmentation mode: how the engine assumes text is laid out.
///
/// Discriminants are the engine's own `--psm` numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSegMode {
    /// Orientation and script detection only.
    OsdOnly = 0,
    /// Automatic segmentation with orientation and script detection.
    AutoOsd = 1,
    /// Automatic segmentation, no OSD, no recognition.
    AutoOnly = 2,
    /// Fully automatic page segmentation.
    Auto = 3,
    /// A single column of text of variable sizes.
    SingleColumn = 4,
    /// A single uniform block of vertically aligned text.
    SingleBlockVertText = 5,
    /// A single uniform block of text.
    SingleBlock = 6,
    /// A single text line.
    SingleLine = 7,
    /// A single word.
    SingleWord = 8,
    /// A single word in a circle.
    CircleWord = 9,
    /// A single character.
    SingleChar = 10,
    /// As much text as possible, in no particular order.
    SparseText = 11,
    /// Sparse text with orientation and script detection.
    SparseTextOsd = 12,
    /// A single line, bypassing engine-specific hacks.
    RawLine = 13,
}

impl PageSegMode {
    /// The preset sweep tried for every candidate image, in tie-break order.
    pub const DEFAULT_PRESETS: [PageSegMode; 3] = [
        PageSegMode::SingleBlock,
        PageSegMode::Auto,
        PageSegMode::SingleColumn,
    ];

    /// The numeric value passed to the engine.
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "psm {}", self.number())
    }
}

/// Recognition algorithm variant used by the engine. Held fixed per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineMode {
    LegacyOnly = 0,
    LstmOnly = 1,
    LegacyAndLstm = 2,
    /// Whatever the engine build supports.
    #[default]
    Default = 3,
}

impl EngineMode {
    pub fn number(self) -> u8 {
        self as u8
    }
}

/// Which preprocessing route produced a candidate image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    /// Local Gaussian-weighted threshold.
    Adaptive,
    /// Global Otsu threshold.
    Otsu,
    /// The adaptive variant after skew correction.
    Deskewed,
}

impl CandidateKind {
    /// Candidates in the order the orchestrator evaluates them.
    pub const ALL: [CandidateKind; 3] = [
        CandidateKind::Adaptive,
        CandidateKind::Otsu,
        CandidateKind::Deskewed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Adaptive => "adaptive threshold",
            Self::Otsu => "Otsu threshold",
            Self::Deskewed => "deskewed",
        }
    }
}
