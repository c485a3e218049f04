// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document pipeline — normalise, enhance, binarize and deskew a scan into
// three candidate images, recognise each, and surface the single best result.
//
// Stages always run in the same order regardless of intermediate quality:
//
//   normalize -> equalize -> denoise -> binarize (adaptive + otsu)
//             -> deskew(adaptive) -> [adaptive, otsu, deskewed] -> select

use image::{DynamicImage, GrayImage};
use lesewerk_core::error::Result;
use lesewerk_core::{CandidateKind, EngineMode, LanguageSelection, PageSegMode, TargetDpi};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::image::source::encode_png;
use crate::image::{SourceImage, normalize_resolution};
use crate::ocr::engine::RecognitionEngine;
use crate::ocr::select::{RecognitionSelector, Selection};
use crate::ocr::tokenize::{Tokenizer, WhitespaceTokenizer, normalize_text};
use crate::scan::{
    AdaptiveParams, ClaheParams, DenoiseParams, Foreground, ScanEnhancer, binarize, deskew,
};

// -- Configuration ------------------------------------------------------------

/// Every tunable constant of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub clahe: ClaheParams,
    pub denoise: DenoiseParams,
    pub adaptive: AdaptiveParams,
    /// Page-segmentation presets, tried in order for every candidate.
    pub presets: Vec<PageSegMode>,
    pub engine_mode: EngineMode,
    /// Collapse whitespace in the winning text.
    pub normalize_whitespace: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clahe: ClaheParams::default(),
            denoise: DenoiseParams::default(),
            adaptive: AdaptiveParams::default(),
            presets: PageSegMode::DEFAULT_PRESETS.to_vec(),
            engine_mode: EngineMode::default(),
            normalize_whitespace: true,
        }
    }
}

// -- Candidates ---------------------------------------------------------------

/// One preprocessed rendering offered to the recognition engine.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub image: GrayImage,
}

/// Run every preprocessing stage and return the candidates in selection
/// order: adaptive, otsu, deskewed.
#[instrument(skip_all, fields(target_dpi = target_dpi.get()))]
pub fn prepare_candidates(
    source: SourceImage,
    target_dpi: TargetDpi,
    config: &PipelineConfig,
) -> Vec<Candidate> {
    let normalized = normalize_resolution(source, target_dpi.get());
    let enhanced = ScanEnhancer::from_source(&normalized)
        .equalize(&config.clahe)
        .denoise(&config.denoise)
        .into_gray();
    let pair = binarize(&enhanced, &config.adaptive);
    // Binarized candidates render ink black on white.
    let deskewed = deskew(&pair.adaptive, Foreground::DarkInk);

    vec![
        Candidate {
            kind: CandidateKind::Adaptive,
            image: pair.adaptive,
        },
        Candidate {
            kind: CandidateKind::Otsu,
            image: pair.otsu,
        },
        Candidate {
            kind: CandidateKind::Deskewed,
            image: deskewed,
        },
    ]
}

// -- Result -------------------------------------------------------------------

/// The single outcome surfaced per processed document.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Extracted words separated by single spaces; empty if nothing was read.
    pub text: String,
    /// Mean word confidence in percent, 0 when nothing was read.
    pub confidence: f32,
    /// The candidate the text came from.
    pub image: GrayImage,
    pub variant: CandidateKind,
    /// Winning preset, `None` when no trial was adopted.
    pub psm: Option<PageSegMode>,
    pub word_count: usize,
}

impl RecognitionResult {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// The winning candidate as PNG, for display.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_png(&DynamicImage::ImageLuma8(self.image.clone()))
    }
}

// -- Orchestrator -------------------------------------------------------------

/// Preprocessing plus recognition over a fixed engine and configuration.
pub struct DocumentPipeline<E: RecognitionEngine> {
    engine: E,
    config: PipelineConfig,
    tokenizer: Box<dyn Tokenizer + Send + Sync>,
}

impl<E: RecognitionEngine> DocumentPipeline<E> {
    pub fn new(engine: E, config: PipelineConfig) -> Self {
        Self {
            engine,
            config,
            tokenizer: Box::new(WhitespaceTokenizer),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + Send + Sync + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Validate the language codes, then process the document.
    ///
    /// An empty selection fails with `NoLanguageSelected` before any
    /// preprocessing or engine call.
    pub fn extract<I, S>(
        &self,
        source: SourceImage,
        target_dpi: TargetDpi,
        languages: I,
    ) -> Result<RecognitionResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selection = LanguageSelection::new(languages)?;
        Ok(self.process(source, target_dpi, &selection))
    }

    /// Best result across all candidates and presets.
    ///
    /// A candidate replaces the current best only with strictly higher
    /// confidence. If nothing scores, the first candidate is returned with
    /// empty text and zero confidence.
    #[instrument(skip(self, source), fields(
        width = source.width(),
        height = source.height(),
        langs = %languages.joined(),
    ))]
    pub fn process(
        &self,
        source: SourceImage,
        target_dpi: TargetDpi,
        languages: &LanguageSelection,
    ) -> RecognitionResult {
        let mut candidates = prepare_candidates(source, target_dpi, &self.config);
        let selector = RecognitionSelector::new(&self.engine)
            .with_presets(self.config.presets.clone())
            .with_engine_mode(self.config.engine_mode);
        let lang_string = languages.joined();

        let mut best: Option<(usize, Selection)> = None;
        let mut best_confidence = 0f32;
        for (index, candidate) in candidates.iter().enumerate() {
            let Some(selection) = selector.select(&candidate.image, &lang_string) else {
                debug!(variant = candidate.kind.label(), "Candidate produced no scored text");
                continue;
            };
            debug!(
                variant = candidate.kind.label(),
                psm = selection.psm.number(),
                confidence = selection.confidence,
                "Candidate scored"
            );
            if selection.confidence > best_confidence {
                best_confidence = selection.confidence;
                best = Some((index, selection));
            }
        }

        let result = match best {
            Some((index, selection)) => {
                let winner = candidates.swap_remove(index);
                let text = if self.config.normalize_whitespace {
                    normalize_text(self.tokenizer.as_ref(), &selection.text)
                } else {
                    selection.text
                };
                RecognitionResult {
                    text,
                    confidence: selection.confidence,
                    image: winner.image,
                    variant: winner.kind,
                    psm: Some(selection.psm),
                    word_count: selection.word_count,
                }
            }
            None => {
                let first = candidates.swap_remove(0);
                RecognitionResult {
                    text: String::new(),
                    confidence: 0.0,
                    image: first.image,
                    variant: first.kind,
                    psm: None,
                    word_count: 0,
                }
            }
        };

        info!(
            variant = result.variant.label(),
            psm = ?result.psm.map(PageSegMode::number),
            confidence = result.confidence,
            words = result.word_count,
            "Document processed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::engine::{RecognitionRequest, RecognizedWord};
    use crate::scan::deskew::{estimate_skew, rotate_replicate};
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use lesewerk_core::LesewerkError;
    use std::cell::{Cell, RefCell};

    fn dpi(value: u32) -> TargetDpi {
        TargetDpi::new(value).unwrap()
    }

    fn eng() -> LanguageSelection {
        LanguageSelection::new(["eng"]).unwrap()
    }

    /// White page with a block of horizontal black text lines.
    fn lined_page(size: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));
        let left = (size / 4) as i32;
        for line in 0..8 {
            draw_filled_rect_mut(
                &mut img,
                Rect::at(left, (size as i32 * 3) / 10 + line * (size as i32 / 20)).of_size(size / 2, 6),
                Luma([0u8]),
            );
        }
        img
    }

    fn source(img: GrayImage, declared: Option<f32>) -> SourceImage {
        SourceImage::from_dynamic(DynamicImage::ImageLuma8(img), declared)
    }

    fn ink_pixels(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] < 128).count()
    }

    /// Reads one word per page if there is any ink; scores it by how level
    /// the ink is.
    fn level_reader(img: &GrayImage, _: &RecognitionRequest) -> Result<Vec<RecognizedWord>> {
        if ink_pixels(img) == 0 {
            return Ok(Vec::new());
        }
        let tilt = estimate_skew(img, Foreground::DarkInk).unwrap_or(0.0).abs();
        Ok(vec![
            RecognizedWord::new("Lorem", Some(90.0 - tilt * 5.0)),
            RecognizedWord::new("ipsum", Some(90.0 - tilt * 5.0)),
        ])
    }

    #[test]
    fn default_config_matches_documented_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.clahe.clip_limit, 2.0);
        assert_eq!(config.clahe.tile_grid, 8);
        assert_eq!(config.denoise.diameter, 9);
        assert_eq!(config.denoise.close_kernel, 1);
        assert_eq!(config.adaptive.window, 21);
        assert_eq!(config.adaptive.offset, 10.0);
        assert_eq!(config.engine_mode.number(), 3);
        let presets: Vec<u8> = config.presets.iter().map(|p| p.number()).collect();
        assert_eq!(presets, vec![6, 3, 4]);
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "normalize_whitespace": false }"#).unwrap();
        assert!(!config.normalize_whitespace);
        assert_eq!(config.presets, PageSegMode::DEFAULT_PRESETS.to_vec());
    }

    #[test]
    fn clean_high_resolution_page_is_read_without_resizing() {
        let page = lined_page(200);
        let pipeline = DocumentPipeline::new(level_reader, PipelineConfig::default());
        let result = pipeline.process(source(page, Some(300.0)), dpi(300), &eng());

        assert!(result.has_text());
        assert_eq!(result.text, "Lorem ipsum");
        assert!(result.confidence > 0.0);
        assert_eq!(result.image.dimensions(), (200, 200));
        assert_eq!(result.word_count, 2);
        assert!(result.psm.is_some());
    }

    #[test]
    fn low_resolution_scan_is_upsampled_before_enhancement() {
        let img = GrayImage::from_pixel(72, 36, Luma([255u8]));
        let candidates = prepare_candidates(source(img, Some(72.0)), dpi(300), &PipelineConfig::default());
        assert_eq!(candidates.len(), 3);
        for candidate in &candidates {
            assert_eq!(candidate.image.dimensions(), (300, 150));
        }
    }

    #[test]
    fn candidates_come_in_selection_order_and_are_binary() {
        let candidates = prepare_candidates(
            source(lined_page(120), Some(300.0)),
            dpi(300),
            &PipelineConfig::default(),
        );
        let kinds: Vec<CandidateKind> = candidates.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, CandidateKind::ALL.to_vec());
        for candidate in &candidates[..2] {
            assert!(candidate.image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        }
    }

    #[test]
    fn blank_page_defaults_to_first_candidate() {
        let blank = GrayImage::from_pixel(64, 48, Luma([255u8]));
        let pipeline = DocumentPipeline::new(level_reader, PipelineConfig::default());
        let result = pipeline.process(source(blank, Some(300.0)), dpi(300), &eng());

        assert!(!result.has_text());
        assert_eq!(result.text, "");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.variant, CandidateKind::Adaptive);
        assert_eq!(result.psm, None);
        assert_eq!(result.image.dimensions(), (64, 48));
    }

    #[test]
    fn skewed_page_is_best_read_after_deskewing() {
        let skewed = rotate_replicate(&lined_page(400), -10.0);
        let pipeline = DocumentPipeline::new(level_reader, PipelineConfig::default());
        let result = pipeline.process(source(skewed, Some(300.0)), dpi(300), &eng());

        assert_eq!(result.variant, CandidateKind::Deskewed);
        let residual = estimate_skew(&result.image, Foreground::DarkInk).unwrap();
        assert!(residual.abs() < 1.0, "residual skew {residual}");
    }

    #[test]
    fn no_language_means_no_engine_call() {
        let calls = Cell::new(0usize);
        let engine = |_: &GrayImage, _: &RecognitionRequest| -> Result<Vec<RecognizedWord>> {
            calls.set(calls.get() + 1);
            Ok(Vec::new())
        };
        let pipeline = DocumentPipeline::new(engine, PipelineConfig::default());
        let err = pipeline
            .extract(source(lined_page(60), None), dpi(300), Vec::<String>::new())
            .unwrap_err();

        assert!(matches!(err, LesewerkError::NoLanguageSelected));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn every_candidate_and_preset_is_tried_with_joined_languages() {
        let seen = RefCell::new(Vec::new());
        let engine = |_: &GrayImage, req: &RecognitionRequest| -> Result<Vec<RecognizedWord>> {
            seen.borrow_mut().push((req.psm.number(), req.languages.clone()));
            Ok(Vec::new())
        };
        let pipeline = DocumentPipeline::new(engine, PipelineConfig::default());
        pipeline
            .extract(source(lined_page(60), Some(300.0)), dpi(300), ["deu", "eng", "deu"])
            .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 9);
        assert!(seen.iter().all(|(_, langs)| langs == "deu+eng"));
        let first_sweep: Vec<u8> = seen.iter().take(3).map(|(psm, _)| *psm).collect();
        assert_eq!(first_sweep, vec![6, 3, 4]);
    }

    #[test]
    fn engine_failures_never_fail_the_document() {
        let engine = |_: &GrayImage, _: &RecognitionRequest| -> Result<Vec<RecognizedWord>> {
            Err(LesewerkError::Engine("exit status 1".into()))
        };
        let pipeline = DocumentPipeline::new(engine, PipelineConfig::default());
        let result = pipeline.process(source(lined_page(60), Some(300.0)), dpi(300), &eng());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.variant, CandidateKind::Adaptive);
    }

    #[test]
    fn ties_between_candidates_keep_the_first() {
        let engine = |_: &GrayImage, _: &RecognitionRequest| -> Result<Vec<RecognizedWord>> {
            Ok(vec![RecognizedWord::new("same", Some(64.0))])
        };
        let pipeline = DocumentPipeline::new(engine, PipelineConfig::default());
        let result = pipeline.process(source(lined_page(60), Some(300.0)), dpi(300), &eng());
        assert_eq!(result.variant, CandidateKind::Adaptive);
        assert_eq!(result.psm, Some(PageSegMode::SingleBlock));
    }

    #[test]
    fn whitespace_normalisation_follows_config() {
        let engine = |_: &GrayImage, _: &RecognitionRequest| -> Result<Vec<RecognizedWord>> {
            Ok(vec![
                RecognizedWord::new("two\twords", Some(80.0)),
                RecognizedWord::new("here", Some(80.0)),
            ])
        };
        let on = DocumentPipeline::new(engine, PipelineConfig::default());
        let result = on.process(source(lined_page(60), Some(300.0)), dpi(300), &eng());
        assert_eq!(result.text, "two words here");

        let off = DocumentPipeline::new(
            engine,
            PipelineConfig {
                normalize_whitespace: false,
                ..PipelineConfig::default()
            },
        );
        let result = off.process(source(lined_page(60), Some(300.0)), dpi(300), &eng());
        assert_eq!(result.text, "two\twords here");
    }

    #[test]
    fn custom_tokenizer_shapes_the_final_text() {
        struct HyphenSplitter;
        impl Tokenizer for HyphenSplitter {
            fn tokenize(&self, text: &str) -> Vec<String> {
                text.split(|c: char| c == '-' || c.is_whitespace())
                    .map(str::to_string)
                    .collect()
            }
        }

        let engine = |_: &GrayImage, _: &RecognitionRequest| -> Result<Vec<RecognizedWord>> {
            Ok(vec![
                RecognizedWord::new("well-known", Some(80.0)),
                RecognizedWord::new("fact", Some(80.0)),
            ])
        };
        let pipeline =
            DocumentPipeline::new(engine, PipelineConfig::default()).with_tokenizer(HyphenSplitter);
        let result = pipeline.process(source(lined_page(60), Some(300.0)), dpi(300), &eng());
        assert_eq!(result.text, "well known fact");
        assert_eq!(result.word_count, 2);
    }

    #[test]
    fn result_encodes_as_png() {
        let pipeline = DocumentPipeline::new(level_reader, PipelineConfig::default());
        let result = pipeline.process(source(lined_page(60), Some(300.0)), dpi(300), &eng());
        let png = result.to_png_bytes().unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }
}
