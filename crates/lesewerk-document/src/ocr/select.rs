// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition selector — sweep the page-segmentation presets over one
// candidate image and keep the best-scoring run.

use image::GrayImage;
use lesewerk_core::{EngineMode, PageSegMode};
use tracing::{debug, instrument, warn};

use super::engine::{
    RecognitionEngine, RecognitionRequest, join_words, mean_confidence, visible_word_count,
};

/// Winning preset for one candidate, with the text it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub psm: PageSegMode,
    pub text: String,
    /// Mean known word confidence, always above zero.
    pub confidence: f32,
    pub word_count: usize,
}

/// Tries each preset in order against a shared engine.
///
/// A preset is adopted only if its mean confidence is strictly greater than
/// the best so far (starting from zero), so ties keep the earlier preset and
/// runs without any scored word are never adopted. Engine failures skip the
/// preset.
pub struct RecognitionSelector<'e, E: RecognitionEngine + ?Sized> {
    engine: &'e E,
    presets: Vec<PageSegMode>,
    engine_mode: EngineMode,
}

impl<'e, E: RecognitionEngine + ?Sized> RecognitionSelector<'e, E> {
    /// Selector over the default presets (6, 3, 4) and engine mode.
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            presets: PageSegMode::DEFAULT_PRESETS.to_vec(),
            engine_mode: EngineMode::default(),
        }
    }

    pub fn with_presets(mut self, presets: impl Into<Vec<PageSegMode>>) -> Self {
        self.presets = presets.into();
        self
    }

    pub fn with_engine_mode(mut self, engine_mode: EngineMode) -> Self {
        self.engine_mode = engine_mode;
        self
    }

    /// Best preset for `image`, or `None` if no preset produced a scored word.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn select(&self, image: &GrayImage, languages: &str) -> Option<Selection> {
        let mut best: Option<Selection> = None;
        let mut best_confidence = 0f32;

        for &psm in &self.presets {
            let request = RecognitionRequest::new(psm, self.engine_mode, languages);
            let words = match self.engine.recognize(image, &request) {
                Ok(words) => words,
                Err(err) => {
                    warn!(psm = psm.number(), %err, "Recognition trial failed; skipping preset");
                    continue;
                }
            };

            let Some(confidence) = mean_confidence(&words) else {
                debug!(psm = psm.number(), "No scored words");
                continue;
            };
            debug!(psm = psm.number(), confidence, "Preset scored");

            if confidence > best_confidence {
                best_confidence = confidence;
                best = Some(Selection {
                    psm,
                    text: join_words(&words),
                    confidence,
                    word_count: visible_word_count(&words),
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::engine::RecognizedWord;
    use lesewerk_core::error::{LesewerkError, Result};
    use std::cell::RefCell;

    /// Engine that answers from a per-preset script and records every call.
    struct ScriptedEngine {
        script: Vec<(u8, Result<Vec<RecognizedWord>>)>,
        calls: RefCell<Vec<RecognitionRequest>>,
    }

    impl ScriptedEngine {
        fn new(script: Vec<(u8, Result<Vec<RecognizedWord>>)>) -> Self {
            Self {
                script,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn recognize(&self, _: &GrayImage, request: &RecognitionRequest) -> Result<Vec<RecognizedWord>> {
            self.calls.borrow_mut().push(request.clone());
            match self.script.iter().find(|(psm, _)| *psm == request.psm.number()) {
                Some((_, Ok(words))) => Ok(words.clone()),
                Some((_, Err(err))) => Err(LesewerkError::Engine(err.to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn scored(text: &str, conf: f32) -> Vec<RecognizedWord> {
        vec![RecognizedWord::new(text, Some(conf))]
    }

    #[test]
    fn presets_run_in_fixed_order_with_joined_languages() {
        let engine = ScriptedEngine::new(vec![]);
        RecognitionSelector::new(&engine).select(&GrayImage::new(2, 2), "eng+fra");

        let calls = engine.calls.borrow();
        let order: Vec<u8> = calls.iter().map(|r| r.psm.number()).collect();
        assert_eq!(order, vec![6, 3, 4]);
        assert!(calls.iter().all(|r| r.languages == "eng+fra" && r.engine_mode.number() == 3));
    }

    #[test]
    fn ties_keep_the_earlier_preset() {
        let engine = ScriptedEngine::new(vec![
            (6, Ok(scored("six", 70.0))),
            (3, Ok(scored("three", 70.0))),
            (4, Ok(scored("four", 70.0))),
        ]);
        let sel = RecognitionSelector::new(&engine)
            .select(&GrayImage::new(2, 2), "eng")
            .unwrap();
        assert_eq!(sel.psm, PageSegMode::SingleBlock);
        assert_eq!(sel.text, "six");
    }

    #[test]
    fn strictly_better_later_preset_wins() {
        let engine = ScriptedEngine::new(vec![
            (6, Ok(scored("six", 40.0))),
            (3, Ok(scored("three", 40.5))),
            (4, Ok(scored("four", 30.0))),
        ]);
        let sel = RecognitionSelector::new(&engine)
            .select(&GrayImage::new(2, 2), "eng")
            .unwrap();
        assert_eq!(sel.psm, PageSegMode::Auto);
        assert_eq!(sel.text, "three");
        assert_eq!(sel.word_count, 1);
    }

    #[test]
    fn failing_presets_are_skipped() {
        let engine = ScriptedEngine::new(vec![
            (6, Err(LesewerkError::Engine("boom".into()))),
            (3, Err(LesewerkError::Engine("boom".into()))),
            (4, Ok(scored("column", 12.0))),
        ]);
        let sel = RecognitionSelector::new(&engine)
            .select(&GrayImage::new(2, 2), "eng")
            .unwrap();
        assert_eq!(sel.psm, PageSegMode::SingleColumn);
        assert_eq!(engine.calls.borrow().len(), 3);
    }

    #[test]
    fn unscored_and_zero_runs_are_not_adopted() {
        let engine = ScriptedEngine::new(vec![
            (6, Ok(vec![RecognizedWord::new("ghost", None)])),
            (3, Ok(scored("", 0.0))),
        ]);
        assert_eq!(
            RecognitionSelector::new(&engine).select(&GrayImage::new(2, 2), "eng"),
            None
        );
    }

    #[test]
    fn custom_presets_replace_defaults() {
        let engine = ScriptedEngine::new(vec![(11, Ok(scored("sparse", 55.0)))]);
        let sel = RecognitionSelector::new(&engine)
            .with_presets([PageSegMode::SparseText])
            .select(&GrayImage::new(2, 2), "eng")
            .unwrap();
        assert_eq!(sel.psm, PageSegMode::SparseText);
        assert_eq!(engine.calls.borrow().len(), 1);
    }
}
