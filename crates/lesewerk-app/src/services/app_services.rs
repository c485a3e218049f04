// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads settings, resolves the recognition engine
// once at startup, and exposes load / extract / save operations to the UI.
//
// The engine location is resolved exactly once per process. Changing the
// Tesseract path in settings takes effect on the next launch.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use base64::Engine;
use lesewerk_core::error::{LesewerkError, Result};
use lesewerk_core::language::{Language, supported_languages};
use lesewerk_core::{AppConfig, CandidateKind, LanguageSelection, PageSegMode, TargetDpi};
use lesewerk_document::{DocumentPipeline, PipelineConfig, SourceImage, TesseractEngine, resolve_engine};
use tracing::{error, info, instrument, warn};

use super::data_dir;

/// An image picked by the user, decoded once for preview.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
    /// PNG data URL for the webview.
    pub preview_url: String,
    pub dpi: Option<f32>,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    /// Declared resolution for display, 72 when absent.
    pub fn display_dpi(&self) -> f32 {
        self.dpi.unwrap_or(lesewerk_document::image::source::FALLBACK_DPI)
    }
}

/// The outcome of one extraction, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub confidence: f32,
    pub processed_url: String,
    pub variant: CandidateKind,
    pub psm: Option<PageSegMode>,
    pub word_count: usize,
}

impl Extraction {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are cheaply cloneable so the struct can be moved into blocking
/// workers.
#[derive(Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
    engine: Option<TesseractEngine>,
    engine_error: Option<Arc<LesewerkError>>,
    languages: Arc<Vec<Language>>,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    pub fn init() -> Self {
        Self::with_data_dir(data_dir::data_dir())
    }

    /// Initialise against an explicit data directory.
    #[instrument(skip_all, fields(path = %dir.display()))]
    pub fn with_data_dir(dir: PathBuf) -> Self {
        info!("initialising app services");
        let config = AppConfig::load(&dir).unwrap_or_default();

        let (engine, engine_error) = match resolve_engine(config.tesseract_path.as_deref()) {
            Ok(engine_config) => (Some(TesseractEngine::new(engine_config)), None),
            Err(err) => {
                error!(error = %err, "recognition engine unavailable");
                (None, Some(Arc::new(err)))
            }
        };

        let installed = engine.as_ref().and_then(|engine| match engine.installed_languages() {
            Ok(langs) => Some(langs),
            Err(err) => {
                warn!(error = %err, "cannot list installed languages; offering English only");
                None
            }
        });
        let languages = supported_languages(installed.as_deref());
        info!(languages = languages.len(), "app services initialised");

        Self {
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
            engine,
            engine_error,
            languages: Arc::new(languages),
        }
    }

    // -- Engine ---------------------------------------------------------------

    /// The startup failure, if the engine could not be resolved.
    pub fn engine_error(&self) -> Option<&LesewerkError> {
        self.engine_error.as_deref()
    }

    /// `tesseract --version` banner of the resolved engine.
    pub fn engine_version(&self) -> Option<&str> {
        self.engine.as_ref().map(|e| e.config().version.as_str())
    }

    /// Languages offered for selection, in catalogue order.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    // -- Documents ------------------------------------------------------------

    /// Read and decode an image file for preview.
    #[instrument(skip(self))]
    pub fn load_image(&self, path: &Path) -> Result<LoadedImage> {
        let bytes = std::fs::read(path)?;
        let source = SourceImage::from_bytes(&bytes)?;
        let preview_url = png_data_url(&source.to_png_bytes()?);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!(%name, width = source.width(), height = source.height(), "image loaded");
        Ok(LoadedImage {
            name,
            bytes: Arc::new(bytes),
            preview_url,
            dpi: source.dpi(),
            width: source.width(),
            height: source.height(),
        })
    }

    /// Run the full pipeline. Blocking; call from a worker thread.
    ///
    /// Languages are validated before the image is decoded, so an empty
    /// selection never reaches the engine.
    #[instrument(skip(self, image), fields(name = %image.name))]
    pub fn extract(&self, image: &LoadedImage, target_dpi: u32, languages: Vec<String>) -> Result<Extraction> {
        let selection = LanguageSelection::new(languages)?;
        let target = TargetDpi::new(target_dpi)?;
        let engine = match &self.engine {
            Some(engine) => engine.clone(),
            None => {
                return Err(LesewerkError::EngineUnavailable(
                    "engine was not resolved at startup".into(),
                ));
            }
        };

        let config = self.config();
        let pipeline = DocumentPipeline::new(
            engine,
            PipelineConfig {
                normalize_whitespace: config.normalize_whitespace,
                ..PipelineConfig::default()
            },
        );
        let source = SourceImage::from_bytes(&image.bytes)?;
        let result = pipeline.process(source, target, &selection);
        let processed_url = png_data_url(&result.to_png_bytes()?);

        Ok(Extraction {
            text: result.text,
            confidence: result.confidence,
            processed_url,
            variant: result.variant,
            psm: result.psm,
            word_count: result.word_count,
        })
    }

    /// Write extracted text to `path`.
    pub fn save_text(&self, path: &Path, text: &str) -> Result<()> {
        std::fs::write(path, text)?;
        info!(path = %path.display(), bytes = text.len(), "extracted text saved");
        Ok(())
    }

    // -- Config Persistence ---------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.lock_config().clone()
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.lock_config() = config.clone();
        config.persist(&self.data_dir)
    }

    /// Path to the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn lock_config(&self) -> MutexGuard<'_, AppConfig> {
        // Config writes are plain assignments, so a poisoned lock still holds
        // a complete value.
        self.config.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `data:image/png;base64,...` URL for displaying PNG bytes.
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};

    fn services() -> (tempfile::TempDir, AppServices) {
        let dir = tempfile::tempdir().unwrap();
        let svc = AppServices::with_data_dir(dir.path().to_path_buf());
        (dir, svc)
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let (_dir, svc) = services();
        assert_eq!(svc.config(), AppConfig::default());
        assert!(!svc.languages().is_empty());
    }

    #[test]
    fn saved_config_is_persisted() {
        let (dir, svc) = services();
        let mut config = svc.config();
        config.default_languages = vec!["deu".into(), "eng".into()];
        config.normalize_whitespace = false;
        svc.save_config(&config).unwrap();

        assert_eq!(svc.config(), config);
        assert_eq!(AppConfig::load(dir.path()), Some(config));
    }

    #[test]
    fn empty_language_selection_is_rejected_first() {
        let (_dir, svc) = services();
        let image = LoadedImage {
            name: "blank".into(),
            bytes: Arc::new(Vec::new()),
            preview_url: String::new(),
            dpi: None,
            width: 0,
            height: 0,
        };
        let err = svc.extract(&image, 300, Vec::new()).unwrap_err();
        assert!(matches!(err, LesewerkError::NoLanguageSelected));
    }

    #[test]
    fn loads_image_with_preview() {
        let (dir, svc) = services();
        let path = dir.path().join("page.png");
        DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 4, Luma([200u8])))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let loaded = svc.load_image(&path).unwrap();
        assert_eq!(loaded.name, "page.png");
        assert_eq!((loaded.width, loaded.height), (8, 4));
        assert_eq!(loaded.display_dpi(), 72.0);
        assert!(loaded.preview_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn saves_text_file() {
        let (dir, svc) = services();
        let path = dir.path().join("extracted_text.txt");
        svc.save_text(&path, "Hello world").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Hello world");
    }

    #[test]
    fn data_url_wraps_base64() {
        assert_eq!(png_data_url(b"abc"), "data:image/png;base64,YWJj");
    }
}
