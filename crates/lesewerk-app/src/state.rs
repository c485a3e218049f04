// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use lesewerk_core::AppConfig;
use lesewerk_core::human_errors::HumanError;
use lesewerk_core::language::Language;

use crate::services::app_services::{AppServices, Extraction, LoadedImage};

/// Shared state accessible to all pages via `use_context`.
///
/// Lives for the whole session so switching to the tips or settings page
/// keeps the loaded document and its result.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application settings.
    pub config: AppConfig,
    /// Languages the engine can read, in catalogue order.
    pub languages: Vec<Language>,
    /// Currently loaded document.
    pub document: Option<LoadedImage>,
    /// Selected language codes in priority order.
    pub selected_languages: Vec<String>,
    /// Target resolution chosen on the slider.
    pub target_dpi: u32,
    /// Result of the last extraction for the loaded document.
    pub extraction: Option<Extraction>,
    /// Whether an extraction is running.
    pub processing: bool,
    /// Last failure, in plain English.
    pub error: Option<HumanError>,
    /// Status message for user feedback.
    pub status_message: Option<String>,
}

impl AppState {
    /// Create initial state from the backend services.
    pub fn new(svc: &AppServices) -> Self {
        Self::from_parts(svc.config(), svc.languages().to_vec())
    }

    fn from_parts(config: AppConfig, languages: Vec<Language>) -> Self {
        // Defaults the engine cannot read are dropped.
        let selected_languages = config
            .default_languages
            .iter()
            .filter(|code| languages.iter().any(|l| &l.code == *code))
            .cloned()
            .collect();
        let target_dpi = config.default_target_dpi.get();
        Self {
            config,
            languages,
            document: None,
            selected_languages,
            target_dpi,
            extraction: None,
            processing: false,
            error: None,
            status_message: None,
        }
    }

    /// Add `code` at the lowest priority, or remove it if already selected.
    pub fn toggle_language(&mut self, code: &str) {
        toggle_code(&mut self.selected_languages, code);
    }

    /// Replace the loaded document, discarding any previous result.
    pub fn set_document(&mut self, document: LoadedImage) {
        self.document = Some(document);
        self.extraction = None;
        self.error = None;
        self.status_message = None;
    }
}

/// Toggle `code` in an ordered list of language codes.
pub fn toggle_code(codes: &mut Vec<String>, code: &str) {
    if let Some(pos) = codes.iter().position(|c| c == code) {
        codes.remove(pos);
    } else {
        codes.push(code.to_string());
    }
}
