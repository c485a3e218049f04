// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses four severity levels that drive UI presentation.

use crate::error::LesewerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A one-off hiccup; trying again may work.
    Transient,
    /// The user must change something (pick a language, choose another file).
    ActionRequired,
    /// Cannot be fixed by retrying — corrupt file, wrong format.
    Permanent,
    /// Software has to be installed before anything works.
    InstallRequired,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same thing again could succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Platform-specific steps for installing the recognition engine.
pub fn install_instructions() -> &'static str {
    if cfg!(target_os = "windows") {
        "Download the Tesseract installer from https://github.com/UB-Mannheim/tesseract/wiki, \
         run it with \"Add to PATH\" selected, and pick the language packs you need."
    } else if cfg!(target_os = "macos") {
        "Run `brew install tesseract`, then `brew install tesseract-lang` for extra languages."
    } else {
        "Run `sudo apt update && sudo apt install tesseract-ocr`, then install language \
         packs such as `tesseract-ocr-fra`."
    }
}

/// Convert a `LesewerkError` into a `HumanError`.
pub fn humanize_error(err: &LesewerkError) -> HumanError {
    match err {
        LesewerkError::EngineUnavailable(_) => HumanError {
            message: "Tesseract not found. Please install it first.".into(),
            suggestion: install_instructions().into(),
            retriable: false,
            severity: Severity::InstallRequired,
        },

        LesewerkError::Engine(detail) => HumanError {
            message: "Text recognition failed on this image.".into(),
            suggestion: format!(
                "Try again, or check that the selected language packs are installed. ({detail})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },

        LesewerkError::NoLanguageSelected => HumanError {
            message: "Please select at least one language.".into(),
            suggestion: "Choose the main language of your document from the list.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LesewerkError::InvalidLanguage(code) => HumanError {
            message: "That language code isn't valid.".into(),
            suggestion: format!("Pick languages from the list instead of typing \"{code}\"."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LesewerkError::InvalidTargetDpi(dpi) => HumanError {
            message: "That resolution isn't supported.".into(),
            suggestion: format!("Choose a value between 72 and 600 DPI (you chose {dpi})."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LesewerkError::UnsupportedImage(kind) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Save the scan as JPEG, PNG, BMP or TIFF and try again. ({kind})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        LesewerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged. Try opening it in another program, or export it as PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        LesewerkError::Io(io) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check that the file exists and that you have permission to use it. ({io})"),
            retriable: true,
            severity: Severity::Transient,
        },

        LesewerkError::Serialization(_) => HumanError {
            message: "Your settings file is damaged.".into(),
            suggestion: "Open Settings and save again to rewrite it.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Guidance shown when every recognition attempt came back without text.
///
/// This is an ordinary outcome, not an error.
pub fn no_text_detected() -> HumanError {
    HumanError {
        message: "No text was detected.".into(),
        suggestion: "Please try adjusting the language selection, image quality, or DPI settings."
            .into(),
        retriable: true,
        severity: Severity::ActionRequired,
    }
}
