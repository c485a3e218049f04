// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine missing — shown instead of the app when Tesseract could not be
// resolved at startup.

use dioxus::prelude::*;

use lesewerk_core::LesewerkError;
use lesewerk_core::human_errors::humanize_error;

/// Install instructions per platform, shown in full regardless of the
/// current one.
const PLATFORMS: &[(&str, &[&str])] = &[
    (
        "Windows",
        &[
            "Download the Tesseract installer from https://github.com/UB-Mannheim/tesseract/wiki",
            "Run the installer and select \"Add to PATH\"",
            "Download additional language packs during installation",
        ],
    ),
    (
        "Linux",
        &[
            "sudo apt update",
            "sudo apt install tesseract-ocr",
            "sudo apt install tesseract-ocr-<lang> for each extra language",
        ],
    ),
    (
        "macOS",
        &["brew install tesseract", "brew install tesseract-lang"],
    ),
];

#[component]
pub fn EngineMissing(detail: String) -> Element {
    let human = humanize_error(&LesewerkError::EngineUnavailable(detail.clone()));

    rsx! {
        div { style: "max-width: 640px; margin: 32px auto; font-family: system-ui, -apple-system, sans-serif;",
            h1 { style: "color: #c62828;", "{human.message}" }
            p { style: "color: #666;", "{detail}" }
            p { "{human.suggestion}" }

            h2 { "Installation Instructions" }
            for (platform, steps) in PLATFORMS.iter() {
                section { key: "{platform}", style: "margin: 16px 0;",
                    h3 { "{platform}" }
                    ol {
                        for step in steps.iter() {
                            li { key: "{step}",
                                code { "{step}" }
                            }
                        }
                    }
                }
            }
            p { style: "color: #888; font-size: 14px;",
                "A custom executable location can be set in config.json in the Lesewerk data directory. Restart Lesewerk after installing."
            }
        }
    }
}
