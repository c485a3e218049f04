// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tips page — how to get the best out of a scan.

use dioxus::prelude::*;

/// Guidance sections, heading first.
const TIPS: &[(&str, &[&str])] = &[
    (
        "Language Selection",
        &[
            "Select the primary language of your document first",
            "For mixed-language documents, select all relevant languages",
            "Order languages by their prominence in the document",
        ],
    ),
    (
        "DPI Settings",
        &[
            "300 DPI is recommended for most documents",
            "Use higher DPI (400-600) for small text or poor quality images",
            "Lower DPI may be sufficient for clear, large text",
        ],
    ),
    (
        "Scanning Tips",
        &[
            "Ensure the document lies flat",
            "Avoid shadows and glare",
            "Use a white background",
            "Consider using a scanner instead of a camera for best results",
        ],
    ),
    (
        "Document Preparation",
        &[
            "Clean, unwrinkled paper",
            "Clear text on a white background",
            "Proper lighting",
            "Minimize background patterns",
        ],
    ),
    (
        "Language-Specific Tips",
        &[
            "For right-to-left languages (Arabic, Hebrew), ensure proper orientation",
            "For Asian languages, higher DPI might be needed",
            "For mixed scripts, select all relevant language packs",
        ],
    ),
];

#[component]
pub fn Tips() -> Element {
    rsx! {
        div {
            h1 { "Tips for Best Document Scanning" }
            for (i, (heading, items)) in TIPS.iter().enumerate() {
                section { key: "{heading}", style: "margin: 16px 0;",
                    h3 { "{i + 1}. {heading}" }
                    ul { style: "color: #444; line-height: 1.6;",
                        for item in items.iter() {
                            li { key: "{item}", "{item}" }
                        }
                    }
                }
            }
        }
    }
}
