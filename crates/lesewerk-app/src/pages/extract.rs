// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extract page — pick a document image, choose languages and resolution,
// run the pipeline, and show or save the recognised text.
//
// The pipeline is CPU-heavy and shells out to the engine nine times, so it
// runs on a blocking worker while the page shows a busy state.

use dioxus::prelude::*;

use lesewerk_core::LesewerkError;
use lesewerk_core::TargetDpi;
use lesewerk_core::human_errors::{humanize_error, no_text_detected};
use lesewerk_document::image::source::SUPPORTED_EXTENSIONS;

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Extract() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let document = state.read().document.clone();
    let extraction = state.read().extraction.clone();
    let processing = state.read().processing;
    let no_language = state.read().selected_languages.is_empty();
    let target_dpi = state.read().target_dpi;
    let error = state.read().error.clone();
    let status = state.read().status_message.clone();
    let dpi_stops = TargetDpi::slider_stops();
    let dpi_last = dpi_stops.len() - 1;
    let dpi_position = TargetDpi::stop_index(target_dpi);

    let options: Vec<(String, String, Option<usize>)> = {
        let s = state.read();
        s.languages
            .iter()
            .map(|lang| {
                let priority = s
                    .selected_languages
                    .iter()
                    .position(|c| c == &lang.code)
                    .map(|p| p + 1);
                (lang.code.clone(), lang.to_string(), priority)
            })
            .collect()
    };

    rsx! {
        div {
            h1 { "Extract Text" }
            p { style: "color: #666;",
                "Extract text from documents in multiple languages with advanced preprocessing."
            }

            // Pick a document
            button {
                style: "width: 100%; padding: 16px; border-radius: 12px; border: 2px dashed #007aff; color: #007aff; background: white; font-size: 16px; margin: 16px 0;",
                disabled: processing,
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &SUPPORTED_EXTENSIONS)
                            .pick_file()
                        else {
                            return;
                        };
                        match svc.load_image(&path) {
                            Ok(doc) => state.write().set_document(doc),
                            Err(e) => {
                                tracing::error!(error = %e, path = %path.display(), "image load failed");
                                state.write().error = Some(humanize_error(&e));
                            }
                        }
                    }
                },
                if document.is_some() { "Choose Another Image" } else { "Upload a Document Image" }
            }

            if let Some(doc) = document.clone() {
                div { style: "display: flex; gap: 16px; flex-wrap: wrap;",
                    div { style: "flex: 1; min-width: 240px;",
                        h3 { "Original Document" }
                        img { src: "{doc.preview_url}", style: "max-width: 100%; border: 1px solid #e0e0e0;" }
                        p { style: "color: #888; font-size: 13px;", "{doc.name} ({doc.width}x{doc.height})" }
                        {
                            let current = format!("{:.0}", doc.display_dpi());
                            rsx! {
                                p { style: "padding: 8px 12px; border-radius: 8px; background: #eef5ff; color: #0a4fa3;",
                                    "Current image DPI: {current}"
                                }
                            }
                        }
                    }
                    if let Some(ref result) = extraction {
                        div { style: "flex: 1; min-width: 240px;",
                            h3 { "Processed Document" }
                            img { src: "{result.processed_url}", style: "max-width: 100%; border: 1px solid #e0e0e0;" }
                        }
                    }
                }

                // Languages
                section { style: "margin: 16px 0;",
                    h3 { "Select languages (in order of priority)" }
                    div { style: "display: flex; flex-wrap: wrap; gap: 4px 16px;",
                        for (code, label, priority) in options {
                            LanguageOption { key: "{code}", code: code.clone(), label, priority }
                        }
                    }
                    if no_language {
                        p { style: "padding: 8px 12px; border-radius: 8px; background: #fff4e5; color: #a15c00;",
                            "Please select at least one language."
                        }
                    }
                }

                // Resolution
                section { style: "margin: 16px 0;",
                    h3 { "Target DPI" }
                    p { style: "color: #666; font-size: 13px;",
                        "Higher values may improve accuracy but increase processing time."
                    }
                    div { style: "display: flex; align-items: center; gap: 12px;",
                        input {
                            r#type: "range",
                            style: "flex: 1;",
                            min: "0",
                            max: "{dpi_last}",
                            step: "1",
                            value: "{dpi_position}",
                            disabled: processing,
                            oninput: move |evt| {
                                if let Ok(index) = evt.value().parse::<usize>()
                                    && let Some(&dpi) = dpi_stops.get(index)
                                {
                                    state.write().target_dpi = dpi;
                                }
                            },
                        }
                        span { style: "min-width: 64px; text-align: right;", "{target_dpi} dpi" }
                    }
                }

                // Run
                button {
                    style: "width: 100%; padding: 14px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px;",
                    disabled: processing || no_language,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let (document, languages, dpi) = {
                                let s = state.read();
                                (s.document.clone(), s.selected_languages.clone(), s.target_dpi)
                            };
                            let Some(document) = document else {
                                return;
                            };
                            if languages.is_empty() {
                                return;
                            }
                            {
                                let mut s = state.write();
                                s.processing = true;
                                s.error = None;
                                s.extraction = None;
                                s.status_message = None;
                            }

                            let svc = svc.clone();
                            spawn(async move {
                                let outcome = tokio::task::spawn_blocking(move || {
                                    svc.extract(&document, dpi, languages)
                                })
                                .await;
                                let mut s = state.write();
                                s.processing = false;
                                match outcome {
                                    Ok(Ok(extraction)) => {
                                        tracing::info!(
                                            confidence = extraction.confidence,
                                            words = extraction.word_count,
                                            variant = extraction.variant.label(),
                                            "extraction finished"
                                        );
                                        s.extraction = Some(extraction);
                                    }
                                    Ok(Err(e)) => {
                                        tracing::error!(error = %e, "extraction failed");
                                        s.error = Some(humanize_error(&e));
                                    }
                                    Err(e) => {
                                        tracing::error!(error = %e, "extraction worker stopped");
                                        let err = LesewerkError::Engine(format!("extraction worker stopped: {e}"));
                                        s.error = Some(humanize_error(&err));
                                    }
                                }
                            });
                        }
                    },
                    if processing { "Processing document... Please wait." } else { "Extract Text" }
                }
            } else {
                p { style: "text-align: center; color: #aaa; margin: 48px 0;",
                    "JPEG, PNG, BMP or TIFF scans work best."
                }
            }

            // Results
            if let Some(result) = extraction {
                section { style: "margin: 24px 0;",
                    h3 { "Extracted Text:" }
                    if result.has_text() {
                        {
                            let confidence = format!("{:.2}", result.confidence);
                            let winner = match result.psm {
                                Some(psm) => format!("{} candidate, {}", result.variant.label(), psm),
                                None => result.variant.label().to_string(),
                            };
                            rsx! {
                                textarea {
                                    style: "width: 100%; height: 200px; padding: 8px; border: 1px solid #ccc; border-radius: 8px; font-family: inherit;",
                                    readonly: true,
                                    value: "{result.text}",
                                }
                                p { style: "padding: 8px 12px; border-radius: 8px; background: #eef5ff; color: #0a4fa3;",
                                    "Confidence Score: {confidence}%"
                                }
                                p { style: "color: #888; font-size: 13px;",
                                    "{result.word_count} words from the {winner}"
                                }
                            }
                        }
                        button {
                            style: "width: 100%; padding: 12px; border-radius: 8px; border: 1px solid #007aff; color: #007aff; background: white; font-size: 16px;",
                            onclick: {
                                let svc = svc.clone();
                                let text = result.text.clone();
                                move |_| {
                                    let Some(path) = rfd::FileDialog::new()
                                        .set_file_name("extracted_text.txt")
                                        .add_filter("Text", &["txt"])
                                        .save_file()
                                    else {
                                        return;
                                    };
                                    match svc.save_text(&path, &text) {
                                        Ok(()) => {
                                            state.write().status_message =
                                                Some(format!("Saved to {}", path.display()));
                                        }
                                        Err(e) => {
                                            tracing::error!(error = %e, "text save failed");
                                            state.write().error = Some(humanize_error(&e));
                                        }
                                    }
                                }
                            },
                            "Download Text"
                        }
                    } else {
                        {
                            let guidance = no_text_detected();
                            rsx! {
                                Notice { message: guidance.message, suggestion: guidance.suggestion }
                            }
                        }
                    }
                }
            }

            if let Some(err) = error {
                Notice { message: err.message, suggestion: err.suggestion }
            }

            if let Some(msg) = status {
                p { style: "margin-top: 12px; color: #34c759; font-size: 14px; text-align: center;",
                    "{msg}"
                }
            }
        }
    }
}

/// One language checkbox; shows its priority once selected.
#[component]
fn LanguageOption(code: String, label: String, priority: Option<usize>) -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let processing = state.read().processing;

    rsx! {
        label { style: "display: flex; align-items: center; gap: 6px; padding: 4px 0;",
            input {
                r#type: "checkbox",
                checked: priority.is_some(),
                disabled: processing,
                onchange: move |_| {
                    state.write().toggle_language(&code);
                },
            }
            span { "{label}" }
            if let Some(p) = priority {
                span { style: "color: #007aff; font-size: 12px;", "#{p}" }
            }
        }
    }
}

/// Warning box with a heading and a suggestion.
#[component]
fn Notice(message: String, suggestion: String) -> Element {
    rsx! {
        div { style: "margin-top: 12px; padding: 12px 16px; border-radius: 8px; background: #fff4e5;",
            p { style: "margin: 0; font-weight: bold; color: #a15c00;", "{message}" }
            p { style: "margin: 4px 0 0; color: #6b4a1f; font-size: 14px;", "{suggestion}" }
        }
    }
}
