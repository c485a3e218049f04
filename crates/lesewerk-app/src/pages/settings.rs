// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — persistent app configuration.

use std::path::PathBuf;

use dioxus::prelude::*;

use lesewerk_core::TargetDpi;

use crate::services::app_services::AppServices;
use crate::state::{AppState, toggle_code};

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<String>::None);

    let default_dpi = state.read().config.default_target_dpi.get();
    let tesseract_path = state
        .read()
        .config
        .tesseract_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let languages: Vec<(String, String, bool)> = {
        let s = state.read();
        s.languages
            .iter()
            .map(|lang| {
                let on = s.config.default_languages.contains(&lang.code);
                (lang.code.clone(), lang.to_string(), on)
            })
            .collect()
    };
    let dpi_stops = TargetDpi::slider_stops();
    let dpi_last = dpi_stops.len() - 1;
    let dpi_position = TargetDpi::stop_index(default_dpi);
    let engine_version = svc.engine_version().unwrap_or("unknown").to_string();
    let data_dir = svc.data_dir().display().to_string();
    let version = env!("CARGO_PKG_VERSION");

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "Default Languages" }
                p { style: "color: #666; font-size: 13px;",
                    "Pre-selected on the extract page, in the order you tick them."
                }
                for (code, label, on) in languages {
                    SettingRow {
                        key: "{code}",
                        label,
                        checked: on,
                        on_toggle: move |_: bool| {
                            toggle_code(&mut state.write().config.default_languages, &code);
                        },
                    }
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Recognition" }
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Default target DPI" }
                    div { style: "display: flex; align-items: center; gap: 8px;",
                        input {
                            r#type: "range",
                            min: "0",
                            max: "{dpi_last}",
                            step: "1",
                            value: "{dpi_position}",
                            oninput: move |evt| {
                                if let Some(dpi) = evt
                                    .value()
                                    .parse::<usize>()
                                    .ok()
                                    .and_then(|index| dpi_stops.get(index).copied())
                                    .and_then(|dpi| TargetDpi::new(dpi).ok())
                                {
                                    state.write().config.default_target_dpi = dpi;
                                }
                            },
                        }
                        span { style: "min-width: 64px; text-align: right;", "{default_dpi} dpi" }
                    }
                }
                SettingRow {
                    label: "Normalise whitespace in extracted text".to_string(),
                    checked: state.read().config.normalize_whitespace,
                    on_toggle: move |v: bool| { state.write().config.normalize_whitespace = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Tesseract" }
                div { style: "display: flex; gap: 8px; align-items: center; padding: 12px 0;",
                    input {
                        r#type: "text",
                        style: "flex: 1; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        placeholder: "Detect automatically",
                        value: "{tesseract_path}",
                        onchange: move |evt| {
                            let value = evt.value();
                            let trimmed = value.trim();
                            state.write().config.tesseract_path =
                                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
                        },
                    }
                    button {
                        style: "padding: 4px 12px; border-radius: 4px; border: 1px solid #ccc; background: white;",
                        onclick: move |_| {
                            if let Some(path) = rfd::FileDialog::new().pick_file() {
                                state.write().config.tesseract_path = Some(path);
                            }
                        },
                        "Browse"
                    }
                }
                p { style: "color: #888; font-size: 13px;",
                    "Engine: {engine_version}. Path changes apply after restarting Lesewerk."
                }
            }

            // Save button
            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let config = state.read().config.clone();
                        match svc.save_config(&config) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                save_msg.set(Some("Settings saved.".into()));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some(format!("Save failed: {e}")));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #34c759; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }

            section { style: "margin: 24px 0;",
                h3 { "About" }
                p { style: "color: #666; font-size: 14px;",
                    "Lesewerk v{version}"
                    br {}
                    "Multilingual document text extraction"
                    br {}
                    "Data: {data_dir}"
                    br {}
                    "PMPL-1.0-or-later"
                }
            }
        }
    }
}

#[component]
fn SettingRow(label: String, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
            span { "{label}" }
            input {
                r#type: "checkbox",
                checked: checked,
                onchange: move |evt| {
                    on_toggle.call(evt.checked());
                },
            }
        }
    }
}
