// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the Dioxus UI to the lesewerk backend crates.
//
// Calls here are synchronous; pages run the slow ones (the extraction
// pipeline) on a blocking worker so the UI stays responsive.

pub mod app_services;
pub mod data_dir;
