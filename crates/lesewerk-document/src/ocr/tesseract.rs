// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract binding — locate the `tesseract` executable once at startup and
// drive it through its command-line interface.
//
// Each recognition writes the candidate to a temporary PNG and asks for TSV
// output on stdout. Only word rows (level 5) are kept; a confidence of -1
// means the engine could not score the word.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{GrayImage, ImageFormat};
use lesewerk_core::error::{LesewerkError, Result};
use tracing::{debug, info, instrument};

use super::engine::{RecognitionEngine, RecognitionRequest, RecognizedWord};

/// Install locations probed on Windows, in order.
pub const WINDOWS_PROBE_PATHS: [&str; 3] = [
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    r"C:\Users\User\AppData\Local\Programs\Tesseract-OCR\tesseract.exe",
];

/// Executable name used when no explicit path is configured.
const DEFAULT_EXECUTABLE: &str = "tesseract";

/// TSV column holding the row level (5 = word).
const TSV_LEVEL: usize = 0;
const TSV_CONF: usize = 10;
const TSV_TEXT: usize = 11;
const TSV_COLUMNS: usize = 12;
const WORD_LEVEL: &str = "5";

/// Resolved engine location. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub executable: PathBuf,
    /// First line of `tesseract --version`, e.g. `tesseract 5.3.4`.
    pub version: String,
}

/// Locate a working Tesseract executable.
///
/// An explicit path must exist. Otherwise Windows probes the usual install
/// directories and other platforms rely on `tesseract` being on `PATH`. In
/// every case the candidate must answer `--version`.
#[instrument(skip_all, fields(explicit = ?explicit))]
pub fn resolve_engine(explicit: Option<&Path>) -> Result<EngineConfig> {
    let executable = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(LesewerkError::EngineUnavailable(format!(
                    "configured executable {} does not exist",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None if cfg!(windows) => WINDOWS_PROBE_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .ok_or_else(|| {
                LesewerkError::EngineUnavailable(
                    "Tesseract-OCR not found in any default install location".into(),
                )
            })?,
        None => PathBuf::from(DEFAULT_EXECUTABLE),
    };

    let version = query_version(&executable)?;
    info!(executable = %executable.display(), %version, "Recognition engine resolved");
    Ok(EngineConfig {
        executable,
        version,
    })
}

fn query_version(executable: &Path) -> Result<String> {
    let output = Command::new(executable)
        .arg("--version")
        .output()
        .map_err(|err| {
            LesewerkError::EngineUnavailable(format!(
                "cannot run {}: {}",
                executable.display(),
                err
            ))
        })?;
    if !output.status.success() {
        return Err(LesewerkError::EngineUnavailable(format!(
            "{} --version exited with {}",
            executable.display(),
            output.status
        )));
    }
    // Older releases print the banner on stderr.
    let banner = [output.stdout.as_slice(), output.stderr.as_slice()]
        .iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .find_map(|text| text.lines().next().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()))
        .unwrap_or_else(|| "tesseract (unknown version)".into());
    Ok(banner)
}

// -- Engine -------------------------------------------------------------------

/// Recognition backed by the Tesseract command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: EngineConfig,
}

impl TesseractEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Language codes the engine has trained data for.
    #[instrument(skip(self))]
    pub fn installed_languages(&self) -> Result<Vec<String>> {
        let output = self.run(&["--list-langs"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let langs = parse_language_list(&stdout);
        debug!(count = langs.len(), "Installed languages listed");
        Ok(langs)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new(&self.config.executable)
            .args(args)
            .output()
            .map_err(|err| LesewerkError::Engine(format!("failed to launch engine: {}", err)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LesewerkError::Engine(format!(
                "engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output)
    }
}

impl RecognitionEngine for TesseractEngine {
    #[instrument(skip(self, image), fields(psm = request.psm.number(), langs = %request.languages))]
    fn recognize(&self, image: &GrayImage, request: &RecognitionRequest) -> Result<Vec<RecognizedWord>> {
        let mut input = tempfile::Builder::new()
            .prefix("lesewerk-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(input.as_file_mut(), ImageFormat::Png)
            .map_err(|err| LesewerkError::ImageError(format!("candidate encoding failed: {}", err)))?;

        let path = input.path().to_string_lossy().into_owned();
        let psm = request.psm.number().to_string();
        let oem = request.engine_mode.number().to_string();
        let output = self.run(&[
            path.as_str(),
            "stdout",
            "--psm",
            psm.as_str(),
            "--oem",
            oem.as_str(),
            "-l",
            request.languages.as_str(),
            "tsv",
        ])?;

        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        debug!(words = words.len(), "Engine returned words");
        Ok(words)
    }
}

// -- Output parsing -----------------------------------------------------------

/// Word rows from Tesseract TSV output.
pub fn parse_tsv(tsv: &str) -> Result<Vec<RecognizedWord>> {
    let mut words = Vec::new();
    for (line_no, line) in tsv.lines().enumerate() {
        if line.is_empty() || line.starts_with("level") {
            continue;
        }
        let fields: Vec<&str> = line.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_TEXT {
            return Err(LesewerkError::Engine(format!(
                "malformed TSV row {}: expected {} columns, found {}",
                line_no + 1,
                TSV_COLUMNS,
                fields.len()
            )));
        }
        if fields[TSV_LEVEL] != WORD_LEVEL {
            continue;
        }
        let conf: f32 = fields[TSV_CONF].trim().parse().map_err(|_| {
            LesewerkError::Engine(format!(
                "malformed confidence {:?} on TSV row {}",
                fields[TSV_CONF],
                line_no + 1
            ))
        })?;
        let confidence = if conf < 0.0 { None } else { Some(conf) };
        let text = fields.get(TSV_TEXT).copied().unwrap_or_default();
        words.push(RecognizedWord::new(text, confidence));
    }
    Ok(words)
}

/// Codes from `--list-langs` output. The first line is a header.
pub fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "osd")
        .map(str::to_string)
        .collect()
}
