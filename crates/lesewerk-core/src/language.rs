// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Language catalogue and the caller's ordered language selection.

use serde::{Deserialize, Serialize};

use crate::error::{LesewerkError, Result};

/// Languages the UI knows how to label, in display order.
pub const CATALOGUE: &[(&str, &str)] = &[
    ("eng", "English"),
    ("fra", "French"),
    ("deu", "German"),
    ("spa", "Spanish"),
    ("ita", "Italian"),
    ("por", "Portuguese"),
    ("rus", "Russian"),
    ("chi_sim", "Chinese (Simplified)"),
    ("chi_tra", "Chinese (Traditional)"),
    ("jpn", "Japanese"),
    ("kor", "Korean"),
    ("ara", "Arabic"),
    ("hin", "Hindi"),
    ("ben", "Bengali"),
    ("tha", "Thai"),
    ("vie", "Vietnamese"),
];

/// A language code paired with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Intersect the engine's installed languages with the catalogue.
///
/// Keeps catalogue order. When the engine could not be queried, English is
/// offered on its own.
pub fn supported_languages(installed: Option<&[String]>) -> Vec<Language> {
    let Some(installed) = installed else {
        return vec![english()];
    };
    CATALOGUE
        .iter()
        .filter(|(code, _)| installed.iter().any(|i| i == code))
        .map(|(code, name)| Language {
            code: (*code).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

fn english() -> Language {
    Language {
        code: "eng".into(),
        name: "English".into(),
    }
}

/// Ordered, de-duplicated set of language codes. Order is priority.
///
/// Never empty: an empty selection is a user-input error, surfaced before any
/// recognition work starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LanguageSelection(Vec<String>);

impl LanguageSelection {
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into();
            if code.is_empty() || code.contains('+') || code.chars().any(char::is_whitespace) {
                return Err(LesewerkError::InvalidLanguage(code));
            }
            if !ordered.contains(&code) {
                ordered.push(code);
            }
        }
        if ordered.is_empty() {
            return Err(LesewerkError::NoLanguageSelected);
        }
        Ok(Self(ordered))
    }

    /// The single string the engine expects, e.g. `eng+fra`.
    pub fn joined(&self) -> String {
        self.0.join("+")
    }
}

impl TryFrom<Vec<String>> for LanguageSelection {
    type Error = LesewerkError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LanguageSelection> for Vec<String> {
    fn from(value: LanguageSelection) -> Self {
        value.0
    }
}
