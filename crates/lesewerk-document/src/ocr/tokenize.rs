// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tokenizer boundary — cosmetic whitespace normalisation of extracted text.

/// Splits text into tokens. Tokens may include whitespace-only entries; they
/// are dropped when the text is rejoined.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits on Unicode whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Rejoin the non-blank tokens of `text` with single spaces.
pub fn normalize_text(tokenizer: &dyn Tokenizer, text: &str) -> String {
    tokenizer
        .tokenize(text)
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
