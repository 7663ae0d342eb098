//! Text normalization and tokenization.
//!
//! Everything in this module is a pure function over its inputs. Raw
//! corpus text is normalized once (whitespace collapse, artifact
//! stripping), then either flattened into a single token stream or split
//! into sentence-like sequences for trie construction.
//!
//! Normalization is idempotent: running it over already-normalized text
//! yields the same output byte for byte.

use serde::{Deserialize, Serialize};

/// A token is an atomic string unit produced by normalization.
///
/// Equality is case-sensitive; callers that need case-folded matching
/// capitalize or lowercase explicitly at the query boundary.
pub type Token = String;

/// An ordered sentence-like run of tokens.
pub type Sequence = Vec<Token>;

/// Punctuation characters stripped from token edges by default.
pub const DEFAULT_STRIP: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '(', ')', '[', ']', '{', '}',
];

/// Artifact characters removed wholesale during normalization.
const ARTIFACTS: &[char] = &['©', '®', '™', '“', '”', '‘', '’', '«', '»'];

/// Tokenizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Characters stripped from the edges of each token.
    pub strip: Vec<char>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            strip: DEFAULT_STRIP.to_vec(),
        }
    }
}

impl TokenizerConfig {
    /// A configuration that strips nothing, preserving punctuation on
    /// tokens exactly as it appears in the corpus.
    #[must_use]
    pub fn preserving() -> Self {
        Self { strip: Vec::new() }
    }
}

/// Collapse newlines and repeated whitespace, and drop copyright/quote
/// artifacts.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = true;

    for ch in text.chars() {
        if ARTIFACTS.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            if !in_gap {
                out.push(' ');
                in_gap = true;
            }
        } else {
            out.push(ch);
            in_gap = false;
        }
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Split normalized text into a flat token stream.
///
/// Tokens are whitespace-delimited; the configured punctuation set is
/// stripped from both edges of each token, and tokens that become empty
/// are dropped.
#[must_use]
pub fn tokenize(text: &str, config: &TokenizerConfig) -> Vec<Token> {
    normalize(text)
        .split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| config.strip.contains(&c)))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Capitalize the first alphabetic character of a token.
#[must_use]
pub fn capitalize(token: &str) -> Token {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split normalized text into sentence-like sequences.
///
/// A boundary is a terminal punctuation mark (`.`, `?`, `!`) followed by
/// whitespace and an uppercase letter. The first token of every sequence
/// is capitalized. Sequences that tokenize to nothing are dropped.
#[must_use]
pub fn split_sequences(text: &str, config: &TokenizerConfig) -> Vec<Sequence> {
    let normalized = normalize(text);
    let chars: Vec<char> = normalized.chars().collect();

    let mut sentences: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);

        if matches!(ch, '.' | '?' | '!') {
            // Boundary only when followed by whitespace then an uppercase
            // letter; "e.g. foo" and trailing ellipses stay attached.
            let next = chars.get(i + 1);
            let after = chars.get(i + 2);
            if next.is_some_and(|c| c.is_whitespace())
                && after.is_some_and(|c| c.is_uppercase())
            {
                sentences.push(std::mem::take(&mut current));
                i += 1; // skip the separating whitespace
            }
        }
        i += 1;
    }
    if !current.trim().is_empty() {
        sentences.push(current);
    }

    sentences
        .iter()
        .filter_map(|sentence| {
            let mut tokens = tokenize(sentence, config);
            let first = tokens.first()?.clone();
            tokens[0] = capitalize(&first);
            Some(tokens)
        })
        .collect()
}
