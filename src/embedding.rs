//! Lexical feature embeddings.
//!
//! For every `(token, next)` pair observed during training, the embedder
//! computes a fixed-dimension vector of lexical, positional, and
//! frequency statistics, each component normalized into `[0, 1]`.
//!
//! This is *not* a neural embedding model. It is deterministic, offline,
//! and cheap: enough structure for dot-product similarity ranking and for
//! the "most frequent continuation" fallback the prediction engine uses
//! when a trie lookup misses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::tokenizer::Token;
use crate::trainer::{FrequencyTable, TrainStats};

/// Ordered part-of-speech categories, most specific first.
///
/// Specificity is the direct index of a tag in this list divided by
/// `len - 1`; it is used as-is, never inverted.
pub const POS_TAGS: &[&str] = &[
    "proper-noun",
    "noun",
    "verb",
    "adjective",
    "adverb",
    "pronoun",
    "preposition",
    "conjunction",
    "determiner",
    "interjection",
    "numeral",
    "symbol",
];

/// Suffixes tested by the 9-dimension variant's suffix flag.
pub const SUFFIXES: &[&str] = &["ing", "ed", "ly", "tion", "ness", "ment", "able", "ous"];

const LENGTH_CAP: f32 = 20.0;
const LETTER_CAP: f32 = 25.0;
const VOWEL_COUNT_CAP: f32 = 10.0;
const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// Embedding dimensionality variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingVariant {
    /// Eight lexical/statistical features.
    Lexical8,
    /// Nine features: swaps the last-vowel index for vowel count and a
    /// suffix-match flag.
    Lexical9,
    /// 144-dimension contextual variant: zero-initialized, frequency
    /// written into a stable hash bucket.
    Contextual144,
}

impl EmbeddingVariant {
    /// Vector length demanded by this variant.
    #[must_use]
    pub const fn dim(self) -> usize {
        match self {
            Self::Lexical8 => 8,
            Self::Lexical9 => 9,
            Self::Contextual144 => 144,
        }
    }
}

impl Default for EmbeddingVariant {
    fn default() -> Self {
        Self::Lexical8
    }
}

/// A fixed-dimension feature vector with components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    values: Vec<f32>,
}

impl EmbeddingVector {
    /// Construct a vector, rejecting the wrong length at build time.
    ///
    /// Components are clamped into `[0, 1]`; non-finite inputs collapse
    /// to zero.
    pub fn new(values: Vec<f32>, dim: usize) -> Result<Self, ValidationError> {
        if values.len() != dim {
            return Err(ValidationError::DimensionMismatch {
                actual: values.len(),
                expected: dim,
            });
        }
        let values = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 })
            .collect();
        Ok(Self { values })
    }

    /// Vector length.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Component slice.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Black-box part-of-speech tagging collaborator.
///
/// Implementations map a token to one of the [`POS_TAGS`] categories.
/// Unknown tags fall back to the last (least specific) category.
pub trait PosTagger {
    /// Tag a single token.
    fn tag(&self, token: &str) -> &'static str;
}

/// Rule-based tagger shipped for standalone use.
///
/// Closed-class word lists first, then capitalization, then suffix
/// heuristics, defaulting to `noun`. Crude, but deterministic and
/// offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixTagger;

impl PosTagger for SuffixTagger {
    fn tag(&self, token: &str) -> &'static str {
        let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
        let word = token.to_lowercase();
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());

        if word.is_empty() {
            return "symbol";
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            return "numeral";
        }

        const PRONOUNS: &[&str] = &[
            "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
        ];
        const PREPOSITIONS: &[&str] = &[
            "in", "on", "at", "by", "for", "with", "from", "to", "of", "over", "under",
        ];
        const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "so", "yet"];
        const DETERMINERS: &[&str] = &["the", "a", "an", "this", "that", "these", "those"];
        const INTERJECTIONS: &[&str] = &["oh", "ah", "wow", "ouch", "hey"];

        if PRONOUNS.contains(&word) {
            return "pronoun";
        }
        if PREPOSITIONS.contains(&word) {
            return "preposition";
        }
        if CONJUNCTIONS.contains(&word) {
            return "conjunction";
        }
        if DETERMINERS.contains(&word) {
            return "determiner";
        }
        if INTERJECTIONS.contains(&word) {
            return "interjection";
        }
        if starts_upper {
            return "proper-noun";
        }
        if word.ends_with("ly") {
            return "adverb";
        }
        if word.ends_with("ing") || word.ends_with("ize") || word.ends_with("ate") {
            return "verb";
        }
        if word.ends_with("ous")
            || word.ends_with("ful")
            || word.ends_with("ive")
            || word.ends_with("ic")
        {
            return "adjective";
        }
        "noun"
    }
}

/// Specificity component: direct index of the tag, normalized.
fn specificity(tag: &str) -> f32 {
    let idx = POS_TAGS.iter().position(|t| *t == tag);
    let idx = idx.unwrap_or(POS_TAGS.len() - 1);
    idx as f32 / (POS_TAGS.len() - 1) as f32
}

/// Lexical profile of a single token.
///
/// "Not found" positions (no alphabetic character, no vowel) use a
/// sentinel of zero rather than failing.
struct LexicalProfile {
    length: f32,
    first_letter: f32,
    last_letter: f32,
    first_vowel: f32,
    last_vowel: f32,
    vowel_count: f32,
    suffix_flag: f32,
}

fn alphabet_index(c: char) -> Option<f32> {
    c.to_ascii_lowercase()
        .is_ascii_lowercase()
        .then(|| (c.to_ascii_lowercase() as u32 - 'a' as u32) as f32)
}

fn lexical_profile(token: &str) -> LexicalProfile {
    let word = token.to_lowercase();
    let letters: Vec<char> = word.chars().collect();

    let first_letter = letters.iter().find_map(|&c| alphabet_index(c)).unwrap_or(0.0);
    let last_letter = letters
        .iter()
        .rev()
        .find_map(|&c| alphabet_index(c))
        .unwrap_or(0.0);

    let vowel_positions: Vec<usize> = letters
        .iter()
        .enumerate()
        .filter(|&(_, c)| VOWELS.contains(c))
        .map(|(i, _)| i)
        .collect();
    let first_vowel = vowel_positions.first().copied().unwrap_or(0) as f32;
    let last_vowel = vowel_positions.last().copied().unwrap_or(0) as f32;

    let suffix_flag = if SUFFIXES.iter().any(|s| word.ends_with(s)) {
        1.0
    } else {
        0.0
    };

    LexicalProfile {
        length: letters.len() as f32 / LENGTH_CAP,
        first_letter: first_letter / LETTER_CAP,
        last_letter: last_letter / LETTER_CAP,
        first_vowel: first_vowel / LETTER_CAP,
        last_vowel: last_vowel / LETTER_CAP,
        vowel_count: vowel_positions.len() as f32 / VOWEL_COUNT_CAP,
        suffix_flag,
    }
}

/// Stable bucket for the contextual variant, derived from a blake3 hash
/// of the continuation token.
fn contextual_bucket(next: &str, dim: usize) -> usize {
    let hash = blake3::hash(next.as_bytes());
    let bytes = hash.as_bytes();
    let mut bucket = 0u64;
    for (i, &b) in bytes.iter().take(8).enumerate() {
        bucket |= u64::from(b) << (i * 8);
    }
    (bucket as usize) % dim
}

/// Embed one `(token, next)` pair.
pub fn embed_pair(
    next: &str,
    count: u32,
    prevalence: u32,
    stats: TrainStats,
    tagger: &dyn PosTagger,
    variant: EmbeddingVariant,
) -> Result<EmbeddingVector, ValidationError> {
    let frequency = count as f32 / stats.max_frequency.max(1) as f32;
    let prevalence = prevalence as f32 / stats.max_prevalence.max(1) as f32;

    if variant == EmbeddingVariant::Contextual144 {
        // Deterministic by construction: zero vector, frequency written
        // into the continuation's hash bucket.
        let mut values = vec![0.0; variant.dim()];
        values[contextual_bucket(next, variant.dim())] = frequency;
        return EmbeddingVector::new(values, variant.dim());
    }

    let spec = specificity(tagger.tag(next));
    let lex = lexical_profile(next);

    let values = match variant {
        EmbeddingVariant::Lexical8 => vec![
            frequency,
            prevalence,
            spec,
            lex.length,
            lex.first_letter,
            lex.last_letter,
            lex.first_vowel,
            lex.last_vowel,
        ],
        EmbeddingVariant::Lexical9 => vec![
            frequency,
            prevalence,
            spec,
            lex.length,
            lex.first_letter,
            lex.last_letter,
            lex.first_vowel,
            lex.vowel_count,
            lex.suffix_flag,
        ],
        EmbeddingVariant::Contextual144 => unreachable!("handled above"),
    };
    EmbeddingVector::new(values, variant.dim())
}

/// One embedded `(token, next)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairEmbedding {
    /// The preceding token.
    pub token: Token,
    /// The observed continuation.
    pub next: Token,
    /// Raw bigram count behind the frequency component.
    pub count: u32,
    /// The feature vector.
    pub vector: EmbeddingVector,
}

/// All pair embeddings for a trained corpus, in training encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingStore {
    variant: EmbeddingVariant,
    pairs: Vec<PairEmbedding>,
    by_token: HashMap<Token, Vec<usize>>,
}

impl EmbeddingStore {
    /// Creates an empty store for the given variant.
    #[must_use]
    pub fn new(variant: EmbeddingVariant) -> Self {
        Self {
            variant,
            pairs: Vec::new(),
            by_token: HashMap::new(),
        }
    }

    /// The variant this store was built with.
    #[must_use]
    pub const fn variant(&self) -> EmbeddingVariant {
        self.variant
    }

    /// Number of embedded pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no pair has been embedded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs in encounter order.
    #[must_use]
    pub fn pairs(&self) -> &[PairEmbedding] {
        &self.pairs
    }

    fn push(&mut self, pair: PairEmbedding) {
        self.by_token
            .entry(pair.token.clone())
            .or_default()
            .push(self.pairs.len());
        self.pairs.push(pair);
    }

    /// Pairs whose preceding token is `token`, in encounter order.
    pub fn pairs_for(&self, token: &str) -> impl Iterator<Item = &PairEmbedding> + '_ {
        self.by_token
            .get(token)
            .into_iter()
            .flatten()
            .map(move |&i| &self.pairs[i])
    }

    /// The embedded pair for an exact `(token, next)` bigram.
    #[must_use]
    pub fn get(&self, token: &str, next: &str) -> Option<&PairEmbedding> {
        self.pairs_for(token).find(|p| p.next == next)
    }

    /// Most frequent observed continuation of `token`.
    ///
    /// Ties resolve to the earliest-encountered pair. This is the
    /// prediction engine's fallback when the trie has no entry.
    #[must_use]
    pub fn top_continuation(&self, token: &str) -> Option<&PairEmbedding> {
        let mut best: Option<&PairEmbedding> = None;
        for pair in self.pairs_for(token) {
            match best {
                Some(b) if b.count >= pair.count => {}
                _ => best = Some(pair),
            }
        }
        best
    }
}

/// Embed every `(token, next)` pair in a frequency table.
pub fn compute_embeddings(
    table: &FrequencyTable,
    tagger: &dyn PosTagger,
    variant: EmbeddingVariant,
) -> Result<EmbeddingStore, ValidationError> {
    let stats = table.stats();
    let mut store = EmbeddingStore::new(variant);

    for (token, continuations) in table.iter() {
        let prevalence = continuations.len() as u32;
        for (next, count) in continuations.iter() {
            let vector = embed_pair(next, count, prevalence, stats, tagger, variant)?;
            store.push(PairEmbedding {
                token: token.to_string(),
                next: next.to_string(),
                count,
                vector,
            });
        }
    }
    Ok(store)
}
