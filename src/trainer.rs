//! Bigram frequency training.
//!
//! Scans an ordered token stream and counts, for every usable token, how
//! often each continuation follows it. The resulting [`FrequencyTable`]
//! is the statistical backbone of both the embedder and the prediction
//! engine.
//!
//! Both map levels preserve insertion order explicitly. Ranking ties are
//! broken by first-encounter order as a documented policy, never by
//! incidental hash-map iteration order.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

fn punctuation_only() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\p{P}+$").expect("static pattern"))
}

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^A-Za-z0-9]+$").expect("static pattern"))
}

/// True when a token is excluded as a bigram key.
///
/// Excluded tokens do not terminate a training scan; they simply never
/// become keys. They may still appear as continuations of other tokens.
#[must_use]
pub fn is_excluded_key(token: &str) -> bool {
    token.is_empty() || punctuation_only().is_match(token) || non_alphanumeric().is_match(token)
}

/// An insertion-ordered token counter.
///
/// Serializes losslessly: both the entry list and the lookup index are
/// carried, so a JSON round trip reproduces counts and order exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMap {
    entries: Vec<(Token, u32)>,
    index: HashMap<Token, usize>,
}

impl CountMap {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for `token`, inserting it at zero first if
    /// unseen.
    pub fn increment(&mut self, token: &str) {
        match self.index.get(token) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push((token.to_string(), 1));
            }
        }
    }

    /// Count recorded for `token`, zero if unseen.
    #[must_use]
    pub fn get(&self, token: &str) -> u32 {
        self.index
            .get(token)
            .map_or(0, |&slot| self.entries[slot].1)
    }

    /// Number of distinct tokens counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Entries sorted by count descending; ties keep encounter order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(Token, u32)> {
        let mut out: Vec<(Token, u32)> = self.entries.clone();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out
    }

    /// Highest-count entry, if any. Ties resolve to the earliest.
    #[must_use]
    pub fn top(&self) -> Option<(&str, u32)> {
        let mut best: Option<(&str, u32)> = None;
        for (token, count) in self.iter() {
            match best {
                Some((_, c)) if c >= count => {}
                _ => best = Some((token, count)),
            }
        }
        best
    }
}

/// Mapping from token to its observed continuations with counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    rows: Vec<(Token, CountMap)>,
    index: HashMap<Token, usize>,
}

impl FrequencyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `prev -> next` observation.
    pub fn increment(&mut self, prev: &str, next: &str) {
        let slot = match self.index.get(prev) {
            Some(&slot) => slot,
            None => {
                let slot = self.rows.len();
                self.index.insert(prev.to_string(), slot);
                self.rows.push((prev.to_string(), CountMap::new()));
                slot
            }
        };
        self.rows[slot].1.increment(next);
    }

    /// Continuations observed after `token`.
    #[must_use]
    pub fn continuations(&self, token: &str) -> Option<&CountMap> {
        self.index.get(token).map(|&slot| &self.rows[slot].1)
    }

    /// Count of the `prev -> next` bigram.
    #[must_use]
    pub fn count(&self, prev: &str, next: &str) -> u32 {
        self.continuations(prev).map_or(0, |c| c.get(next))
    }

    /// Number of distinct key tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no bigram has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountMap)> {
        self.rows.iter().map(|(t, c)| (t.as_str(), c))
    }

    /// Corpus-wide maxima used to normalize embedding features.
    #[must_use]
    pub fn stats(&self) -> TrainStats {
        let mut stats = TrainStats::default();
        for (_, continuations) in self.iter() {
            let prevalence = continuations.len() as u32;
            stats.max_prevalence = stats.max_prevalence.max(prevalence);
            for (_, count) in continuations.iter() {
                stats.max_frequency = stats.max_frequency.max(count);
            }
        }
        stats
    }
}

/// Corpus-wide statistics derived from a [`FrequencyTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainStats {
    /// Largest single bigram count observed.
    pub max_frequency: u32,
    /// Largest number of distinct continuations of any token.
    pub max_prevalence: u32,
}

/// Scan a token stream, accumulating bigram counts into `table`.
///
/// Tokens matching the punctuation-only or non-alphanumeric patterns are
/// skipped as keys without terminating the scan. The final token has no
/// continuation and is likewise skipped. Counts only ever increase.
pub fn train_frequencies(table: &mut FrequencyTable, tokens: &[Token]) {
    for window in tokens.windows(2) {
        let (prev, next) = (&window[0], &window[1]);
        if is_excluded_key(prev) {
            continue;
        }
        table.increment(prev, next);
    }
}
