//! The prediction engine and model handle.
//!
//! A [`Model`] owns the current [`Context`] behind an `RwLock<Arc<..>>`.
//! Training, loading, and ingestion each build a complete replacement
//! context off to the side and publish it with one atomic swap of the
//! `Arc`; readers clone the `Arc` under a brief read lock and then work
//! entirely on their snapshot, so a retrain can never tear a lookup in
//! progress.
//!
//! Prediction-time misses are reported in-band on the result structs.
//! They are recoverable by design and never abort a batch completion
//! request.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::context::Context;
use crate::embedding::{PosTagger, SuffixTagger};
use crate::error::{TokencastResult, TrainingError, ValidationError};
use crate::similarity;
use crate::storage::{ArtifactMetadata, ArtifactStore, CorpusSource, TrainedArtifact};
use crate::tokenizer::{self, Token, TokenizerConfig};
use crate::trie::TokenTrie;

/// Result of a single-token prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// The chosen continuation, if any.
    pub token: Option<Token>,
    /// Ranked candidates, bounded by the ranking batch size.
    pub ranked: Vec<Token>,
    /// Populated when neither the trie nor the embedding fallback
    /// resolved the query.
    pub error: Option<String>,
}

impl Prediction {
    fn miss(message: String) -> Self {
        Self {
            token: None,
            ranked: Vec::new(),
            error: Some(message),
        }
    }
}

/// Result of a multi-token sequence prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePrediction {
    /// Deduplicated, space-joined continuation of the query.
    pub completion: String,
    /// First chosen token.
    pub token: Option<Token>,
    /// Ranked candidates from the first expansion step.
    pub ranked: Vec<Token>,
}

/// Result of a completions request: the primary completion plus one
/// alternative per ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completions {
    /// The primary completion.
    pub completion: String,
    /// First chosen token of the primary completion.
    pub token: Option<Token>,
    /// Ranked candidates behind the alternatives.
    pub ranked: Vec<Token>,
    /// Primary completion followed by one alternative per candidate;
    /// always `1 + ranked.len()` entries.
    pub completions: Vec<String>,
}

/// A trained next-token prediction model.
pub struct Model {
    config: ModelConfig,
    tokenizer: TokenizerConfig,
    tagger: Box<dyn PosTagger + Send + Sync>,
    context: RwLock<Arc<Context>>,
}

impl Model {
    /// Create an untrained model with the given configuration.
    pub fn new(config: ModelConfig) -> TokencastResult<Self> {
        Self::with_tagger(config, Box::new(SuffixTagger))
    }

    /// Create an untrained model with an external part-of-speech tagger.
    pub fn with_tagger(
        config: ModelConfig,
        tagger: Box<dyn PosTagger + Send + Sync>,
    ) -> TokencastResult<Self> {
        config.validate()?;
        let context = Arc::new(Context::empty(config.variant));
        Ok(Self {
            config,
            tokenizer: TokenizerConfig::default(),
            tagger,
            context: RwLock::new(context),
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Snapshot the current context.
    ///
    /// Lock poisoning is tolerated: the context behind the lock is
    /// always a fully built value, so the snapshot stays coherent.
    fn snapshot(&self) -> Arc<Context> {
        match self.context.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Publish a replacement context with a single atomic swap.
    fn publish(&self, context: Context) {
        let context = Arc::new(context);
        match self.context.write() {
            Ok(mut guard) => *guard = context,
            Err(poisoned) => *poisoned.into_inner() = context,
        }
    }

    fn context_from_artifact(&self, artifact: &TrainedArtifact) -> Context {
        Context {
            trie: TokenTrie::from_sequences_chunked(
                &artifact.sequences,
                self.config.merge_chunk_size,
            ),
            stats: artifact.frequencies.stats(),
            frequencies: artifact.frequencies.clone(),
            embeddings: artifact.embeddings.clone(),
            sequences: artifact.sequences.clone(),
        }
    }

    /// Train on raw corpus text and publish the new context.
    ///
    /// Returns the artifact so callers can hand it to a persistence
    /// backend.
    pub fn train(&self, dataset: &str, corpus: &str) -> TokencastResult<TrainedArtifact> {
        if dataset.is_empty() {
            return Err(ValidationError::EmptyDatasetName.into());
        }

        let context = Context::build(
            corpus,
            &self.tokenizer,
            self.tagger.as_ref(),
            self.config.variant,
            self.config.merge_chunk_size,
        )?;
        if context.frequencies.is_empty() {
            return Err(TrainingError::EmptyCorpus.into());
        }

        let artifact = TrainedArtifact {
            metadata: ArtifactMetadata {
                dataset: dataset.to_string(),
                trained_at: Utc::now(),
                corpus_checksum: TrainedArtifact::corpus_checksum(corpus),
                variant: self.config.variant,
            },
            frequencies: context.frequencies.clone(),
            embeddings: context.embeddings.clone(),
            sequences: context.sequences.clone(),
        };
        self.publish(context);
        Ok(artifact)
    }

    /// Publish a previously trained artifact, rebuilding the trie from
    /// its stored sequences.
    pub fn load(&self, artifact: &TrainedArtifact) -> TokencastResult<()> {
        if artifact.metadata.variant != self.config.variant {
            return Err(ValidationError::DimensionMismatch {
                actual: artifact.metadata.variant.dim(),
                expected: self.config.variant.dim(),
            }
            .into());
        }
        self.publish(self.context_from_artifact(artifact));
        Ok(())
    }

    /// Load a cached artifact when its corpus checksum still matches,
    /// otherwise retrain from the named documents and persist the fresh
    /// artifact.
    pub fn train_or_load<S>(
        &self,
        dataset: &str,
        documents: &[&str],
        store: &S,
    ) -> TokencastResult<TrainedArtifact>
    where
        S: ArtifactStore + CorpusSource,
    {
        if dataset.is_empty() {
            return Err(ValidationError::EmptyDatasetName.into());
        }

        let corpus = store.read_documents(documents)?;
        let checksum = TrainedArtifact::corpus_checksum(&corpus);

        if store.has_artifact(dataset) {
            let artifact = store.load_artifact(dataset)?;
            if artifact.metadata.corpus_checksum == checksum
                && artifact.metadata.variant == self.config.variant
            {
                self.load(&artifact)?;
                return Ok(artifact);
            }
        }

        let artifact = self.train(dataset, &corpus)?;
        store.save_artifact(&artifact)?;
        Ok(artifact)
    }

    /// Replace the queryable text without retraining embeddings.
    ///
    /// The trie, frequency table, and sequences are rebuilt from `text`;
    /// the embedding store carries over unchanged.
    pub fn ingest(&self, text: &str) {
        let embeddings = self.snapshot().embeddings.clone();
        let context = Context::rebuilt_from_text(
            text,
            &self.tokenizer,
            embeddings,
            self.config.merge_chunk_size,
        );
        self.publish(context);
    }

    /// When similarity search is on, swap the frequency winner for the
    /// most similar other pair's continuation.
    fn similarity_choice(&self, context: &Context, prev: &str, chosen: &str) -> Option<Token> {
        let reference = context.embeddings.get(prev, chosen)?;
        let ranked = similarity::rank_similar(&context.embeddings, reference);
        ranked.first().map(|(pair, _)| pair.next.clone())
    }

    /// Predict the next token after `query`.
    ///
    /// The query is tokenized, its first token capitalized, and the full
    /// token path walked in the trie. Candidates are weighted by bigram
    /// count with ties kept in trie insertion order, then truncated to
    /// the ranking batch size. A trie miss falls back to the embedding
    /// store's most frequent continuation; a double miss is reported
    /// in-band.
    #[must_use]
    pub fn token_prediction(&self, query: &str) -> Prediction {
        let context = self.snapshot();

        let mut tokens = tokenizer::tokenize(query, &self.tokenizer);
        let Some(first) = tokens.first() else {
            return Prediction::miss("query contained no usable tokens".to_string());
        };
        // Capitalization only touches the first token, so it can change
        // the fallback key for single-token queries; keep the raw form.
        let raw_last = tokens.last().cloned().unwrap_or_default();
        tokens[0] = tokenizer::capitalize(first);
        let last = tokens.last().cloned().unwrap_or_default();

        let continuations = context.trie.lookup(&tokens);
        if !continuations.is_empty() {
            let mut weighted: Vec<(Token, u32)> = continuations
                .iter()
                .map(|t| (t.clone(), context.frequencies.count(&last, t)))
                .collect();
            // Stable sort: equal weights keep trie insertion order.
            weighted.sort_by(|a, b| b.1.cmp(&a.1));
            weighted.truncate(self.config.ranking_batch_size);

            let mut token = weighted[0].0.clone();
            if self.config.similarity_search {
                if let Some(similar) = self.similarity_choice(&context, &last, &token) {
                    token = similar;
                }
            }
            return Prediction {
                token: Some(token),
                ranked: weighted.into_iter().map(|(t, _)| t).collect(),
                error: None,
            };
        }

        let fallback = context
            .embeddings
            .top_continuation(&last)
            .or_else(|| context.embeddings.top_continuation(&raw_last));
        if let Some(pair) = fallback {
            let prev = pair.token.clone();
            let mut token = pair.next.clone();
            let ranked = vec![token.clone()];
            if self.config.similarity_search {
                if let Some(similar) = self.similarity_choice(&context, &prev, &token) {
                    token = similar;
                }
            }
            return Prediction {
                token: Some(token),
                ranked,
                error: None,
            };
        }

        Prediction::miss(format!("no known continuation for '{raw_last}'"))
    }

    /// Predict a multi-token continuation of `query`.
    ///
    /// Runs up to `length` single-token predictions (additionally capped
    /// by `max_response_length`) on the growing string, then dedups the
    /// accumulated tokens preserving first occurrence and joins them
    /// with spaces. Duplicates never cause an early exit; only a lookup
    /// miss stops the loop, since the input cannot grow further.
    #[must_use]
    pub fn sequence_prediction(&self, query: &str, length: usize) -> SequencePrediction {
        let length = length.min(self.config.max_response_length);
        let mut current = query.trim().to_string();
        let mut collected: Vec<Token> = Vec::new();
        let mut first: Option<Prediction> = None;

        for _ in 0..length {
            let prediction = self.token_prediction(&current);
            let is_first = first.is_none();
            if is_first {
                first = Some(prediction.clone());
            }
            match prediction.token {
                Some(token) => {
                    current.push(' ');
                    current.push_str(&token);
                    collected.push(token);
                }
                None => break,
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut unique: Vec<&str> = Vec::new();
        for token in &collected {
            if seen.insert(token.as_str()) {
                unique.push(token.as_str());
            }
        }

        let (token, ranked) = match first {
            Some(p) => (p.token, p.ranked),
            None => (None, Vec::new()),
        };
        SequencePrediction {
            completion: unique.join(" "),
            token,
            ranked,
        }
    }

    /// Produce the primary completion plus one alternative per ranked
    /// candidate.
    ///
    /// Each alternative re-runs sequence prediction with the candidate
    /// appended to the input. Worst case this performs
    /// O(batch size × max response length) single-token lookups. A
    /// candidate with no further continuation still yields an
    /// alternative consisting of the candidate itself.
    #[must_use]
    pub fn completions(&self, input: &str) -> Completions {
        let primary = self.sequence_prediction(input, self.config.max_response_length);

        let mut completions = Vec::with_capacity(1 + primary.ranked.len());
        completions.push(primary.completion.clone());

        for candidate in &primary.ranked {
            let extended = format!("{} {candidate}", input.trim());
            let alternative =
                self.sequence_prediction(&extended, self.config.max_response_length);
            if alternative.completion.is_empty() {
                completions.push(candidate.clone());
            } else {
                completions.push(format!("{candidate} {}", alternative.completion));
            }
        }

        Completions {
            completion: primary.completion,
            token: primary.token,
            ranked: primary.ranked,
            completions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const CAT_CORPUS: &str = "The cat sat. The cat ran.";

    fn trained(corpus: &str) -> Model {
        let model = Model::new(ModelConfig::default()).unwrap();
        model.train("test", corpus).unwrap();
        model
    }

    #[test]
    fn token_prediction_follows_frequency() {
        let model = trained(CAT_CORPUS);
        let p = model.token_prediction("The");
        assert_eq!(p.token.as_deref(), Some("cat"));
        assert!(p.error.is_none());
    }

    #[test]
    fn query_is_capitalized_before_lookup() {
        let model = trained(CAT_CORPUS);
        let p = model.token_prediction("the");
        assert_eq!(p.token.as_deref(), Some("cat"));
    }

    #[test]
    fn unseen_token_reports_in_band_error() {
        let model = trained(CAT_CORPUS);
        let p = model.token_prediction("zzzzz");
        assert!(p.token.is_none());
        assert!(p.ranked.is_empty());
        assert!(p.error.unwrap().contains("zzzzz"));
    }

    #[test]
    fn ranked_list_is_bounded_by_batch_size() {
        let corpus: String = (0..80)
            .map(|i| format!("Base word{i}. "))
            .collect();
        let config = ModelConfig {
            ranking_batch_size: 10,
            ..ModelConfig::default()
        };
        let model = Model::new(config).unwrap();
        model.train("test", &corpus).unwrap();
        let p = model.token_prediction("Base");
        assert_eq!(p.ranked.len(), 10);
    }

    #[test]
    fn ranked_ties_keep_insertion_order() {
        // "sat" and "ran" both follow "cat" once; "sat" was seen first.
        let model = trained(CAT_CORPUS);
        let p = model.token_prediction("The cat");
        assert_eq!(p.ranked, vec!["sat".to_string(), "ran".to_string()]);
    }

    #[test]
    fn sequence_prediction_dedups_preserving_order() {
        let model = trained("A b. A b. A b.");
        let s = model.sequence_prediction("A", 5);
        let words: Vec<&str> = s.completion.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        // Five expansion steps over a two-token cycle, but every token
        // appears exactly once in the joined completion.
        assert_eq!(unique.len(), words.len());
        assert!(!words.is_empty());
    }

    #[test]
    fn sequence_prediction_respects_length_cap() {
        let config = ModelConfig {
            max_response_length: 2,
            ..ModelConfig::default()
        };
        let model = Model::new(config).unwrap();
        model
            .train("test", "One two three four five. One two three four five.")
            .unwrap();
        let s = model.sequence_prediction("One", 100);
        assert!(s.completion.split_whitespace().count() <= 2);
    }

    #[test]
    fn completions_length_property() {
        let model = trained("The cat sat. The cat ran. The dog sat. The fox hid.");
        let c = model.completions("The");
        assert_eq!(c.completions.len(), 1 + c.ranked.len());
        assert_eq!(c.completions[0], c.completion);
    }

    #[test]
    fn completions_on_unseen_input_is_empty_but_well_formed() {
        let model = trained(CAT_CORPUS);
        let c = model.completions("zzzzz");
        assert!(c.token.is_none());
        assert!(c.ranked.is_empty());
        assert_eq!(c.completions.len(), 1);
        assert!(c.completion.is_empty());
    }

    #[test]
    fn embedding_fallback_when_trie_misses() {
        let model = trained(CAT_CORPUS);
        // "cat" alone is not a trie root path ("The" is), but the
        // embedding store knows its continuations.
        let p = model.token_prediction("cat");
        assert!(p.token.is_some());
        assert!(p.error.is_none());
    }

    #[test]
    fn similarity_search_still_resolves() {
        let config = ModelConfig {
            similarity_search: true,
            ..ModelConfig::default()
        };
        let model = Model::new(config).unwrap();
        model
            .train("test", "The cat sat. The cat ran. The dog sat.")
            .unwrap();
        let p = model.token_prediction("The");
        assert!(p.token.is_some());
        assert!(p.error.is_none());
    }

    #[test]
    fn ingest_replaces_text_and_keeps_embeddings() {
        let model = trained(CAT_CORPUS);
        model.ingest("The dog barked. The dog slept.");
        let p = model.token_prediction("The");
        assert_eq!(p.token.as_deref(), Some("dog"));
        // The old trie path is gone, but the retained embeddings still
        // answer through the fallback.
        let old = model.token_prediction("The cat");
        assert_eq!(old.token.as_deref(), Some("sat"));
    }

    #[test]
    fn train_rejects_empty_dataset_name() {
        let model = Model::new(ModelConfig::default()).unwrap();
        assert!(model.train("", CAT_CORPUS).is_err());
    }

    #[test]
    fn train_rejects_empty_corpus() {
        let model = Model::new(ModelConfig::default()).unwrap();
        let err = model.train("test", "...").unwrap_err();
        assert!(err.is_training());
    }

    #[test]
    fn train_or_load_uses_cache_when_checksum_matches() {
        let store = MemoryStore::new();
        store.insert_document("doc", CAT_CORPUS);

        let model = Model::new(ModelConfig::default()).unwrap();
        let first = model.train_or_load("cats", &["doc"], &store).unwrap();
        let second = model.train_or_load("cats", &["doc"], &store).unwrap();
        assert_eq!(first.metadata.trained_at, second.metadata.trained_at);
    }

    #[test]
    fn train_or_load_retrains_on_checksum_mismatch() {
        let store = MemoryStore::new();
        store.insert_document("doc", CAT_CORPUS);

        let model = Model::new(ModelConfig::default()).unwrap();
        let first = model.train_or_load("cats", &["doc"], &store).unwrap();

        store.insert_document("doc", "The dog barked. The dog slept.");
        let second = model.train_or_load("cats", &["doc"], &store).unwrap();
        assert_ne!(
            first.metadata.corpus_checksum,
            second.metadata.corpus_checksum
        );
        assert_eq!(model.token_prediction("The").token.as_deref(), Some("dog"));
    }

    #[test]
    fn load_rejects_variant_mismatch() {
        let model8 = trained(CAT_CORPUS);
        let artifact = model8.train("test", CAT_CORPUS).unwrap();

        let config9 = ModelConfig {
            variant: crate::embedding::EmbeddingVariant::Lexical9,
            ..ModelConfig::default()
        };
        let model9 = Model::new(config9).unwrap();
        assert!(model9.load(&artifact).is_err());
    }

    #[test]
    fn retrain_swaps_context_wholesale() {
        let model = trained(CAT_CORPUS);
        model.train("test", "New words only. New words again.").unwrap();
        let p = model.token_prediction("The");
        assert!(p.token.is_none());
        assert_eq!(model.token_prediction("New").token.as_deref(), Some("words"));
    }
}
