//! The process-lifetime training context.
//!
//! A [`Context`] bundles everything one training or ingestion cycle
//! produces: the trie, the frequency table and its statistics, the
//! embedding store, and the tokenized sequences the trie was built from.
//!
//! Contexts are immutable once built. Retraining constructs a complete
//! replacement off to the side; the owning model then publishes it with
//! a single atomic `Arc` swap, so readers never observe a torn state.

use crate::embedding::{EmbeddingStore, EmbeddingVariant, PosTagger};
use crate::error::ValidationError;
use crate::tokenizer::{self, Sequence, TokenizerConfig};
use crate::trainer::{self, FrequencyTable, TrainStats};
use crate::trie::TokenTrie;

/// Aggregate of all per-training-cycle state.
#[derive(Debug, Clone)]
pub struct Context {
    /// Prefix tree over the tokenized sequences.
    pub trie: TokenTrie,
    /// Bigram counts.
    pub frequencies: FrequencyTable,
    /// Corpus-wide maxima for feature normalization.
    pub stats: TrainStats,
    /// Pair embeddings for fallback and similarity ranking.
    pub embeddings: EmbeddingStore,
    /// The sentence-like sequences the trie was merged from.
    pub sequences: Vec<Sequence>,
}

impl Context {
    /// An empty context for a freshly created, untrained model.
    #[must_use]
    pub fn empty(variant: EmbeddingVariant) -> Self {
        Self {
            trie: TokenTrie::new(),
            frequencies: FrequencyTable::new(),
            stats: TrainStats::default(),
            embeddings: EmbeddingStore::new(variant),
            sequences: Vec::new(),
        }
    }

    /// Build a full context from raw text: tokenize, count, embed, and
    /// merge the trie in bounded chunks.
    pub fn build(
        text: &str,
        tokenizer_config: &TokenizerConfig,
        tagger: &dyn PosTagger,
        variant: EmbeddingVariant,
        merge_chunk_size: usize,
    ) -> Result<Self, ValidationError> {
        let tokens = tokenizer::tokenize(text, tokenizer_config);
        let sequences = tokenizer::split_sequences(text, tokenizer_config);

        let mut frequencies = FrequencyTable::new();
        trainer::train_frequencies(&mut frequencies, &tokens);
        let stats = frequencies.stats();

        let embeddings = crate::embedding::compute_embeddings(&frequencies, tagger, variant)?;
        let trie = TokenTrie::from_sequences_chunked(&sequences, merge_chunk_size);

        Ok(Self {
            trie,
            frequencies,
            stats,
            embeddings,
            sequences,
        })
    }

    /// Rebuild the trie and frequency state from raw text while keeping
    /// an existing embedding store.
    ///
    /// This backs `ingest`: new text becomes immediately queryable, but
    /// embeddings are not recomputed.
    #[must_use]
    pub fn rebuilt_from_text(
        text: &str,
        tokenizer_config: &TokenizerConfig,
        embeddings: EmbeddingStore,
        merge_chunk_size: usize,
    ) -> Self {
        let tokens = tokenizer::tokenize(text, tokenizer_config);
        let sequences = tokenizer::split_sequences(text, tokenizer_config);

        let mut frequencies = FrequencyTable::new();
        trainer::train_frequencies(&mut frequencies, &tokens);
        let stats = frequencies.stats();
        let trie = TokenTrie::from_sequences_chunked(&sequences, merge_chunk_size);

        Self {
            trie,
            frequencies,
            stats,
            embeddings,
            sequences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::SuffixTagger;
    use crate::trie::MERGE_CHUNK_SIZE;

    #[test]
    fn build_wires_all_components() {
        let ctx = Context::build(
            "The cat sat. The cat ran.",
            &TokenizerConfig::default(),
            &SuffixTagger,
            EmbeddingVariant::Lexical8,
            MERGE_CHUNK_SIZE,
        )
        .unwrap();

        assert_eq!(ctx.sequences.len(), 2);
        assert_eq!(ctx.frequencies.count("The", "cat"), 2);
        assert_eq!(ctx.stats.max_frequency, 2);
        assert!(!ctx.embeddings.is_empty());
        let hits = ctx.trie.lookup(&["The".to_string()]);
        assert_eq!(hits, ["cat".to_string()]);
    }

    #[test]
    fn empty_context_answers_nothing() {
        let ctx = Context::empty(EmbeddingVariant::Lexical8);
        assert!(ctx.trie.lookup(&["The".to_string()]).is_empty());
        assert!(ctx.frequencies.is_empty());
        assert!(ctx.embeddings.is_empty());
    }

    #[test]
    fn rebuild_keeps_embeddings() {
        let first = Context::build(
            "The cat sat.",
            &TokenizerConfig::default(),
            &SuffixTagger,
            EmbeddingVariant::Lexical8,
            MERGE_CHUNK_SIZE,
        )
        .unwrap();
        let embeddings = first.embeddings.clone();

        let second = Context::rebuilt_from_text(
            "The dog barked.",
            &TokenizerConfig::default(),
            embeddings,
            MERGE_CHUNK_SIZE,
        );

        // New trie reflects the new text only.
        assert!(second.trie.lookup(&["The".to_string()]).contains(&"dog".to_string()));
        assert!(!second.trie.lookup(&["The".to_string()]).contains(&"cat".to_string()));
        // Old embeddings survive untouched.
        assert!(second.embeddings.get("The", "cat").is_some());
    }
}
