//! The trained artifact blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::{EmbeddingStore, EmbeddingVariant};
use crate::tokenizer::Sequence;
use crate::trainer::FrequencyTable;

/// Provenance metadata stored with every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Dataset name the artifact is keyed by.
    pub dataset: String,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// blake3 hex digest of the raw corpus, used to detect stale
    /// artifacts in `train_or_load`.
    pub corpus_checksum: String,
    /// Embedding variant the store was built with.
    pub variant: EmbeddingVariant,
}

/// Everything a training cycle persists: counts, embeddings, and the
/// tokenized sequences the trie is rebuilt from on load.
///
/// Serialization must be lossless: reloading an artifact yields equal
/// key sets, counts, and vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifact {
    /// Provenance metadata.
    pub metadata: ArtifactMetadata,
    /// Bigram frequency table.
    pub frequencies: FrequencyTable,
    /// Pair embedding store.
    pub embeddings: EmbeddingStore,
    /// Tokenized training sequences.
    pub sequences: Vec<Sequence>,
}

impl TrainedArtifact {
    /// Stable checksum of a raw corpus.
    #[must_use]
    pub fn corpus_checksum(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{compute_embeddings, SuffixTagger};
    use crate::tokenizer::{split_sequences, tokenize, TokenizerConfig};
    use crate::trainer::train_frequencies;

    fn artifact_for(text: &str) -> TrainedArtifact {
        let config = TokenizerConfig::default();
        let tokens = tokenize(text, &config);
        let mut frequencies = FrequencyTable::new();
        train_frequencies(&mut frequencies, &tokens);
        let embeddings =
            compute_embeddings(&frequencies, &SuffixTagger, EmbeddingVariant::Lexical8).unwrap();
        TrainedArtifact {
            metadata: ArtifactMetadata {
                dataset: "test".to_string(),
                trained_at: Utc::now(),
                corpus_checksum: TrainedArtifact::corpus_checksum(text),
                variant: EmbeddingVariant::Lexical8,
            },
            frequencies,
            embeddings,
            sequences: split_sequences(text, &config),
        }
    }

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        let a = TrainedArtifact::corpus_checksum("The cat sat.");
        let b = TrainedArtifact::corpus_checksum("The cat sat.");
        let c = TrainedArtifact::corpus_checksum("The cat ran.");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let artifact = artifact_for("The cat sat. The cat ran.");
        let json = serde_json::to_string(&artifact).unwrap();
        let restored: TrainedArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(artifact, restored);
        assert_eq!(restored.frequencies.count("The", "cat"), 2);
    }
}
