//! Model configuration.

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingVariant;
use crate::error::ValidationError;
use crate::trie::MERGE_CHUNK_SIZE;

/// Default top-k breadth for ranked candidate lists.
pub const DEFAULT_RANKING_BATCH_SIZE: usize = 50;

/// Default completion expansion depth.
pub const DEFAULT_MAX_RESPONSE_LENGTH: usize = 240;

/// Tunable knobs for training and prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Top-k breadth used when slicing ranked candidate lists.
    pub ranking_batch_size: usize,
    /// Maximum number of single-token expansions per completion.
    pub max_response_length: usize,
    /// Embedding dimensionality variant.
    pub variant: EmbeddingVariant,
    /// When true, predictions are drawn from embedding similarity
    /// ranking instead of the raw frequency winner.
    pub similarity_search: bool,
    /// Sequences merged per chunk during trie construction.
    pub merge_chunk_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ranking_batch_size: DEFAULT_RANKING_BATCH_SIZE,
            max_response_length: DEFAULT_MAX_RESPONSE_LENGTH,
            variant: EmbeddingVariant::default(),
            similarity_search: false,
            merge_chunk_size: MERGE_CHUNK_SIZE,
        }
    }
}

impl ModelConfig {
    /// Validate field ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ranking_batch_size == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "ranking_batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_response_length == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "max_response_length",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
