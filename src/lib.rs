//! # Tokencast - Statistical Next-Token Prediction
//!
//! Tokencast builds a next-token/next-phrase predictor from a plain-text
//! corpus and serves completions from an in-memory trie, augmented with
//! fixed-dimension lexical feature embeddings for similarity fallback.
//! It targets autocomplete/autocorrect-style use cases, not
//! deep-learning inference.
//!
//! ## Core Concepts
//!
//! - **Token**: atomic string unit produced by normalization
//! - **FrequencyTable**: bigram counts with explicit insertion order
//! - **TokenTrie**: prefix tree over all observed token sequences
//! - **EmbeddingVector**: `[0, 1]`-clamped lexical/statistical features
//!   per `(token, next)` pair
//! - **Context**: everything one training cycle produces, published
//!   wholesale with an atomic swap
//!
//! ## Usage
//!
//! ```rust
//! use tokencast::{Model, ModelConfig};
//!
//! let model = Model::new(ModelConfig::default()).unwrap();
//! model.train("tiny", "The cat sat. The cat ran.").unwrap();
//!
//! let prediction = model.token_prediction("The");
//! assert_eq!(prediction.token.as_deref(), Some("cat"));
//!
//! let completions = model.completions("The");
//! assert_eq!(completions.completions.len(), 1 + completions.ranked.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod context;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod similarity;
pub mod storage;
pub mod tokenizer;
pub mod trainer;
pub mod trie;

// Re-export primary types at crate root for convenience
pub use config::{ModelConfig, DEFAULT_MAX_RESPONSE_LENGTH, DEFAULT_RANKING_BATCH_SIZE};
pub use context::Context;
pub use embedding::{
    EmbeddingStore, EmbeddingVariant, EmbeddingVector, PairEmbedding, PosTagger, SuffixTagger,
};
pub use engine::{Completions, Model, Prediction, SequencePrediction};
pub use error::{
    StorageError, TokencastError, TokencastResult, TrainingError, ValidationError,
};
pub use storage::{ArtifactMetadata, ArtifactStore, CorpusSource, FsStore, MemoryStore, TrainedArtifact};
pub use tokenizer::{Sequence, Token, TokenizerConfig};
pub use trainer::{CountMap, FrequencyTable, TrainStats};
pub use trie::{TokenTrie, MERGE_CHUNK_SIZE};
