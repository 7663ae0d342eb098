//! Error types for tokencast.
//!
//! All errors are strongly typed using thiserror, split by the layer they
//! originate from. This enables pattern matching on specific conditions
//! and keeps error messages uniform across the crate.
//!
//! Prediction-time "token not found" is deliberately *not* an error type:
//! it is reported in-band on [`crate::engine::Prediction`] so that a
//! missing middle token never aborts a batch completion request.

use thiserror::Error;

/// Validation errors raised while constructing vectors or configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// An embedding vector was constructed with the wrong length.
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Length of the rejected vector.
        actual: usize,
        /// Length demanded by the configured variant.
        expected: usize,
    },

    /// Dataset names key persisted artifacts and must be non-empty.
    #[error("Dataset name cannot be empty")]
    EmptyDatasetName,

    /// A configuration field holds a value outside its valid range.
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Training errors. These abort the training call that raised them.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// A corpus document could not be read or was not text-coercible.
    #[error("Corpus document '{name}' is unreadable: {reason}")]
    Format {
        /// Document name as passed to the corpus source.
        name: String,
        /// Underlying cause.
        reason: String,
    },

    /// Training was invoked with no usable tokens.
    #[error("Corpus produced no tokens")]
    EmptyCorpus,
}

/// Errors from the artifact persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No artifact stored under the given dataset name.
    #[error("No trained artifact for dataset '{0}'")]
    ArtifactNotFound(String),

    /// Artifact (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend I/O failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Top-level error type for tokencast.
#[derive(Debug, Error)]
pub enum TokencastError {
    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A training call failed.
    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    /// The persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invariant violation inside the crate.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the broken invariant.
        message: String,
    },
}

impl TokencastError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a training error.
    #[must_use]
    pub const fn is_training(&self) -> bool {
        matches!(self, Self::Training(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for tokencast operations.
pub type TokencastResult<T> = Result<T, TokencastError>;
