//! Abstract storage traits.

use crate::error::{StorageError, TrainingError};
use crate::storage::artifact::TrainedArtifact;

/// Persistence backend for trained artifacts, keyed by dataset name.
pub trait ArtifactStore {
    /// Persist an artifact under its dataset name, replacing any
    /// previous blob.
    fn save_artifact(&self, artifact: &TrainedArtifact) -> Result<(), StorageError>;

    /// Load the artifact stored under `dataset`.
    fn load_artifact(&self, dataset: &str) -> Result<TrainedArtifact, StorageError>;

    /// True when an artifact exists under `dataset`.
    fn has_artifact(&self, dataset: &str) -> bool;
}

/// Source of named plain-text corpus documents.
pub trait CorpusSource {
    /// Read one document as text. Unreadable or non-text documents are
    /// format errors and abort the training call.
    fn read_document(&self, name: &str) -> Result<String, TrainingError>;

    /// Read and concatenate several documents, each preceded by a
    /// newline separator.
    fn read_documents(&self, names: &[&str]) -> Result<String, TrainingError> {
        let mut corpus = String::new();
        for name in names {
            corpus.push('\n');
            corpus.push_str(&self.read_document(name)?);
        }
        Ok(corpus)
    }
}
