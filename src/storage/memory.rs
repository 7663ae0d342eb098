//! In-memory storage backend.
//!
//! Thread-safe reference implementation of the storage traits, intended
//! for tests and embedded callers that never touch the filesystem.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StorageError, TrainingError};
use crate::storage::artifact::TrainedArtifact;
use crate::storage::traits::{ArtifactStore, CorpusSource};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// In-memory artifact store and corpus source.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: RwLock<HashMap<String, TrainedArtifact>>,
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named corpus document.
    pub fn insert_document(&self, name: impl Into<String>, text: impl Into<String>) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(name.into(), text.into());
        }
    }
}

impl ArtifactStore for MemoryStore {
    fn save_artifact(&self, artifact: &TrainedArtifact) -> Result<(), StorageError> {
        let mut artifacts = self.artifacts.write().map_err(|_| lock_err("artifacts"))?;
        artifacts.insert(artifact.metadata.dataset.clone(), artifact.clone());
        Ok(())
    }

    fn load_artifact(&self, dataset: &str) -> Result<TrainedArtifact, StorageError> {
        let artifacts = self.artifacts.read().map_err(|_| lock_err("artifacts"))?;
        artifacts
            .get(dataset)
            .cloned()
            .ok_or_else(|| StorageError::ArtifactNotFound(dataset.to_string()))
    }

    fn has_artifact(&self, dataset: &str) -> bool {
        self.artifacts
            .read()
            .map(|artifacts| artifacts.contains_key(dataset))
            .unwrap_or(false)
    }
}

impl CorpusSource for MemoryStore {
    fn read_document(&self, name: &str) -> Result<String, TrainingError> {
        let documents = self.documents.read().map_err(|_| TrainingError::Format {
            name: name.to_string(),
            reason: "poisoned lock: documents".to_string(),
        })?;
        documents
            .get(name)
            .cloned()
            .ok_or_else(|| TrainingError::Format {
                name: name.to_string(),
                reason: "no such document".to_string(),
            })
    }
}
