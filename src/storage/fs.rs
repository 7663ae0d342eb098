//! Filesystem storage backend.
//!
//! Artifacts are JSON files named `<dataset>.json` under the store root;
//! corpus documents are plain-text files resolved relative to the same
//! root. Writes go through a temporary file and rename so a crashed
//! write never leaves a truncated artifact behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, TrainingError};
use crate::storage::artifact::TrainedArtifact;
use crate::storage::traits::{ArtifactStore, CorpusSource};

/// JSON-file artifact store and plain-text corpus source.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`, creating the directory if
    /// needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| StorageError::Backend(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_path(&self, dataset: &str) -> PathBuf {
        self.root.join(format!("{dataset}.json"))
    }
}

impl ArtifactStore for FsStore {
    fn save_artifact(&self, artifact: &TrainedArtifact) -> Result<(), StorageError> {
        let path = self.artifact_path(&artifact.metadata.dataset);
        let json = serde_json::to_vec(artifact)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| StorageError::Backend(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| StorageError::Backend(format!("rename {}: {e}", path.display())))?;
        Ok(())
    }

    fn load_artifact(&self, dataset: &str) -> Result<TrainedArtifact, StorageError> {
        let path = self.artifact_path(dataset);
        if !path.exists() {
            return Err(StorageError::ArtifactNotFound(dataset.to_string()));
        }
        let bytes = fs::read(&path)
            .map_err(|e| StorageError::Backend(format!("read {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn has_artifact(&self, dataset: &str) -> bool {
        self.artifact_path(dataset).exists()
    }
}

impl CorpusSource for FsStore {
    fn read_document(&self, name: &str) -> Result<String, TrainingError> {
        let path = self.root.join(name);
        let bytes = fs::read(&path).map_err(|e| TrainingError::Format {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| TrainingError::Format {
            name: name.to_string(),
            reason: format!("not valid utf-8: {e}"),
        })
    }
}
