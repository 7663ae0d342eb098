//! Persistence for trained artifacts and corpus input.
//!
//! Backends implement the [`ArtifactStore`] and [`CorpusSource`] traits,
//! keeping the engine independent of where blobs live. A filesystem
//! backend is provided for real use and an in-memory backend for tests
//! and embedded callers.

mod artifact;
mod fs;
mod memory;
mod traits;

pub use artifact::{ArtifactMetadata, TrainedArtifact};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use traits::{ArtifactStore, CorpusSource};
