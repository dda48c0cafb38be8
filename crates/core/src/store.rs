//! Vector store trait: indexed chunks with nearest-neighbour search.
//!
//! The ingestor writes `(chunk text, embedding)` pairs into one named
//! collection; the retriever tool searches that collection by the
//! embedding of a question.
//!
//! Implementations: Qdrant (HTTP), in-memory (testing, offline sessions).

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a chunk came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document (file path as given to the ingestor)
    #[serde(default)]
    pub source: String,

    /// Zero-based page number, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Position of the chunk within its source
    #[serde(default)]
    pub chunk_index: usize,
}

/// A bounded-length substring of a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Point ID in the store
    pub id: String,

    /// The chunk text
    pub text: String,

    /// Provenance
    pub metadata: ChunkMetadata,

    /// Embedding vector (set before upsert)
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create a chunk with an ID derived from its provenance.
    ///
    /// The same `(source, chunk_index)` always maps to the same ID, so
    /// re-ingesting a document overwrites points instead of duplicating them.
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        let id = Self::point_id(&metadata.source, metadata.chunk_index);
        Self {
            id,
            text: text.into(),
            metadata,
            embedding: None,
        }
    }

    pub fn point_id(source: &str, chunk_index: usize) -> String {
        let name = format!("{source}#{chunk_index}");
        Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
    }
}

/// A search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Similarity score (cosine: higher is closer)
    pub score: f32,
}

/// The core VectorStore trait.
///
/// Each instance is bound to one collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The backend name (e.g., "qdrant", "in_memory").
    fn name(&self) -> &str;

    /// The collection this store reads and writes.
    fn collection(&self) -> &str;

    /// Whether the collection exists.
    async fn collection_exists(&self) -> std::result::Result<bool, StoreError>;

    /// Create the collection for vectors of `dimension` if missing.
    /// Returns `true` when it was created by this call.
    async fn ensure_collection(&self, dimension: usize) -> std::result::Result<bool, StoreError>;

    /// Drop the collection and every point in it.
    async fn delete_collection(&self) -> std::result::Result<(), StoreError>;

    /// Insert or overwrite chunks. Chunks without an embedding are skipped.
    /// Returns the number written.
    async fn upsert(&self, chunks: &[Chunk]) -> std::result::Result<usize, StoreError>;

    /// The `limit` chunks closest to `vector`, best first.
    async fn search(&self, vector: &[f32], limit: usize) -> std::result::Result<Vec<ScoredChunk>, StoreError>;

    /// Number of points in the collection (0 when it does not exist).
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}
