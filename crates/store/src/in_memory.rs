//! In-memory store: useful for testing and offline sessions.

use crate::vector::rank_chunks;
use askpdf_core::error::StoreError;
use askpdf_core::store::{Chunk, ScoredChunk, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collection {
    dimension: usize,
    points: Vec<Chunk>,
}

/// A vector store that keeps one collection in a Vec and searches it by
/// brute-force cosine similarity.
#[derive(Clone)]
pub struct InMemoryStore {
    collection: String,
    state: Arc<RwLock<Option<Collection>>>,
}

impl InMemoryStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            state: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new("learning_langchain")
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn collection_exists(&self) -> Result<bool, StoreError> {
        Ok(self.state.read().await.is_some())
    }

    async fn ensure_collection(&self, dimension: usize) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.as_ref() {
            Some(existing) if existing.dimension != dimension => Err(StoreError::DimensionMismatch {
                expected: existing.dimension,
                actual: dimension,
            }),
            Some(_) => Ok(false),
            None => {
                *state = Some(Collection {
                    dimension,
                    points: Vec::new(),
                });
                Ok(true)
            }
        }
    }

    async fn delete_collection(&self) -> Result<(), StoreError> {
        *self.state.write().await = None;
        Ok(())
    }

    async fn upsert(&self, chunks: &[Chunk]) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        let collection = state
            .as_mut()
            .ok_or_else(|| StoreError::CollectionNotFound(self.collection.clone()))?;

        let mut written = 0;
        for chunk in chunks {
            let Some(embedding) = chunk.embedding.as_ref() else {
                continue;
            };
            if embedding.len() != collection.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: collection.dimension,
                    actual: embedding.len(),
                });
            }
            match collection.points.iter_mut().find(|p| p.id == chunk.id) {
                Some(existing) => *existing = chunk.clone(),
                None => collection.points.push(chunk.clone()),
            }
            written += 1;
        }
        Ok(written)
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let state = self.state.read().await;
        let collection = state
            .as_ref()
            .ok_or_else(|| StoreError::CollectionNotFound(self.collection.clone()))?;
        Ok(rank_chunks(&collection.points, vector, limit))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().await.as_ref().map_or(0, |c| c.points.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askpdf_core::ChunkMetadata;

    fn embedded(idx: usize, text: &str, embedding: Vec<f32>) -> Chunk {
        let mut c = Chunk::new(
            text,
            ChunkMetadata {
                source: "react interview.pdf".into(),
                page: Some(0),
                chunk_index: idx,
            },
        );
        c.embedding = Some(embedding);
        c
    }

    #[tokio::test]
    async fn ensure_collection_creates_once() {
        let store = InMemoryStore::default();
        assert!(!store.collection_exists().await.unwrap());
        assert!(store.ensure_collection(3).await.unwrap());
        assert!(!store.ensure_collection(3).await.unwrap());
        assert!(store.collection_exists().await.unwrap());
    }

    #[tokio::test]
    async fn ensure_collection_rejects_other_dimension() {
        let store = InMemoryStore::default();
        store.ensure_collection(3).await.unwrap();
        let err = store.ensure_collection(4).await.unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 3, actual: 4 }));
    }

    #[tokio::test]
    async fn upsert_requires_collection() {
        let store = InMemoryStore::default();
        let err = store.upsert(&[embedded(0, "a", vec![1.0])]).await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn upsert_overwrites_same_id() {
        let store = InMemoryStore::default();
        store.ensure_collection(2).await.unwrap();
        store.upsert(&[embedded(0, "old", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(&[embedded(0, "new", vec![1.0, 0.0])]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let hits = store.search(&[1.0, 0.0], 4).await.unwrap();
        assert_eq!(hits[0].chunk.text, "new");
    }

    #[tokio::test]
    async fn upsert_skips_unembedded_chunks() {
        let store = InMemoryStore::default();
        store.ensure_collection(2).await.unwrap();
        let bare = Chunk::new("no vector", ChunkMetadata::default());
        let written = store
            .upsert(&[bare, embedded(1, "vector", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn search_returns_nearest_first() {
        let store = InMemoryStore::default();
        store.ensure_collection(2).await.unwrap();
        store
            .upsert(&[
                embedded(0, "useState is a React hook", vec![1.0, 0.1]),
                embedded(1, "useEffect runs after render", vec![0.2, 1.0]),
                embedded(2, "Props are read-only", vec![0.0, -1.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "useState is a React hook");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn delete_collection_clears_points() {
        let store = InMemoryStore::default();
        store.ensure_collection(1).await.unwrap();
        store.upsert(&[embedded(0, "a", vec![1.0])]).await.unwrap();
        store.delete_collection().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!store.collection_exists().await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryStore::default();
        let other = store.clone();
        store.ensure_collection(1).await.unwrap();
        assert!(other.collection_exists().await.unwrap());
    }
}
