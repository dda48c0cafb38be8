//! Vector store implementations for askpdf.
//!
//! Backends:
//! - `QdrantStore`: Qdrant over its REST API (default)
//! - `InMemoryStore`: process-local cosine search, for tests and offline use

pub mod in_memory;
pub mod qdrant;
pub mod vector;

pub use in_memory::InMemoryStore;
pub use qdrant::QdrantStore;

use askpdf_config::{StoreBackend, StoreConfig};
use askpdf_core::error::StoreError;
use askpdf_core::VectorStore;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured vector store.
pub fn build_from_config(
    config: &StoreConfig,
    timeout: Duration,
) -> Result<Arc<dyn VectorStore>, StoreError> {
    match config.backend {
        StoreBackend::Qdrant => {
            let store = QdrantStore::new(&config.url, &config.collection, timeout)?
                .with_api_key(config.api_key.clone());
            Ok(Arc::new(store))
        }
        StoreBackend::InMemory => Ok(Arc::new(InMemoryStore::new(&config.collection))),
    }
}
