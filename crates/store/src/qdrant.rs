//! Qdrant backend over the REST API.
//!
//! Points carry a `{page_content, metadata}` payload, the layout LangChain
//! writes, so collections built by either side are readable by the other.

use askpdf_core::error::StoreError;
use askpdf_core::store::{Chunk, ChunkMetadata, ScoredChunk, VectorStore};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A Qdrant collection reached over HTTP.
pub struct QdrantStore {
    base_url: String,
    collection: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl QdrantStore {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unreachable {
                url: base_url.clone(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url,
            collection: collection.into(),
            api_key: None,
            client,
        })
    }

    /// Authenticate with a Qdrant Cloud API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{}", self.base_url, self.collection, suffix)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        builder.send().await.map_err(|e| StoreError::Unreachable {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Turn a non-success response into a `StoreError`.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::CollectionNotFound(self.collection.clone()));
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::RequestFailed {
            status_code: status.as_u16(),
            message,
        })
    }

    async fn parse<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T, StoreError> {
        let envelope: QdrantResponse<T> = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn name(&self) -> &str {
        "qdrant"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn collection_exists(&self) -> Result<bool, StoreError> {
        let url = self.collection_url("");
        let response = self.send(self.request(reqwest::Method::GET, &url)).await?;
        match self.check(response).await {
            Ok(_) => Ok(true),
            Err(StoreError::CollectionNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn ensure_collection(&self, dimension: usize) -> Result<bool, StoreError> {
        let url = self.collection_url("");
        let response = self.send(self.request(reqwest::Method::GET, &url)).await?;

        match self.check(response).await {
            Ok(response) => {
                let info: CollectionInfo = Self::parse(response).await?;
                if let Some(size) = info.vector_size()
                    && size != dimension
                {
                    return Err(StoreError::DimensionMismatch {
                        expected: size,
                        actual: dimension,
                    });
                }
                Ok(false)
            }
            Err(StoreError::CollectionNotFound(_)) => {
                let body = serde_json::json!({
                    "vectors": { "size": dimension, "distance": "Cosine" }
                });
                let response = self
                    .send(self.request(reqwest::Method::PUT, &url).json(&body))
                    .await?;
                self.check(response).await?;
                info!(collection = %self.collection, dimension, "Created Qdrant collection");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_collection(&self) -> Result<(), StoreError> {
        let url = self.collection_url("");
        let response = self.send(self.request(reqwest::Method::DELETE, &url)).await?;
        match self.check(response).await {
            Ok(_) | Err(StoreError::CollectionNotFound(_)) => {
                info!(collection = %self.collection, "Dropped Qdrant collection");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert(&self, chunks: &[Chunk]) -> Result<usize, StoreError> {
        let points: Vec<PointStruct<'_>> = chunks.iter().filter_map(PointStruct::from_chunk).collect();
        if points.is_empty() {
            return Ok(0);
        }

        let url = self.collection_url("/points?wait=true");
        debug!(collection = %self.collection, count = points.len(), "Upserting points");

        let body = serde_json::json!({ "points": points });
        let response = self
            .send(self.request(reqwest::Method::PUT, &url).json(&body))
            .await?;
        self.check(response).await?;
        Ok(points.len())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let url = self.collection_url("/points/search");
        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .send(self.request(reqwest::Method::POST, &url).json(&body))
            .await?;
        let response = self.check(response).await?;
        let hits: Vec<ScoredPoint> = Self::parse(response).await?;

        debug!(collection = %self.collection, hits = hits.len(), "Qdrant search");
        Ok(hits.into_iter().map(ScoredPoint::into_scored_chunk).collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let url = self.collection_url("/points/count");
        let body = serde_json::json!({ "exact": true });
        let response = self
            .send(self.request(reqwest::Method::POST, &url).json(&body))
            .await?;
        match self.check(response).await {
            Ok(response) => {
                let result: CountResult = Self::parse(response).await?;
                Ok(result.count)
            }
            Err(StoreError::CollectionNotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

// --- Qdrant REST types (internal) ---

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    config: Option<CollectionConfig>,
}

#[derive(Debug, Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Debug, Deserialize)]
struct CollectionParams {
    /// Either `{size, distance}` or a map of named vectors.
    vectors: serde_json::Value,
}

impl CollectionInfo {
    /// Size of the unnamed vector, if the collection has one.
    fn vector_size(&self) -> Option<usize> {
        let vectors = &self.config.as_ref()?.params.vectors;
        vectors.get("size")?.as_u64().map(|s| s as usize)
    }
}

#[derive(Debug, Serialize)]
struct PointStruct<'a> {
    id: &'a str,
    vector: &'a [f32],
    payload: Payload,
}

impl<'a> PointStruct<'a> {
    fn from_chunk(chunk: &'a Chunk) -> Option<Self> {
        Some(Self {
            id: &chunk.id,
            vector: chunk.embedding.as_deref()?,
            payload: Payload {
                page_content: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
            },
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    #[serde(default)]
    page_content: String,
    #[serde(default)]
    metadata: ChunkMetadata,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    /// Qdrant IDs are unsigned integers or UUID strings.
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<Payload>,
}

impl ScoredPoint {
    fn into_scored_chunk(self) -> ScoredChunk {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let (text, metadata) = match self.payload {
            Some(p) => (p.page_content, p.metadata),
            None => (String::new(), ChunkMetadata::default()),
        };
        ScoredChunk {
            chunk: Chunk {
                id,
                text,
                metadata,
                embedding: None,
            },
            score: self.score,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: usize,
}
