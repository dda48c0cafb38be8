//! The document ingestor: pages in, embedded points out.

use crate::pdf::{Page, load_pdf};
use crate::splitter::TextSplitter;
use askpdf_core::error::{Error, IngestError};
use askpdf_core::{Chunk, ChunkMetadata, EmbeddingRequest, Provider, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What an ingest run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    pub collection: String,
    pub pages: usize,
    pub chunks: usize,
    pub points_written: usize,
    /// Vector size of the collection (0 when skipped)
    pub dimension: usize,
    /// The collection already held points and `force` was not set
    pub skipped: bool,
    pub existing_points: usize,
}

/// Loads a PDF, chunks it, embeds the chunks, and upserts them.
pub struct Ingestor {
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    splitter: TextSplitter,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            embedding_model: embedding_model.into(),
            splitter: TextSplitter::default(),
            batch_size: 64,
        }
    }

    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Index the PDF at `path`.
    ///
    /// See [`Ingestor::ingest_pages`] for when the run is skipped.
    pub async fn ingest(&self, path: &Path, force: bool) -> Result<IngestReport, Error> {
        let source = path.display().to_string();
        let pages = load_pdf(path).await?;
        self.ingest_pages(&source, &pages, force).await
    }

    /// Index already-extracted pages under `source`.
    ///
    /// The run is skipped when the collection already holds at least as
    /// many points as the document has chunks. A partially written
    /// collection is completed in place: point ids are derived from the
    /// chunk position, so chunks written before are overwritten. `force`
    /// drops the collection and rebuilds it.
    pub async fn ingest_pages(
        &self,
        source: &str,
        pages: &[Page],
        force: bool,
    ) -> Result<IngestReport, Error> {
        let chunks = self.chunk_pages(source, pages);
        if chunks.is_empty() {
            return Err(IngestError::EmptyDocument(source.into()).into());
        }

        if force {
            if self.store.collection_exists().await? {
                info!(collection = %self.store.collection(), "Dropping collection for re-ingest");
                self.store.delete_collection().await?;
            }
        } else {
            let existing = self.store.count().await?;
            if existing >= chunks.len() {
                info!(
                    collection = %self.store.collection(),
                    existing,
                    chunks = chunks.len(),
                    "Collection already populated, skipping ingest"
                );
                return Ok(IngestReport {
                    source: source.to_string(),
                    collection: self.store.collection().to_string(),
                    pages: pages.len(),
                    chunks: chunks.len(),
                    skipped: true,
                    existing_points: existing,
                    ..IngestReport::default()
                });
            }
            if existing > 0 {
                warn!(
                    collection = %self.store.collection(),
                    existing,
                    chunks = chunks.len(),
                    "Collection is incomplete, re-indexing"
                );
            }
        }

        self.index_chunks(source, pages.len(), chunks).await
    }

    /// Split pages into chunks numbered across the whole document.
    pub fn chunk_pages(&self, source: &str, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            for text in self.splitter.split(&page.text) {
                let metadata = ChunkMetadata {
                    source: source.to_string(),
                    page: Some(page.number),
                    chunk_index: chunks.len(),
                };
                chunks.push(Chunk::new(text, metadata));
            }
        }
        chunks
    }

    async fn index_chunks(
        &self,
        source: &str,
        pages: usize,
        mut chunks: Vec<Chunk>,
    ) -> Result<IngestReport, Error> {
        info!(
            source,
            pages,
            chunks = chunks.len(),
            model = %self.embedding_model,
            "Embedding chunks"
        );

        let mut written = 0;
        let mut dimension = 0;

        for (batch_no, batch) in chunks.chunks_mut(self.batch_size).enumerate() {
            let inputs: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let response = self
                .provider
                .embed(EmbeddingRequest {
                    model: self.embedding_model.clone(),
                    inputs,
                })
                .await?;

            if response.embeddings.len() != batch.len() {
                return Err(IngestError::EmbeddingMismatch {
                    sent: batch.len(),
                    received: response.embeddings.len(),
                }
                .into());
            }

            for (chunk, embedding) in batch.iter_mut().zip(response.embeddings) {
                chunk.embedding = Some(embedding);
            }

            if batch_no == 0 {
                dimension = batch[0].embedding.as_ref().map_or(0, Vec::len);
                self.store.ensure_collection(dimension).await?;
            }

            written += self.store.upsert(batch).await?;
            debug!(batch = batch_no, written, "Upserted batch");
        }

        info!(
            collection = %self.store.collection(),
            points = written,
            dimension,
            "Ingest complete"
        );

        Ok(IngestReport {
            source: source.to_string(),
            collection: self.store.collection().to_string(),
            pages,
            chunks: chunks.len(),
            points_written: written,
            dimension,
            skipped: false,
            existing_points: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askpdf_core::error::ProviderError;
    use askpdf_core::{EmbeddingResponse, ProviderRequest, ProviderResponse};
    use askpdf_store::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as `[len, vowels, 1.0]` and counts calls.
    struct CountingEmbedder {
        calls: AtomicUsize,
        drop_last: bool,
        /// One-based call number that fails with a network error
        fail_on_call: Option<usize>,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), drop_last: false, fail_on_call: None }
        }

        fn failing_on(call: usize) -> Self {
            Self { fail_on_call: Some(call), ..Self::new() }
        }
    }

    #[async_trait]
    impl Provider for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("chat not supported".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on_call == Some(call) {
                return Err(ProviderError::Network("connection reset".into()));
            }
            let mut embeddings: Vec<Vec<f32>> = request
                .inputs
                .iter()
                .map(|t| {
                    let vowels = t.chars().filter(|c| "aeiou".contains(*c)).count();
                    vec![t.len() as f32, vowels as f32, 1.0]
                })
                .collect();
            if self.drop_last {
                embeddings.pop();
            }
            Ok(EmbeddingResponse {
                embeddings,
                model: request.model,
                usage: None,
            })
        }
    }

    fn pages() -> Vec<Page> {
        vec![
            Page { number: 0, text: "useState is a Hook that lets you add state to function components.".into() },
            Page { number: 1, text: "useEffect lets you synchronize a component with an external system.".into() },
        ]
    }

    fn ingestor(provider: Arc<CountingEmbedder>, store: Arc<InMemoryStore>) -> Ingestor {
        Ingestor::new(provider, store, "text-embedding-3-large")
            .with_splitter(TextSplitter::with_sizes(40, 10))
            .with_batch_size(2)
    }

    #[tokio::test]
    async fn indexes_pages_in_batches() {
        let provider = Arc::new(CountingEmbedder::new());
        let store = Arc::new(InMemoryStore::default());
        let report = ingestor(provider.clone(), store.clone())
            .ingest_pages("react interview.pdf", &pages(), false)
            .await
            .unwrap();

        assert!(!report.skipped);
        assert_eq!(report.pages, 2);
        assert!(report.chunks >= 4);
        assert_eq!(report.points_written, report.chunks);
        assert_eq!(report.dimension, 3);
        assert_eq!(store.count().await.unwrap(), report.chunks);
        assert_eq!(provider.calls.load(Ordering::SeqCst), report.chunks.div_ceil(2));
    }

    #[tokio::test]
    async fn chunk_metadata_tracks_page_and_index() {
        let provider = Arc::new(CountingEmbedder::new());
        let store = Arc::new(InMemoryStore::default());
        let chunks = ingestor(provider, store).chunk_pages("doc.pdf", &pages());

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.source, "doc.pdf");
        }
        assert_eq!(chunks.first().unwrap().metadata.page, Some(0));
        assert_eq!(chunks.last().unwrap().metadata.page, Some(1));
    }

    #[tokio::test]
    async fn populated_collection_is_skipped() {
        let provider = Arc::new(CountingEmbedder::new());
        let store = Arc::new(InMemoryStore::default());
        let ingestor = ingestor(provider.clone(), store.clone());

        let first = ingestor.ingest_pages("r.pdf", &pages(), false).await.unwrap();
        let calls_after_first = provider.calls.load(Ordering::SeqCst);

        let second = ingestor.ingest_pages("r.pdf", &pages(), false).await.unwrap();
        assert!(second.skipped);
        assert_eq!(second.existing_points, first.chunks);
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first);
    }

    #[tokio::test]
    async fn interrupted_ingest_is_completed_on_rerun() {
        let store = Arc::new(InMemoryStore::default());

        let err = ingestor(Arc::new(CountingEmbedder::failing_on(2)), store.clone())
            .ingest_pages("r.pdf", &pages(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Network(_))));
        let partial = store.count().await.unwrap();
        assert_eq!(partial, 2);

        let rerun = ingestor(Arc::new(CountingEmbedder::new()), store.clone())
            .ingest_pages("r.pdf", &pages(), false)
            .await
            .unwrap();
        assert!(!rerun.skipped);
        assert!(rerun.chunks > partial);
        assert_eq!(store.count().await.unwrap(), rerun.chunks);

        let third = ingestor(Arc::new(CountingEmbedder::new()), store.clone())
            .ingest_pages("r.pdf", &pages(), false)
            .await
            .unwrap();
        assert!(third.skipped);
    }

    #[tokio::test]
    async fn force_rebuilds_without_duplicates() {
        let provider = Arc::new(CountingEmbedder::new());
        let store = Arc::new(InMemoryStore::default());
        let ingestor = ingestor(provider, store.clone());

        let first = ingestor.ingest_pages("r.pdf", &pages(), false).await.unwrap();
        let forced = ingestor.ingest_pages("r.pdf", &pages()[..1], true).await.unwrap();

        assert!(!forced.skipped);
        assert!(forced.chunks < first.chunks);
        assert_eq!(store.count().await.unwrap(), forced.chunks);
    }

    #[tokio::test]
    async fn blank_pages_are_an_empty_document() {
        let provider = Arc::new(CountingEmbedder::new());
        let store = Arc::new(InMemoryStore::default());
        let blank = vec![Page { number: 0, text: "   \n\n ".into() }];
        let err = ingestor(provider, store)
            .ingest_pages("blank.pdf", &blank, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingest(IngestError::EmptyDocument(_))));
    }

    #[tokio::test]
    async fn short_embedding_batch_is_rejected() {
        let provider = Arc::new(CountingEmbedder { drop_last: true, ..CountingEmbedder::new() });
        let store = Arc::new(InMemoryStore::default());
        let err = ingestor(provider, store)
            .ingest_pages("r.pdf", &pages(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingest(IngestError::EmbeddingMismatch { .. })));
    }

    #[tokio::test]
    async fn missing_pdf_fails_before_embedding() {
        let provider = Arc::new(CountingEmbedder::new());
        let store = Arc::new(InMemoryStore::default());
        let err = ingestor(provider.clone(), store)
            .ingest(Path::new("/nonexistent/react interview.pdf"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingest(IngestError::NotFound(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
