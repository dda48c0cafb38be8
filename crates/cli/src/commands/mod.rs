pub mod chat;
pub mod doctor;
pub mod ingest;

use askpdf_config::{AppConfig, StoreBackend};
use askpdf_core::{Error, Provider, VectorStore};
use askpdf_ingest::{IngestReport, Ingestor, TextSplitter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Config, provider and store shared by every command.
pub struct Runtime {
    pub config: AppConfig,
    pub provider: Arc<dyn Provider>,
    pub store: Arc<dyn VectorStore>,
}

impl Runtime {
    pub fn load(config_path: Option<&Path>) -> Result<Self, Error> {
        let config = AppConfig::load(config_path)?;

        if !config.has_api_key() {
            eprintln!();
            eprintln!("  ERROR: No API key configured!");
            eprintln!();
            eprintln!("  Put it in a .env file next to the PDF:");
            eprintln!("    OPENAI_API_KEY=sk-...");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err(Error::config(
                "No API key found. See above for setup instructions.",
            ));
        }

        let provider = askpdf_providers::build_from_config(&config)?;
        let store = askpdf_store::build_from_config(
            &config.store,
            Duration::from_secs(config.model.timeout_secs),
        )?;

        Ok(Self {
            config,
            provider: Arc::new(provider),
            store,
        })
    }

    /// An ingestor using the `[ingest]` chunking and batch settings.
    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(
            self.provider.clone(),
            self.store.clone(),
            &self.config.model.embedding_model,
        )
        .with_splitter(TextSplitter::with_sizes(
            self.config.ingest.chunk_size,
            self.config.ingest.chunk_overlap,
        ))
        .with_batch_size(self.config.ingest.batch_size)
    }

    /// Index the configured PDF when the store lives in this process.
    ///
    /// An in-memory store starts empty on every run, so chat has to build
    /// it before the first question. Other backends are left alone.
    pub async fn index_in_memory(&self) -> Result<Option<IngestReport>, Error> {
        if self.config.store.backend != StoreBackend::InMemory {
            return Ok(None);
        }
        let report = self.ingestor().ingest(&self.config.ingest.pdf_path, false).await?;
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askpdf_core::error::{IngestError, ProviderError};
    use askpdf_core::{EmbeddingRequest, EmbeddingResponse, ProviderRequest, ProviderResponse};
    use askpdf_store::InMemoryStore;
    use std::path::PathBuf;

    /// Embeds every text as the same unit vector.
    struct FlatEmbedder;

    #[async_trait::async_trait]
    impl Provider for FlatEmbedder {
        fn name(&self) -> &str {
            "flat"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("chat not supported".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|_| vec![1.0, 0.0]).collect(),
                model: request.model,
                usage: None,
            })
        }
    }

    fn fixture_pdf() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../ingest/tests/fixtures/two_pages.pdf")
    }

    fn runtime(backend: StoreBackend, pdf_path: PathBuf) -> (Runtime, InMemoryStore) {
        let mut config = AppConfig::default();
        config.store.backend = backend;
        config.ingest.pdf_path = pdf_path;
        let store = InMemoryStore::default();
        let runtime = Runtime {
            config,
            provider: Arc::new(FlatEmbedder),
            store: Arc::new(store.clone()),
        };
        (runtime, store)
    }

    #[tokio::test]
    async fn in_memory_backend_is_indexed_before_chat() {
        let (runtime, store) = runtime(StoreBackend::InMemory, fixture_pdf());

        let report = runtime.index_in_memory().await.unwrap().unwrap();

        assert_eq!(report.pages, 2);
        assert!(report.points_written >= 2);
        assert_eq!(store.count().await.unwrap(), report.points_written);
    }

    #[tokio::test]
    async fn in_memory_backend_reports_missing_pdf() {
        let (runtime, _) = runtime(StoreBackend::InMemory, PathBuf::from("/nonexistent/react interview.pdf"));
        let err = runtime.index_in_memory().await.unwrap_err();
        assert!(matches!(err, Error::Ingest(IngestError::NotFound(_))));
    }

    #[tokio::test]
    async fn persistent_backend_is_not_reindexed() {
        let (runtime, store) = runtime(StoreBackend::Qdrant, fixture_pdf());
        assert!(runtime.index_in_memory().await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\ncollection = \"scratch\"\n").unwrap();

        // SAFETY: no other test in this binary reads these variables.
        unsafe {
            std::env::remove_var("ASKPDF_API_KEY");
            std::env::remove_var("OPENAI_API_KEY");
        }

        let err = Runtime::load(Some(&path)).err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }
}
