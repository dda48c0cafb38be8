//! `ask_pdf`: retrieve the passages of the indexed PDF closest to a question.

use askpdf_core::error::ToolError;
use askpdf_core::tool::Tool;
use askpdf_core::{EmbeddingRequest, Provider, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub const NAME: &str = "ask_pdf";
pub const DESCRIPTION: &str = "Takes a question and answers it using the uploaded PDF data.";

/// Separator between retrieved passages.
const PASSAGE_SEPARATOR: &str = "\n\n";

pub struct AskPdfTool {
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    top_k: usize,
}

impl AskPdfTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            embedding_model: embedding_model.into(),
            top_k: 4,
        }
    }

    /// Number of passages to retrieve (default 4).
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    fn failed(reason: impl ToString) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: NAME.into(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Tool for AskPdfTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        info!(tool = NAME, question = %input, "🔨 Tool Called: ask_pdf");

        let question = input.trim();
        if question.is_empty() {
            return Err(ToolError::InvalidInput("ask_pdf needs a non-empty question".into()));
        }

        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![question.to_string()],
            })
            .await
            .map_err(Self::failed)?;

        let vector = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Self::failed("embedding service returned no vector"))?;

        let hits = self
            .store
            .search(&vector, self.top_k)
            .await
            .map_err(Self::failed)?;

        debug!(
            tool = NAME,
            collection = %self.store.collection(),
            hits = hits.len(),
            "Retrieved passages"
        );

        Ok(hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR))
    }
}
