//! Error types for the askpdf domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! `ToolError` and `StepError` never leave a turn: the agent loop turns them
//! into transcript messages, so they have no top-level variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all askpdf operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Vector store errors ---
    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    // --- Ingestion errors ---
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Vector store unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Vector store request failed: {message} (status: {status_code})")]
    RequestFailed { status_code: u16, message: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("PDF not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to extract text from {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    #[error("No text content in {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("Embedding count mismatch: sent {sent} chunks, got {received} vectors")]
    EmbeddingMismatch { sent: usize, received: usize },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Error)]
pub enum StepError {
    #[error("Reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Reply has no recognized 'step' tag: {0}")]
    UnknownStep(String),

    #[error("Action step is missing its 'function' field")]
    MissingFunction,
}
