//! # askpdf Core
//!
//! Domain types, traits, and error definitions for askpdf.
//! This crate has no HTTP or storage dependencies: it defines the domain
//! model that every other crate implements against.
//!
//! ## Layout
//!
//! - [`message`]: role-tagged messages and the conversation transcript
//! - [`step`]: the JSON step record the model answers with
//! - [`provider`]: chat completion + embedding backends
//! - [`tool`]: tools the model may call, and the registry that dispatches them
//! - [`store`]: vector store abstraction over indexed chunks

pub mod error;
pub mod message;
pub mod provider;
pub mod step;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
pub use step::{Step, StepRecord};
pub use store::{Chunk, ChunkMetadata, ScoredChunk, VectorStore};
pub use tool::{Tool, ToolRegistry};
