//! Document ingestion for askpdf.
//!
//! Turns a PDF into embedded chunks in the vector store:
//! load pages, split them into overlapping chunks, embed in batches, upsert.

pub mod ingestor;
pub mod pdf;
pub mod splitter;

pub use ingestor::{IngestReport, Ingestor};
pub use pdf::{Page, load_pdf};
pub use splitter::{SplitterConfig, TextSplitter};
