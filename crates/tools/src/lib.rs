//! Tool implementations for askpdf.
//!
//! There is one tool, `ask_pdf`, which answers a question with the most
//! relevant passages of the indexed PDF. The registry is built once at
//! startup and never changes afterwards.

pub mod ask_pdf;

pub use ask_pdf::AskPdfTool;

use askpdf_core::tool::ToolRegistry;

/// Create the registry the agent dispatches `action` steps against.
pub fn default_registry(ask_pdf: AskPdfTool) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ask_pdf));
    registry
}
