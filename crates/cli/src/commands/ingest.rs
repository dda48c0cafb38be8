//! `askpdf ingest`: index the PDF into the vector store.

use super::Runtime;
use askpdf_config::StoreBackend;
use std::path::{Path, PathBuf};

pub async fn run(
    config_path: Option<&Path>,
    pdf: Option<PathBuf>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::load(config_path)?;
    let config = &runtime.config;

    if config.store.backend == StoreBackend::InMemory {
        println!("  ⚠️  The in-memory store is discarded when this command exits.");
        println!("     `askpdf chat` indexes the PDF itself with this backend.");
        println!();
    }

    let pdf_path = pdf.unwrap_or_else(|| config.ingest.pdf_path.clone());

    println!("📄 Indexing {}", pdf_path.display());
    println!("   Collection: {} ({})", runtime.store.collection(), runtime.store.name());
    println!("   Embeddings: {}", config.model.embedding_model);
    println!();

    let report = runtime.ingestor().ingest(&pdf_path, force).await?;

    if report.skipped {
        println!(
            "  ⚠️  Collection '{}' already holds {} points, nothing to do.",
            report.collection, report.existing_points
        );
        println!("     Use `askpdf ingest --force` to rebuild it.");
        return Ok(());
    }

    println!("  ✅ Pages:   {}", report.pages);
    println!("  ✅ Chunks:  {}", report.chunks);
    println!(
        "  ✅ Written: {} points ({} dimensions)",
        report.points_written, report.dimension
    );
    println!();
    println!("  Indexing Of Documents Done...");

    Ok(())
}
