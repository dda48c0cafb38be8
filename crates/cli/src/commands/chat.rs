//! `askpdf chat`: interactive questions over the indexed PDF.

use super::Runtime;
use askpdf_agent::{AgentLoop, ConsolePrinter, run_repl};
use askpdf_tools::{AskPdfTool, default_registry};
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::load(config_path)?;

    if let Some(report) = runtime.index_in_memory().await? {
        eprintln!(
            "  📄 Indexed {} pages ({} chunks) of {} in memory",
            report.pages, report.chunks, report.source
        );
    }

    let Runtime {
        config,
        provider,
        store,
    } = runtime;

    // An empty collection still lets the model answer, just without context.
    match store.count().await {
        Ok(0) => {
            eprintln!(
                "  ⚠️  Collection '{}' is empty. Run `askpdf ingest` first.",
                store.collection()
            );
        }
        Ok(points) => tracing::debug!(points, collection = %store.collection(), "Collection ready"),
        Err(e) => eprintln!("  ⚠️  Vector store check failed: {e}"),
    }

    let ask_pdf = AskPdfTool::new(provider.clone(), store, &config.model.embedding_model)
        .with_top_k(config.store.top_k);
    let tools = Arc::new(default_registry(ask_pdf));

    let agent = AgentLoop::new(
        provider,
        &config.model.chat_model,
        config.model.temperature,
        tools,
    )
    .with_max_steps(config.agent.max_steps)
    .with_max_tokens(config.model.max_tokens);

    let mut session = agent.new_session();
    let printer = ConsolePrinter::new(std::io::stdout());
    let input = BufReader::new(tokio::io::stdin());

    let stats = run_repl(&agent, &mut session, input, &printer).await?;

    tracing::info!(
        questions = stats.questions,
        answers = stats.answers,
        errors = stats.errors,
        cancelled = stats.cancelled,
        "Goodbye"
    );
    Ok(())
}
