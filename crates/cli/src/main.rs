//! askpdf CLI: the main entry point.
//!
//! Commands:
//! - `chat`   : Interactive question loop over the indexed PDF (default)
//! - `ingest` : Index the PDF into the vector store
//! - `doctor` : Diagnose configuration and connectivity

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "askpdf",
    about = "askpdf: ask questions about a PDF",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.askpdf/config.toml)
    #[arg(long, global = true, env = "ASKPDF_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the PDF
    Chat,

    /// Index the PDF into the vector store
    Ingest {
        /// Override the PDF path
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Drop and rebuild the collection even if it already has points
        #[arg(long)]
        force: bool,
    },

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the chat.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ingest { pdf, force } => commands::ingest::run(config, pdf, force).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
