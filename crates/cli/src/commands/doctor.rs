//! `askpdf doctor`: diagnose configuration and connectivity.

use askpdf_config::AppConfig;
use askpdf_core::Provider;
use std::path::Path;
use std::time::Duration;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 askpdf Doctor: System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before the other checks can run.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
        match askpdf_providers::build_from_config(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Model API reachable at {}", provider.base_url()),
                Ok(false) => {
                    println!("  ⚠️  Model API at {} answered with an error", provider.base_url());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Model API check failed: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Provider setup failed: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ⚠️  No API key configured. Set OPENAI_API_KEY in the environment or .env");
        issues += 1;
    }

    let pdf_path = &config.ingest.pdf_path;
    if pdf_path.is_file() {
        println!("  ✅ PDF found: {}", pdf_path.display());
    } else {
        println!("  ⚠️  PDF not found: {}", pdf_path.display());
        issues += 1;
    }

    match askpdf_store::build_from_config(
        &config.store,
        Duration::from_secs(config.model.timeout_secs),
    ) {
        Ok(store) => match store.count().await {
            Ok(0) => {
                println!(
                    "  ⚠️  Collection '{}' is empty. Run `askpdf ingest`",
                    store.collection()
                );
                issues += 1;
            }
            Ok(points) => println!(
                "  ✅ Collection '{}' holds {points} points",
                store.collection()
            ),
            Err(e) => {
                println!("  ❌ Vector store check failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Vector store setup failed: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
