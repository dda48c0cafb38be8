//! Model provider implementations for askpdf.
//!
//! All providers implement the `askpdf_core::Provider` trait.
//! `build_from_config` turns the `[model]` section into a ready provider.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use askpdf_config::AppConfig;
use askpdf_core::error::ProviderError;
use std::time::Duration;

/// Build the configured provider.
///
/// Fails with `NotConfigured` when no API key was found in the config file,
/// `.env`, or the environment.
pub fn build_from_config(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "No API key found. Set OPENAI_API_KEY (or ASKPDF_API_KEY) in the environment or .env, \
             or api_key in ~/.askpdf/config.toml"
                .into(),
        )
    })?;

    OpenAiCompatProvider::with_timeout(
        &config.model.provider,
        &config.model.api_url,
        api_key,
        Duration::from_secs(config.model.timeout_secs),
    )
}
