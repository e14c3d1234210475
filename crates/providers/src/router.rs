//! Generator selection: builds the configured backend.

use crate::openai_compat::OpenAiCompatGenerator;
use async_trait::async_trait;
use skimmer_config::AppConfig;
use skimmer_core::error::GenerationError;
use skimmer_core::generator::{GenerationRequest, Generator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Stands in when no usable backend could be configured.
///
/// Every call fails with [`GenerationError::NotConfigured`], which turns into
/// an apology reply, so the service still records conversations and explains
/// what is missing instead of refusing to start.
pub struct UnconfiguredGenerator {
    reason: String,
}

impl UnconfiguredGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Generator for UnconfiguredGenerator {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured(self.reason.clone()))
    }
}

/// Build the generator named in the config.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Generator> {
    match try_build(config) {
        Ok(generator) => {
            info!(
                provider = %generator.name(),
                model = %config.provider.model,
                "Generator ready"
            );
            Arc::new(generator)
        }
        Err(reason) => {
            warn!(provider = %config.provider.name, "{reason}");
            Arc::new(UnconfiguredGenerator::new(reason))
        }
    }
}

fn try_build(config: &AppConfig) -> Result<OpenAiCompatGenerator, String> {
    let provider = &config.provider;

    let (name, base_url) = if let Some(url) = provider.name.strip_prefix("custom:") {
        ("custom", url.to_string())
    } else {
        let base_url = provider
            .api_url
            .clone()
            .or_else(|| default_base_url(&provider.name).map(String::from))
            .ok_or_else(|| {
                format!(
                    "Unknown provider '{}'. Set provider.api_url or use custom:<url>.",
                    provider.name
                )
            })?;
        (provider.name.as_str(), base_url)
    };

    let api_key = config.api_key.clone().unwrap_or_default();
    if api_key.is_empty() && requires_api_key(name) {
        return Err(format!(
            "No API key configured for '{name}'. Set SKIMMER_API_KEY or api_key in config.toml."
        ));
    }

    let generator = OpenAiCompatGenerator::new(
        name,
        base_url,
        api_key,
        Duration::from_secs(provider.timeout_secs),
    )
    .map_err(|e| e.to_string())?
    .with_model(&provider.model)
    .with_temperature(provider.temperature)
    .with_max_tokens(provider.max_tokens);

    Ok(generator)
}

/// Local servers accept requests without a key.
fn requires_api_key(provider_name: &str) -> bool {
    !matches!(
        provider_name,
        "ollama" | "vllm" | "llamacpp" | "llama.cpp" | "custom"
    )
}

/// The base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<&'static str> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "mistral" => "https://api.mistral.ai/v1",
        "ollama" => "http://localhost:11434/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}
