//! LLM provider factory.
//!
//! Resolves a provider name plus endpoint, secret and timeout into a ready
//! client behind `Arc<dyn LlmClient>`.

use std::sync::Arc;

use crate::client::LlmClient;
use crate::providers::{MockLlmClient, OllamaClient, OpenRouterClient};
use crate::types::ProviderType;
use sanad_core::{AppConfig, AppError, AppResult, ProviderConfig};

/// Transport timeout used when the provider table sets none.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Reply of the mock provider when none is configured.
pub const DEFAULT_MOCK_REPLY: &str = "This is a mock answer.";

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openrouter", "ollama", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by openrouter
/// * `timeout_secs` - Transport timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: u64,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::OpenRouter => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenRouter provider requires API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => OpenRouterClient::with_base_url(url, key, timeout_secs)?,
                None => OpenRouterClient::new(key, timeout_secs)?,
            };
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url, timeout_secs)?,
                None => OllamaClient::new(timeout_secs)?,
            };
            Ok(Arc::new(client))
        }
        ProviderType::Mock => Ok(Arc::new(MockLlmClient::new(DEFAULT_MOCK_REPLY))),
    }
}

/// Create the client for the active provider of an application config.
pub fn create_client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider_config = config.get_provider_config(&config.provider);

    if let Some(ProviderConfig::Mock { reply }) = &provider_config {
        return Ok(Arc::new(MockLlmClient::new(reply.clone())));
    }

    let endpoint = provider_config
        .as_ref()
        .and_then(|p| p.endpoint())
        .map(str::to_string);
    let timeout = provider_config
        .as_ref()
        .and_then(|p| p.timeout())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let api_key = config.resolve_api_key(&config.provider);

    tracing::debug!(
        provider = %config.provider,
        endpoint = ?endpoint,
        timeout,
        "Creating LLM client"
    );

    create_client(
        &config.provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        timeout,
    )
}
