//! Remote model integration for Sanad.
//!
//! A provider-agnostic chat completion interface with three providers:
//! - **OpenRouter**: hosted models behind an OpenAI-compatible API (default)
//! - **Ollama**: local runtime
//! - **Mock**: scripted replies for tests and offline runs
//!
//! # Example
//! ```no_run
//! use sanad_llm::{ChatMessage, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new(30)?;
//! let request = LlmRequest::new("llama3.2", vec![ChatMessage::user("Hello, world!")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, create_client_from_config};
pub use providers::{MockLlmClient, OllamaClient, OpenRouterClient};
pub use types::{ChatMessage, ProviderType, Role};
