//! Remote model provider implementations.

pub mod mock;
pub mod ollama;
pub mod openrouter;

pub use mock::MockLlmClient;
pub use ollama::OllamaClient;
pub use openrouter::OpenRouterClient;
