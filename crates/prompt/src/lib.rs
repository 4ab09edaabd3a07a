//! Prompt system for Sanad.
//!
//! - YAML prompt definitions with workspace overrides
//! - A built-in grounded-answer prompt
//! - Handlebars rendering of the system message

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::build_prompt;
pub use loader::{
    default_answer_prompt, list_prompts, load_prompt, load_prompt_or_default,
    DEFAULT_ANSWER_PROMPT_ID,
};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptOutputSpec};
