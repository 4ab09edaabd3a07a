//! Prompt builder: renders a definition's template into a system message.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use sanad_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a system message from a definition and template variables.
///
/// The answer prompt expects a `context` variable holding the formatted
/// grounding block.
///
/// # Example
/// ```no_run
/// use sanad_prompt::{build_prompt, default_answer_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = default_answer_prompt()?;
/// let mut vars = HashMap::new();
/// vars.insert("context".to_string(), "NO_RELEVANT_DATA".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("System: {}", built.system);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let system = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(system, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Record text is plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
