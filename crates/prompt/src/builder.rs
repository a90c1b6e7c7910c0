//! Prompt builder for rendering system templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use lectern_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Template variable holding the rendered previous conversation.
pub const HISTORY_VAR: &str = "history";

/// Template variable holding formatted course content.
pub const SEARCH_RESULTS_VAR: &str = "searchResults";

/// Template variable set when a lookup ran and found nothing.
pub const SEARCH_EMPTY_VAR: &str = "searchEmpty";

/// Build a system prompt from a definition and input variables.
///
/// Variables the definition does not opt into through its `context` section
/// are dropped before rendering, so a template cannot pick up history or
/// course content it did not ask for.
///
/// # Example
/// ```no_run
/// use lectern_prompt::{build_prompt, load_builtin};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_builtin("assistant.native")?;
/// let mut vars = HashMap::new();
/// vars.insert("history".to_string(), "User: hi\nAssistant: hello".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("System prompt: {}", built.system);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    mut variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    if !definition.context.include_history {
        variables.remove(HISTORY_VAR);
    }
    if !definition.context.include_search_context {
        variables.remove(SEARCH_RESULTS_VAR);
        variables.remove(SEARCH_EMPTY_VAR);
    }

    let history_included = variables
        .get(HISTORY_VAR)
        .is_some_and(|h| !h.is_empty());
    let search_context_included =
        variables.contains_key(SEARCH_RESULTS_VAR) || variables.contains_key(SEARCH_EMPTY_VAR);

    let system = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        system,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            history_included,
            search_context_included,
            resolved_variables: variables,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
