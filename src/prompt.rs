//! User prompts sent to providers.
//!
//! The system instruction and output schema live in
//! [`providers::schema`](crate::providers::schema); these prompts only carry
//! the request-specific content.

use std::fmt::Write;

use crate::Result;
use crate::types::{EnhancementKind, GenerationRequest, Recipe};

/// Prompt for a new recipe.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Create a {} recipe for {} servings using these ingredients: {}.",
        request.cuisine,
        request.servings,
        request.ingredients.join(", ")
    );
    let prefs = &request.preferences;
    let _ = write!(
        prompt,
        "\nThe total time must not exceed {} minutes.",
        request.max_time_or_default()
    );
    if let Some(difficulty) = prefs.difficulty {
        let _ = write!(prompt, "\nTarget difficulty: {}.", difficulty.as_str());
    }
    if !prefs.dietary.is_empty() {
        let _ = write!(
            prompt,
            "\nDietary requirements: {}.",
            prefs.dietary.join(", ")
        );
    }
    if let Some(context) = prefs.context.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = write!(prompt, "\nAdditional context: {context}");
    }
    prompt.push_str("\nYou may add common pantry staples (oil, salt, spices) as needed.");
    prompt
}

/// Prompt for improving an existing recipe.
pub fn build_enhancement_prompt(
    recipe: &Recipe,
    kind: EnhancementKind,
    feedback: Option<&str>,
) -> Result<String> {
    let current = serde_json::to_string_pretty(recipe)?;
    let mut prompt = format!(
        "Improve the following recipe.\n{}\n\nCurrent recipe:\n{current}",
        kind.directive()
    );
    if let Some(feedback) = feedback.filter(|f| !f.trim().is_empty()) {
        let _ = write!(prompt, "\n\nUser feedback to address: {feedback}");
    }
    prompt.push_str("\n\nReturn the complete improved recipe.");
    Ok(prompt)
}
