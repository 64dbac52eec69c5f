//! Turning raw provider text into a [`Recipe`].

use serde_json::Value;
use tracing::warn;

use super::schema;
use crate::types::Recipe;
use crate::{ForgeError, Result};

/// Return the first balanced `{...}` in `text`.
///
/// Tolerates prose around the object and braces inside JSON strings
/// (including escaped quotes). Returns `None` if no opening brace ever
/// balances.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&bytes[start..]) {
            return Some(&text[start..start + end]);
        }
        search_from = start + 1;
    }
    None
}

/// Length of the balanced object starting at `bytes[0] == b'{'`.
fn balanced_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a provider answer into a recipe.
///
/// Fails with [`ForgeError::Parse`] when no JSON object is present, the
/// object is malformed, or a required schema field is missing or empty.
/// Optional fields of the wrong type read as their defaults. Bookkeeping
/// fields are defaulted: a fresh `id` when none is given, `totalTime`
/// derived from prep + cook when zero, and step numbers assigned by
/// position when absent. Ratings are never taken from the provider.
pub fn parse_recipe(provider: &str, text: &str) -> Result<Recipe> {
    let parse_error = |message: String| {
        warn!(provider, error = %message, "provider response rejected by parser");
        ForgeError::Parse {
            provider: provider.to_owned(),
            message,
        }
    };

    let raw = extract_json_object(text)
        .ok_or_else(|| parse_error("no JSON object in response".to_owned()))?;
    let value: Value =
        serde_json::from_str(raw).map_err(|e| parse_error(format!("invalid JSON: {e}")))?;

    for field in schema::required_fields() {
        if is_blank(value.get(field)) {
            return Err(parse_error(format!("missing required field '{field}'")));
        }
    }

    let mut recipe: Recipe = serde_json::from_value(value)
        .map_err(|e| parse_error(format!("schema mismatch: {e}")))?;

    if recipe.id.is_empty() {
        recipe.id = uuid::Uuid::new_v4().to_string();
    }
    recipe.rating = 0.0;
    recipe.review_count = 0;
    if recipe.total_time == 0 {
        recipe.total_time = recipe.prep_time + recipe.cook_time;
    }
    for (i, step) in recipe.instructions.iter_mut().enumerate() {
        if step.step == 0 {
            step.step = i as u32 + 1;
        }
    }
    Ok(recipe)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
