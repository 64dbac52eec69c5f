//! The recipe output schema, defined once.
//!
//! [`RECIPE_SCHEMA`] drives both sides of the provider contract: the default
//! system prompt describes it to the model, and the parser uses it to decide
//! which fields are mandatory.

use std::fmt::Write;

/// One top-level field of the recipe JSON object.
#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    /// JSON key (camelCase).
    pub name: &'static str,
    /// Shape shown to the model.
    pub shape: &'static str,
    /// Missing or empty ⇒ the response is rejected.
    pub required: bool,
}

/// Fields the model is asked to produce.
///
/// Bookkeeping fields (`id`, `rating`, `reviewCount`) are not listed;
/// the parser fills them.
pub const RECIPE_SCHEMA: &[SchemaField] = &[
    SchemaField {
        name: "title",
        shape: "string",
        required: true,
    },
    SchemaField {
        name: "description",
        shape: "string",
        required: false,
    },
    SchemaField {
        name: "cuisine",
        shape: "string",
        required: false,
    },
    SchemaField {
        name: "servings",
        shape: "number",
        required: false,
    },
    SchemaField {
        name: "prepTime",
        shape: "number (minutes)",
        required: false,
    },
    SchemaField {
        name: "cookTime",
        shape: "number (minutes)",
        required: false,
    },
    SchemaField {
        name: "totalTime",
        shape: "number (minutes)",
        required: false,
    },
    SchemaField {
        name: "difficulty",
        shape: r#""easy" | "medium" | "hard""#,
        required: false,
    },
    SchemaField {
        name: "ingredients",
        shape: r#"[{ "name": string, "amount": number, "unit": string, "notes": string }]"#,
        required: true,
    },
    SchemaField {
        name: "instructions",
        shape: r#"[{ "step": number, "instruction": string, "duration": number (minutes) }]"#,
        required: true,
    },
    SchemaField {
        name: "nutrition",
        shape: r#"{ "calories": number, "protein": number, "carbs": number, "fat": number, "fiber": number, "sugar": number, "sodium": number }"#,
        required: false,
    },
    SchemaField {
        name: "dietaryInfo",
        shape: "[string]",
        required: false,
    },
    SchemaField {
        name: "tips",
        shape: "[string]",
        required: false,
    },
    SchemaField {
        name: "tags",
        shape: "[string]",
        required: false,
    },
];

/// Names of the mandatory fields.
pub fn required_fields() -> impl Iterator<Item = &'static str> {
    RECIPE_SCHEMA.iter().filter(|f| f.required).map(|f| f.name)
}

/// Render the schema as a JSON-like outline for prompts.
pub fn describe() -> String {
    let mut out = String::from("{\n");
    for field in RECIPE_SCHEMA {
        let marker = if field.required { " (required)" } else { "" };
        let _ = writeln!(out, "  \"{}\": {}{marker},", field.name, field.shape);
    }
    out.push('}');
    out
}

/// System instruction used when a call does not override it.
pub fn default_system_prompt() -> String {
    format!(
        "You are a professional chef and recipe developer. Create practical, \
         delicious recipes that home cooks can follow. Use the ingredients you \
         are given, respect every dietary restriction, and keep timings \
         realistic.\n\n\
         Respond with a single JSON object and nothing else, matching this \
         schema:\n{}",
        describe()
    )
}
