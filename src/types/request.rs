//! Generation request types.

use serde::{Deserialize, Serialize};

use super::recipe::Difficulty;

/// Default ceiling on total cooking time when the caller states none.
pub const DEFAULT_MAX_TIME_MINUTES: u32 = 120;

/// A request for a new recipe.
///
/// Immutable once submitted: it is both the generation input and the basis
/// of the cache [`Fingerprint`](crate::cache::Fingerprint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Ingredient names, in the order the caller listed them.
    pub ingredients: Vec<String>,
    /// Cuisine tag (e.g. "asian", "italian").
    pub cuisine: String,
    /// Number of servings.
    pub servings: u32,
    /// Optional preferences.
    #[serde(default)]
    pub preferences: Preferences,
}

impl GenerationRequest {
    /// Create a request with default preferences.
    pub fn new<I, S>(ingredients: I, cuisine: impl Into<String>, servings: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            cuisine: cuisine.into(),
            servings,
            preferences: Preferences::default(),
        }
    }

    /// Set the maximum total time in minutes.
    pub fn max_time(mut self, minutes: u32) -> Self {
        self.preferences.max_time = Some(minutes);
        self
    }

    /// Set the preferred difficulty.
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.preferences.difficulty = Some(difficulty);
        self
    }

    /// Add a dietary flag (e.g. "vegetarian", "gluten-free").
    pub fn dietary(mut self, flag: impl Into<String>) -> Self {
        self.preferences.dietary.push(flag.into());
        self
    }

    /// Set free-form context for the provider.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.preferences.context = Some(context.into());
        self
    }

    /// Maximum total time the caller will accept, in minutes.
    pub fn max_time_or_default(&self) -> u32 {
        self.preferences
            .max_time
            .unwrap_or(DEFAULT_MAX_TIME_MINUTES)
    }
}

/// Optional preference bag attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Maximum total time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u32>,
    /// Preferred difficulty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Dietary flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary: Vec<String>,
    /// Free-form context passed through to the provider prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}
