//! Public types for the recipe-forge API.

mod enhancement;
mod lenient;
mod options;
mod recipe;
mod request;
mod result;
mod usage;

pub use enhancement::EnhancementKind;
pub use options::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, GenerationOptions};
pub use recipe::{Amount, Difficulty, Instruction, Nutrition, Recipe, RecipeIngredient};
pub use request::{DEFAULT_MAX_TIME_MINUTES, GenerationRequest, Preferences};
pub use result::{FailureKind, GenerationFailure, GenerationResult, ProviderStatus, UsageStats};
pub use usage::{TokenUsage, UsageMetadata};
