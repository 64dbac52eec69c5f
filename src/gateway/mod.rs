//! The public generation gateway: builder and orchestrator

mod builder;
mod orchestrator;

pub use builder::{RecipeForge, RecipeForgeBuilder};
pub use orchestrator::{
    ENHANCE_TEMPERATURE, FALLBACK_PROVIDER, FALLBACK_RESPONSE_TIME_MS, RecipeGenerator,
};
