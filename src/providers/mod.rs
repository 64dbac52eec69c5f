//! Recipe providers and the collaborators around them.
//!
//! - [`HostedProvider`]: Anthropic / OpenAI clients over `reqwest`
//! - [`RetryingRecipeProvider`]: retry decorator for any provider
//! - [`BasicFallback`]: deterministic local generator
//! - [`schema`] and [`parse`]: the shared output contract

mod fallback;
mod hosted;
pub mod parse;
pub mod pricing;
mod retry;
pub mod schema;
mod traits;

pub use fallback::BasicFallback;
pub use hosted::{HostedProvider, ProviderKind};
pub use pricing::Pricing;
pub use retry::{RetryConfig, RetryingRecipeProvider};
pub use traits::{FallbackGenerator, ProviderResponse, RecipeProvider, UsageTracker};
