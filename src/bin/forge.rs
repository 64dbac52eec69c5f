//! forge: recipe-forge command-line interface
//!
//! Generates and enhances recipes through the same pipeline library callers
//! use: rate limiting, cache, provider, quality gate and fallback.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use recipe_forge::config::ProviderConfig;
use recipe_forge::{
    Difficulty, EnhancementKind, ForgeConfig, GenerationRequest, ProviderKind, Recipe,
    RecipeForge, RecipeGenerator,
};

/// recipe-forge CLI
#[derive(Parser)]
#[command(name = "forge")]
#[command(version)]
#[command(about = "Cached, rate-limited, quality-gated recipe generation")]
struct Args {
    /// Path to config file (default: ~/.recipe-forge/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Provider to use, overriding the config file ("anthropic" or "openai")
    #[arg(short, long)]
    provider: Option<ProviderKind>,

    /// API key (default: from config file or the provider's environment variable)
    #[arg(long, requires = "provider")]
    api_key: Option<String>,

    /// Model override
    #[arg(short, long)]
    model: Option<String>,

    /// Serve everything from the local fallback generator
    #[arg(long)]
    no_ai: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a recipe from ingredients
    Generate {
        /// Ingredient names
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// Cuisine tag
        #[arg(long, default_value = "international")]
        cuisine: String,
        /// Number of servings
        #[arg(long, default_value_t = 2)]
        servings: u32,
        /// Maximum total time in minutes
        #[arg(long)]
        max_time: Option<u32>,
        /// Preferred difficulty (easy, medium, hard)
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Dietary flag (repeatable)
        #[arg(long = "dietary")]
        dietary: Vec<String>,
        /// Free-form context for the model
        #[arg(long)]
        context: Option<String>,
        /// Caller identity for rate limiting
        #[arg(long, default_value = "cli")]
        caller: String,
    },

    /// Enhance an existing recipe
    Enhance {
        /// Recipe JSON file (or omit to read from stdin)
        file: Option<PathBuf>,
        /// add-tips, create-variations, improve-instructions, optimize-nutrition
        #[arg(short, long)]
        kind: EnhancementKind,
        /// Feedback for the model
        #[arg(short, long)]
        feedback: Option<String>,
    },

    /// Probe the configured provider
    Health,

    /// Show remaining budget and configuration for a caller
    Stats {
        #[arg(long, default_value = "cli")]
        caller: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let forge = build_generator(&args)?;

    match args.command {
        Command::Generate {
            ingredients,
            cuisine,
            servings,
            max_time,
            difficulty,
            dietary,
            context,
            caller,
        } => {
            let mut request = GenerationRequest::new(ingredients, cuisine, servings);
            if let Some(minutes) = max_time {
                request = request.max_time(minutes);
            }
            if let Some(difficulty) = difficulty {
                request = request.difficulty(difficulty);
            }
            for flag in dietary {
                request = request.dietary(flag);
            }
            if let Some(context) = context {
                request = request.context(context);
            }
            let result = forge.generate_recipe(&request, &caller).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }

        Command::Enhance {
            file,
            kind,
            feedback,
        } => {
            let recipe: Recipe = serde_json::from_str(&read_input(file)?)?;
            let result = forge.enhance(&recipe, kind, feedback.as_deref()).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }

        Command::Health => {
            let name = forge.provider_name().unwrap_or("none");
            let healthy = forge.check_health().await;
            println!("provider: {name}");
            println!("status: {}", if healthy { "healthy" } else { "unhealthy" });
            if !healthy {
                std::process::exit(1);
            }
        }

        Command::Stats { caller } => {
            let stats = forge.usage_stats(&caller).await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn build_generator(args: &Args) -> Result<RecipeGenerator, Box<dyn std::error::Error>> {
    let mut config = ForgeConfig::load_or_default(args.config.as_deref())?;
    if let Some(kind) = args.provider {
        let existing = config.provider.take().filter(|p| p.kind == kind);
        config.provider = Some(ProviderConfig {
            kind,
            api_key: args
                .api_key
                .clone()
                .or_else(|| existing.as_ref().and_then(|p| p.api_key.clone())),
            model: existing.as_ref().and_then(|p| p.model.clone()),
            base_url: existing.as_ref().and_then(|p| p.base_url.clone()),
            timeout_secs: existing.as_ref().map_or(30, |p| p.timeout_secs),
        });
    }
    if let (Some(model), Some(provider)) = (&args.model, config.provider.as_mut()) {
        provider.model = Some(model.clone());
    }
    if args.no_ai {
        config.features.ai_enabled = false;
    }
    Ok(RecipeForge::from_config(&config).build()?)
}

/// Read from the given file, or from stdin when none is given.
fn read_input(file: Option<PathBuf>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    if io::stdin().is_terminal() {
        return Err("enhance: no input provided (pass a recipe file or pipe JSON via stdin)".into());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
