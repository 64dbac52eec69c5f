//! Built-in deterministic fallback generator.

use async_trait::async_trait;

use super::traits::FallbackGenerator;
use crate::cache::Fingerprint;
use crate::types::{Difficulty, GenerationRequest, Instruction, Recipe, RecipeIngredient};

/// Assembles a plain one-pan recipe from the request alone.
///
/// Same request in, same recipe out; no I/O. Good enough to keep callers
/// served while the provider is down or disabled. Callers wanting richer
/// offline output inject their own [`FallbackGenerator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFallback;

impl BasicFallback {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, request: &GenerationRequest) -> Recipe {
        let cuisine = title_case(&request.cuisine);
        let names: Vec<String> = request.ingredients.iter().map(|i| title_case(i)).collect();
        let headline = match names.as_slice() {
            [] => "Pantry".to_owned(),
            [one] => one.clone(),
            [first, second, ..] => format!("{first} and {second}"),
        };

        let budget = request.max_time_or_default();
        let prep_time = 10.min(budget / 3);
        let cook_time = 20.min(budget.saturating_sub(prep_time));

        let listed = if request.ingredients.is_empty() {
            "your ingredients".to_owned()
        } else {
            request.ingredients.join(", ")
        };
        let steps = [
            format!("Wash, trim and cut {listed} into even, bite-sized pieces."),
            "Heat a tablespoon of oil in a large pan over medium-high heat.".to_owned(),
            format!(
                "Add the ingredients that take longest to cook first and cook for {} minutes, stirring often.",
                cook_time.max(1)
            ),
            format!("Season to taste with salt, pepper and your favourite {cuisine} spices."),
            format!("Divide between {} plates and serve hot.", request.servings.max(1)),
        ];

        let mut tags = vec!["quick".to_owned(), "fallback".to_owned()];
        if !request.cuisine.is_empty() {
            tags.push(request.cuisine.to_lowercase());
        }

        Recipe {
            id: format!("fallback-{}", &Fingerprint::of(request).as_str()[..16]),
            title: format!("Simple {cuisine} {headline} Skillet"),
            description: format!("A straightforward {cuisine} dish built around {listed}."),
            cuisine: request.cuisine.clone(),
            servings: request.servings,
            prep_time,
            cook_time,
            total_time: prep_time + cook_time,
            difficulty: Difficulty::Easy,
            ingredients: request
                .ingredients
                .iter()
                .map(RecipeIngredient::new)
                .collect(),
            instructions: steps
                .into_iter()
                .enumerate()
                .map(|(i, text)| Instruction::new(i as u32 + 1, text))
                .collect(),
            nutrition: None,
            dietary_info: request.preferences.dietary.clone(),
            tips: vec!["Taste and adjust the seasoning just before serving.".to_owned()],
            tags,
            rating: 0.0,
            review_count: 0,
        }
    }
}

#[async_trait]
impl FallbackGenerator for BasicFallback {
    async fn generate(&self, request: &GenerationRequest) -> Recipe {
        self.build(request)
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
