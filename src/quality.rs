//! Quality gate for provider-produced recipes.
//!
//! [`QualityAssessor::assess`] is a pure, deterministic weighted score over
//! five factors. Fallback output is never scored.

use serde::{Deserialize, Serialize};

use crate::types::{GenerationRequest, Recipe};

/// Minimum score for a provider recipe to be accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

const WEIGHT_INGREDIENTS: f64 = 0.30;
const WEIGHT_CLARITY: f64 = 0.25;
const WEIGHT_NUTRITION: f64 = 0.20;
const WEIGHT_CREATIVITY: f64 = 0.15;
const WEIGHT_FEASIBILITY: f64 = 0.10;

/// Average step length bounds (exclusive), in characters.
const MIN_STEP_CHARS: f64 = 30.0;
const MAX_STEP_CHARS: f64 = 200.0;

/// Per-factor scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityFactors {
    pub ingredient_utilization: f64,
    pub instruction_clarity: f64,
    pub nutritional_balance: f64,
    pub creativity: f64,
    pub feasibility: f64,
}

/// Result of assessing one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Weighted composite, capped at 1.0.
    pub score: f64,
    pub factors: QualityFactors,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

impl QualityScore {
    pub fn passes(&self, threshold: f64) -> bool {
        self.score >= threshold
    }
}

/// Scores recipes against the request that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityAssessor {
    threshold: f64,
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl QualityAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `score` clears this assessor's threshold.
    pub fn accepts(&self, score: &QualityScore) -> bool {
        score.passes(self.threshold)
    }

    pub fn assess(&self, recipe: &Recipe, request: &GenerationRequest) -> QualityScore {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        let utilization = ingredient_utilization(recipe, request);
        if utilization < 0.3 {
            issues.push("Low utilization of provided ingredients".to_owned());
            suggestions.push("Build the recipe around more of the requested ingredients".to_owned());
        }
        let ingredient_score = (utilization * 1.2).min(1.0);

        let avg_len = recipe.average_instruction_len();
        let clarity = if avg_len > MIN_STEP_CHARS && avg_len < MAX_STEP_CHARS {
            1.0
        } else {
            if avg_len <= MIN_STEP_CHARS {
                issues.push("Instructions too brief".to_owned());
                suggestions.push("Add detail, timings and visual cues to each step".to_owned());
            } else {
                issues.push("Instructions too verbose".to_owned());
                suggestions.push("Split long steps into shorter, single-action steps".to_owned());
            }
            0.7
        };

        let nutrition = nutritional_balance(recipe);
        let creativity = creativity(recipe);

        let feasibility = if recipe.total_time <= request.max_time_or_default() {
            1.0
        } else {
            issues.push("Total time exceeds the requested maximum".to_owned());
            suggestions.push("Shorten cooking steps or pick faster techniques".to_owned());
            0.6
        };

        let factors = QualityFactors {
            ingredient_utilization: ingredient_score,
            instruction_clarity: clarity,
            nutritional_balance: nutrition,
            creativity,
            feasibility,
        };
        let score = (factors.ingredient_utilization * WEIGHT_INGREDIENTS
            + factors.instruction_clarity * WEIGHT_CLARITY
            + factors.nutritional_balance * WEIGHT_NUTRITION
            + factors.creativity * WEIGHT_CREATIVITY
            + factors.feasibility * WEIGHT_FEASIBILITY)
            .min(1.0);

        QualityScore {
            score,
            factors,
            issues,
            suggestions,
        }
    }
}

/// Fraction of recipe ingredients that match a requested one (substring
/// match in either direction, case-insensitive). Blank names never match.
fn ingredient_utilization(recipe: &Recipe, request: &GenerationRequest) -> f64 {
    if recipe.ingredients.is_empty() {
        return 0.0;
    }
    let requested: Vec<String> = request
        .ingredients
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .collect();
    let matched = recipe
        .ingredients
        .iter()
        .filter(|ingredient| {
            let name = ingredient.name.trim().to_lowercase();
            !name.is_empty()
                && requested
                    .iter()
                    .any(|r| name.contains(r.as_str()) || r.contains(name.as_str()))
        })
        .count();
    matched as f64 / recipe.ingredients.len() as f64
}

/// 1.0 when macro calories land within 20% of stated calories.
fn nutritional_balance(recipe: &Recipe) -> f64 {
    let Some(n) = &recipe.nutrition else {
        return 0.8;
    };
    if n.calories <= 0.0 {
        return 0.8;
    }
    let ratio = (n.protein * 4.0 + n.carbs * 4.0 + n.fat * 9.0) / n.calories;
    if (ratio - 1.0).abs() <= 0.2 { 1.0 } else { 0.8 }
}

fn creativity(recipe: &Recipe) -> f64 {
    let tagged = recipe.tags.iter().any(|t| t.eq_ignore_ascii_case("creative"));
    if tagged || recipe.title.to_lowercase().contains("fusion") {
        0.9
    } else {
        0.8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Instruction, Nutrition, RecipeIngredient};

    fn request() -> GenerationRequest {
        GenerationRequest::new(["chicken", "rice"], "asian", 2)
    }

    fn recipe(steps: &[&str]) -> Recipe {
        Recipe {
            id: "r".into(),
            title: "Chicken Fried Rice".into(),
            description: String::new(),
            cuisine: "asian".into(),
            servings: 2,
            prep_time: 10,
            cook_time: 20,
            total_time: 30,
            difficulty: Difficulty::Easy,
            ingredients: vec![
                RecipeIngredient::new("Chicken thighs"),
                RecipeIngredient::new("rice"),
            ],
            instructions: steps
                .iter()
                .enumerate()
                .map(|(i, s)| Instruction::new(i as u32 + 1, *s))
                .collect(),
            nutrition: Some(Nutrition {
                calories: 500.0,
                protein: 30.0,
                carbs: 60.0,
                fat: 15.0,
                ..Nutrition::default()
            }),
            dietary_info: vec![],
            tips: vec![],
            tags: vec![],
            rating: 0.0,
            review_count: 0,
        }
    }

    const GOOD_STEP: &str = "Rinse the rice twice and cook it in salted water for 15 minutes.";

    #[test]
    fn well_formed_recipe_scores_high() {
        let score = QualityAssessor::new().assess(&recipe(&[GOOD_STEP, GOOD_STEP]), &request());
        assert_eq!(score.factors.ingredient_utilization, 1.0);
        assert_eq!(score.factors.instruction_clarity, 1.0);
        assert_eq!(score.factors.nutritional_balance, 1.0);
        assert_eq!(score.factors.creativity, 0.8);
        assert_eq!(score.factors.feasibility, 1.0);
        assert!((score.score - 0.97).abs() < 1e-9);
        assert!(score.issues.is_empty());
    }

    #[test]
    fn brief_instructions_are_flagged() {
        // Average length of exactly 10 characters.
        let score = QualityAssessor::new().assess(&recipe(&["Cook rice.", "Fry chick."]), &request());
        assert_eq!(score.factors.instruction_clarity, 0.7);
        assert!(score.issues.iter().any(|i| i == "Instructions too brief"));
    }

    #[test]
    fn verbose_instructions_are_flagged() {
        let long = "x".repeat(250);
        let score = QualityAssessor::new().assess(&recipe(&[&long]), &request());
        assert_eq!(score.factors.instruction_clarity, 0.7);
        assert!(score.issues.iter().any(|i| i == "Instructions too verbose"));
    }

    #[test]
    fn clarity_bounds_are_exclusive() {
        let exactly_30 = "a".repeat(30);
        let score = QualityAssessor::new().assess(&recipe(&[&exactly_30]), &request());
        assert_eq!(score.factors.instruction_clarity, 0.7);
    }

    #[test]
    fn unrelated_ingredients_lower_utilization() {
        let mut r = recipe(&[GOOD_STEP]);
        r.ingredients = vec![
            RecipeIngredient::new("beef"),
            RecipeIngredient::new("potato"),
            RecipeIngredient::new("carrot"),
            RecipeIngredient::new("rice"),
        ];
        let score = QualityAssessor::new().assess(&r, &request());
        assert!((score.factors.ingredient_utilization - 0.3).abs() < 1e-9);
        assert!(score.issues.iter().any(|i| i.contains("utilization")));
    }

    #[test]
    fn missing_nutrition_and_slow_recipes_lose_points() {
        let mut r = recipe(&[GOOD_STEP]);
        r.nutrition = None;
        r.total_time = 90;
        let score = QualityAssessor::new().assess(&r, &request().max_time(45));
        assert_eq!(score.factors.nutritional_balance, 0.8);
        assert_eq!(score.factors.feasibility, 0.6);
    }

    #[test]
    fn fusion_titles_and_creative_tags_score_creativity() {
        let mut r = recipe(&[GOOD_STEP]);
        r.title = "Korean-Mexican Fusion Bowl".into();
        assert_eq!(QualityAssessor::new().assess(&r, &request()).factors.creativity, 0.9);
        r.title = "Bowl".into();
        r.tags = vec!["Creative".into()];
        assert_eq!(QualityAssessor::new().assess(&r, &request()).factors.creativity, 0.9);
    }

    #[test]
    fn blank_names_never_count_as_matches() {
        let assessor = QualityAssessor::new();
        let blank_request = GenerationRequest::new(["", "  ", "tofu"], "asian", 2);
        let score = assessor.assess(&recipe(&[GOOD_STEP]), &blank_request);
        assert_eq!(score.factors.ingredient_utilization, 0.0);

        let mut r = recipe(&[GOOD_STEP]);
        r.ingredients = vec![RecipeIngredient::new(""), RecipeIngredient::new("beef")];
        let score = assessor.assess(&r, &request());
        assert_eq!(score.factors.ingredient_utilization, 0.0);
        assert!(score.issues.iter().any(|i| i.contains("Low utilization")));
    }

    #[test]
    fn assessment_is_deterministic() {
        let assessor = QualityAssessor::new();
        let r = recipe(&["Cook rice.", GOOD_STEP]);
        assert_eq!(assessor.assess(&r, &request()), assessor.assess(&r, &request()));
    }

    #[test]
    fn threshold_is_inclusive() {
        let assessor = QualityAssessor::new();
        let mut score = assessor.assess(&recipe(&[GOOD_STEP]), &request());
        score.score = DEFAULT_THRESHOLD;
        assert!(assessor.accepts(&score));
        score.score = 0.59;
        assert!(!assessor.accepts(&score));
    }
}
