//! The recipe artifact produced by providers and the fallback generator.

use serde::{Deserialize, Serialize};

use super::lenient;

/// A generated recipe.
///
/// Field names follow the JSON schema providers are asked to emit (see
/// [`schema`](crate::providers::schema)); bookkeeping fields (`id`,
/// `rating`, `review_count`) are never taken from provider output unless
/// present, and are defaulted by the parser otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub cuisine: String,
    #[serde(default, deserialize_with = "lenient::u32_or_default")]
    pub servings: u32,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient::u32_or_default")]
    pub prep_time: u32,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient::u32_or_default")]
    pub cook_time: u32,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient::u32_or_default")]
    pub total_time: u32,
    #[serde(default, deserialize_with = "lenient::difficulty_or_default")]
    pub difficulty: Difficulty,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<Instruction>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub nutrition: Option<Nutrition>,
    #[serde(default, deserialize_with = "lenient::strings_or_default")]
    pub dietary_info: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings_or_default")]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings_or_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::f32_or_default")]
    pub rating: f32,
    #[serde(default, deserialize_with = "lenient::u32_or_default")]
    pub review_count: u32,
}

impl Recipe {
    /// Average character length of the instruction steps (0 when empty).
    pub fn average_instruction_len(&self) -> f64 {
        if self.instructions.is_empty() {
            return 0.0;
        }
        let total: usize = self
            .instructions
            .iter()
            .map(|i| i.instruction.chars().count())
            .sum();
        total as f64 / self.instructions.len() as f64
    }
}

/// Recipe difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy", alias = "EASY")]
    Easy,
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// One ingredient line in a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawIngredient")]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Wire shapes accepted for an ingredient: a bare name or an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIngredient {
    Name(String),
    Line {
        #[serde(alias = "ingredient", alias = "item")]
        name: String,
        #[serde(default, deserialize_with = "lenient::opt_or_none", alias = "quantity")]
        amount: Option<Amount>,
        #[serde(default, deserialize_with = "lenient::opt_or_none")]
        unit: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_or_none")]
        notes: Option<String>,
    },
}

impl From<RawIngredient> for RecipeIngredient {
    fn from(raw: RawIngredient) -> Self {
        match raw {
            RawIngredient::Name(name) => Self::new(name),
            RawIngredient::Line {
                name,
                amount,
                unit,
                notes,
            } => Self {
                name,
                amount,
                unit,
                notes,
            },
        }
    }
}

impl RecipeIngredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
            notes: None,
        }
    }

    pub fn amount(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.amount = Some(Amount::Quantity(quantity));
        self.unit = Some(unit.into());
        self
    }
}

/// Ingredient amount: providers emit either a number or free text ("a pinch").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Quantity(f64),
    Text(String),
}

/// One numbered instruction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInstruction")]
pub struct Instruction {
    pub step: u32,
    pub instruction: String,
    /// Minutes, when the provider states one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Instruction {
    pub fn new(step: u32, instruction: impl Into<String>) -> Self {
        Self {
            step,
            instruction: instruction.into(),
            duration: None,
        }
    }
}

/// Wire shapes accepted for an instruction step.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstruction {
    Text(String),
    Step {
        #[serde(default, deserialize_with = "lenient::u32_or_default")]
        step: u32,
        #[serde(alias = "text", alias = "description")]
        instruction: String,
        #[serde(default, deserialize_with = "lenient::opt_u32", alias = "time")]
        duration: Option<u32>,
    },
}

impl From<RawInstruction> for Instruction {
    fn from(raw: RawInstruction) -> Self {
        match raw {
            RawInstruction::Text(instruction) => Self {
                step: 0,
                instruction,
                duration: None,
            },
            RawInstruction::Step {
                step,
                instruction,
                duration,
            } => Self {
                step,
                instruction,
                duration,
            },
        }
    }
}

/// Per-serving nutrition. Macronutrients in grams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, deserialize_with = "lenient::f64_or_default")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_default")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_default")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_default")]
    pub fat: f64,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub fiber: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub sugar: Option<f64>,
    /// Milligrams.
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub sodium: Option<f64>,
}
