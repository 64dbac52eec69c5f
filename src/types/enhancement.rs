//! Enhancement kinds for the recipe `enhance` operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What an enhancement call should do to an existing recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnhancementKind {
    AddTips,
    CreateVariations,
    ImproveInstructions,
    OptimizeNutrition,
}

impl EnhancementKind {
    pub const ALL: [EnhancementKind; 4] = [
        Self::AddTips,
        Self::CreateVariations,
        Self::ImproveInstructions,
        Self::OptimizeNutrition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddTips => "add-tips",
            Self::CreateVariations => "create-variations",
            Self::ImproveInstructions => "improve-instructions",
            Self::OptimizeNutrition => "optimize-nutrition",
        }
    }

    /// The instruction handed to the provider for this kind.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::AddTips => {
                "Add practical cooking tips, common mistakes to avoid, and storage advice to the tips list."
            }
            Self::CreateVariations => {
                "Add variations (ingredient swaps, dietary adaptations, flavour twists) to the tips list and matching tags."
            }
            Self::ImproveInstructions => {
                "Rewrite the instructions so every step is clear, specific, and includes timings and visual cues."
            }
            Self::OptimizeNutrition => {
                "Adjust ingredients and quantities for a more balanced nutrition profile and update the nutrition block to match."
            }
        }
    }
}

impl fmt::Display for EnhancementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnhancementKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown enhancement kind '{s}'"))
    }
}
