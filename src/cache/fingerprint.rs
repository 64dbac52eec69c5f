//! Canonical request fingerprints.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::{Difficulty, GenerationRequest};

/// Deterministic, order-independent digest of a [`GenerationRequest`].
///
/// Built from the ingredient names sorted lexicographically, the cuisine,
/// the serving count and a normalized form of the preferences (dietary
/// flags sorted and de-duplicated). SHA-256 keeps the key stable across
/// processes, so it is usable against a shared store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

/// Canonical serialization input. Field order is fixed by the struct.
#[derive(Serialize)]
struct Canonical<'a> {
    ingredients: Vec<&'a str>,
    cuisine: &'a str,
    servings: u32,
    max_time: Option<u32>,
    difficulty: Option<Difficulty>,
    dietary: Vec<&'a str>,
    context: Option<&'a str>,
}

impl Fingerprint {
    /// Compute the fingerprint of a request.
    pub fn of(request: &GenerationRequest) -> Self {
        let mut ingredients: Vec<&str> = request.ingredients.iter().map(String::as_str).collect();
        ingredients.sort_unstable();

        let prefs = &request.preferences;
        let mut dietary: Vec<&str> = prefs.dietary.iter().map(String::as_str).collect();
        dietary.sort_unstable();
        dietary.dedup();

        let canonical = Canonical {
            ingredients,
            cuisine: &request.cuisine,
            servings: request.servings,
            max_time: prefs.max_time,
            difficulty: prefs.difficulty,
            dietary,
            context: prefs.context.as_deref(),
        };
        // Serializing plain strings and integers cannot fail.
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(b"recipe:v1\n");
        hasher.update(&bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
