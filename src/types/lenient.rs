//! Forgiving deserializers for model-written fields.
//!
//! Models emit numbers as strings ("4", "15 minutes"), integers as floats,
//! and nulls where a value is expected. Optional recipe fields go through
//! these helpers so a stray type falls back to the field's default instead
//! of failing the whole recipe.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Difficulty;

/// A number, or the leading numeric part of a string ("15 minutes" is 15).
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(s.len());
            s[..end].parse().ok()
        }
        _ => None,
    };
    parsed.filter(|n: &f64| n.is_finite())
}

fn whole(value: &Value) -> Option<u32> {
    number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
}

pub(crate) fn u32_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(whole(&Value::deserialize(d)?).unwrap_or_default())
}

pub(crate) fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(whole(&Value::deserialize(d)?))
}

pub(crate) fn f64_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(number(&Value::deserialize(d)?).unwrap_or_default())
}

pub(crate) fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number(&Value::deserialize(d)?))
}

pub(crate) fn f32_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
    Ok(number(&Value::deserialize(d)?).unwrap_or_default() as f32)
}

/// Strings stay as-is, numbers and booleans are stringified, anything else is empty.
pub(crate) fn string_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Keeps the string elements of an array; a lone string becomes one element.
pub(crate) fn strings_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

pub(crate) fn difficulty_or_default<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Difficulty, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => Difficulty::default(),
    })
}

/// Any value that does not deserialize as `T` reads as `None`.
pub(crate) fn opt_or_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_are_read_from_strings_and_floats() {
        assert_eq!(whole(&json!("4")), Some(4));
        assert_eq!(whole(&json!(4.0)), Some(4));
        assert_eq!(whole(&json!("15 minutes")), Some(15));
        assert_eq!(whole(&json!(" 2.5 cups")), Some(3));
        assert_eq!(number(&json!("450")), Some(450.0));
    }

    #[test]
    fn unusable_values_yield_nothing() {
        assert_eq!(whole(&json!("about an hour")), None);
        assert_eq!(whole(&json!(-3)), None);
        assert_eq!(whole(&json!(null)), None);
        assert_eq!(number(&json!({"value": 1})), None);
        assert_eq!(number(&json!(".")), None);
    }
}
