//! Recipe nutrition aggregation
//!
//! Sums ingredient calories into a per-serving figure and blends ingredient
//! NOVA scores into a single recipe score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalcError, CalcResult};

/// The nutrition-relevant part of one ingredient
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IngredientNutrition {
    pub calories: Option<f64>,
    pub nova_score: Option<f64>,
}

impl IngredientNutrition {
    pub fn new(calories: Option<f64>, nova_score: Option<f64>) -> Self {
        Self { calories, nova_score }
    }

    /// Read calories and NOVA score from a raw JSON ingredient.
    ///
    /// Returns `None` for entries that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            calories: obj.get("calories").and_then(coerce_f64),
            // Only real JSON numbers count as a NOVA score
            nova_score: obj.get("nova_score").and_then(Value::as_f64),
        })
    }
}

/// Aggregated nutrition for a whole recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecipeNutrition {
    pub calories_per_serving: f64,
    /// `None` when no ingredient carries a NOVA score
    pub nova_score: Option<f64>,
}

/// Coerce a JSON value to a float the way loosely-typed upstream data expects:
/// numbers as-is, numeric strings parsed, booleans as 1/0.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Missing, unparseable, non-finite and negative calories all count as zero
fn clamp_calories(calories: Option<f64>) -> f64 {
    match calories {
        Some(c) if c.is_finite() && c > 0.0 => c,
        _ => 0.0,
    }
}

fn validate_servings(number_of_servings: f64) -> CalcResult<f64> {
    if number_of_servings.is_finite() && number_of_servings > 0.0 {
        Ok(number_of_servings)
    } else {
        Err(CalcError::validation("servings must be positive"))
    }
}

/// Compute per-serving calories and the calorie-weighted NOVA score.
///
/// The NOVA score is the calorie-weighted mean over ingredients that have
/// both a score and positive calories. When none of the scored ingredients
/// carry calories it falls back to the plain mean of the scores, and when no
/// ingredient is scored it is `None`.
///
/// # Errors
///
/// `CalcError::Validation` if `number_of_servings` is not a finite positive number.
pub fn annotate<I>(ingredients: I, number_of_servings: f64) -> CalcResult<RecipeNutrition>
where
    I: IntoIterator<Item = IngredientNutrition>,
{
    let servings = validate_servings(number_of_servings)?;

    let mut total_calories = 0.0;
    let mut weighted_num = 0.0;
    let mut weighted_den = 0.0;
    let mut nova_sum = 0.0;
    let mut nova_count = 0usize;

    for ingredient in ingredients {
        let calories = clamp_calories(ingredient.calories);
        total_calories += calories;

        if let Some(nova) = ingredient.nova_score.filter(|n| n.is_finite()) {
            nova_sum += nova;
            nova_count += 1;
            if calories > 0.0 {
                weighted_num += nova * calories;
                weighted_den += calories;
            }
        }
    }

    let nova_score = if weighted_den > 0.0 {
        Some(weighted_num / weighted_den)
    } else if nova_count > 0 {
        Some(nova_sum / nova_count as f64)
    } else {
        None
    };

    Ok(RecipeNutrition {
        calories_per_serving: total_calories / servings,
        nova_score,
    })
}

/// Run [`annotate`] over raw JSON fields as they come from extraction.
///
/// Non-object ingredient entries are skipped.
///
/// # Errors
///
/// `CalcError::Validation` if `ingredients` is missing or not an array, or
/// `number_of_servings` is missing, non-numeric or not positive.
pub fn annotate_values(
    ingredients: Option<&Value>,
    number_of_servings: Option<&Value>,
) -> CalcResult<RecipeNutrition> {
    let entries = ingredients
        .and_then(Value::as_array)
        .ok_or_else(|| CalcError::validation("'ingredients' must be a list"))?;

    let servings = match number_of_servings {
        None | Some(Value::Null) => {
            return Err(CalcError::validation("'number_of_servings' is required"))
        }
        Some(v) => coerce_f64(v).unwrap_or(f64::NAN),
    };

    let parsed: Vec<IngredientNutrition> = entries
        .iter()
        .filter_map(|entry| {
            let parsed = IngredientNutrition::from_value(entry);
            if parsed.is_none() {
                tracing::debug!("Skipping malformed ingredient entry: {}", entry);
            }
            parsed
        })
        .collect();

    annotate(parsed, servings)
}
