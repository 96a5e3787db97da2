//! Nutrition calculation module
//!
//! Handles recipe nutrition aggregation and recipe file annotation.

pub mod aggregate;
pub mod annotate;

pub use aggregate::{annotate, annotate_values, coerce_f64, IngredientNutrition, RecipeNutrition};
pub use annotate::{annotate_recipe_file, annotate_recipe_value, write_json_atomic};
