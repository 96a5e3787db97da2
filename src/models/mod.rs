//! Data models
//!
//! Recipe documents and their database rows.

mod recipe;
mod recipe_ingredient;
mod recipe_step;

pub use recipe::{MealType, Recipe, RecipeRecord, ScalingCategory, TimeInfo};
pub use recipe_ingredient::{IngredientRecord, RecipeIngredient};
pub use recipe_step::{RecipeStep, StepRecord};
