//! Recipe tools
//!
//! File and database workflows built on the recipe model: loading recipe JSON
//! into the database, saving extracted recipes and the full image-to-database
//! flow.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::extract::RecipeExtractor;
use crate::models::{Recipe, RecipeRecord};
use crate::nutrition::{annotate_recipe_file, write_json_atomic};

/// Summary of a stored recipe
#[derive(Debug, Serialize)]
pub struct StoredRecipeResponse {
    pub id: i64,
    pub name: String,
    pub calories_per_serving: Option<f64>,
    pub nova_score: Option<f64>,
    pub ingredient_count: usize,
    pub step_count: usize,
}

/// Result of `add_recipe_from_image`
#[derive(Debug, Serialize)]
pub struct AddRecipeResponse {
    pub path: PathBuf,
    pub recipe: StoredRecipeResponse,
}

fn unsafe_file_chars() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/:*?"<>|]+"#).ok()).as_ref()
}

/// Recipe name made safe for use as a file name; `None` when nothing usable remains
pub fn safe_file_name(name: &str) -> Option<String> {
    let safe = match unsafe_file_chars() {
        Some(re) => re.replace_all(name, "_").trim().to_string(),
        None => name.trim().to_string(),
    };
    (!safe.is_empty()).then_some(safe)
}

/// Insert a recipe document into the database.
///
/// A missing `calories_per_serving` is filled from the ingredient calories.
pub fn store_recipe(db: &Database, mut record: RecipeRecord) -> AppResult<StoredRecipeResponse> {
    if record.calories_per_serving.is_none() {
        record.calories_per_serving = record.fallback_calories_per_serving();
        if let Some(kcal) = record.calories_per_serving {
            tracing::info!("Filled missing calories_per_serving with {:.1}", kcal);
        }
    }

    let recipe = db.with_conn(|conn| Recipe::create(conn, &record))?;
    Ok(StoredRecipeResponse {
        id: recipe.id,
        name: recipe.name,
        calories_per_serving: recipe.calories_per_serving,
        nova_score: recipe.nova_score,
        ingredient_count: record.ingredients.len(),
        step_count: record.steps.len(),
    })
}

/// Load a recipe JSON file into the database
pub fn load_recipe_file(db: &Database, path: &Path) -> AppResult<StoredRecipeResponse> {
    if !path.is_file() {
        return Err(AppError::NotFound(path.to_path_buf()));
    }
    let record: RecipeRecord = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    store_recipe(db, record)
}

/// Fetch a stored recipe as its JSON document
pub fn get_recipe(db: &Database, id: i64) -> AppResult<Option<RecipeRecord>> {
    let record = db.with_conn(|conn| match Recipe::get_by_id(conn, id)? {
        Some(recipe) => recipe.to_record(conn).map(Some),
        None => Ok(None),
    })?;
    Ok(record)
}

/// Write an extracted recipe to `<dir>/<name>.json` and annotate it in place.
///
/// Returns the file path and the annotated document.
pub fn save_extracted_recipe(dir: &Path, record: &RecipeRecord) -> AppResult<(PathBuf, Value)> {
    let name = record
        .name
        .as_deref()
        .and_then(safe_file_name)
        .ok_or_else(|| AppError::Extraction("extracted recipe has no name".into()))?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", name));

    write_json_atomic(&path, &serde_json::to_value(record)?)?;
    let annotated = annotate_recipe_file(&path)?;
    Ok((path, annotated))
}

/// Extract a recipe from a card photo, save and annotate it, then store it
pub fn add_recipe_from_image(config: &Config, db: &Database, image: &Path) -> AppResult<AddRecipeResponse> {
    let extractor = RecipeExtractor::from_config(config)?;
    let record = extractor.extract_from_image(image)?;

    let (path, annotated) = save_extracted_recipe(&config.recipes_dir, &record)?;
    tracing::info!("Saved recipe to {}", path.display());

    let recipe = store_recipe(db, serde_json::from_value(annotated)?)?;
    Ok(AddRecipeResponse { path, recipe })
}
