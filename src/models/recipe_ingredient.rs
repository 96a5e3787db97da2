//! Recipe Ingredient model
//!
//! One ingredient line of a recipe with its calorie and NOVA estimates.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::recipe::{lenient_f64, strict_number};
use crate::db::DbResult;
use crate::nutrition::IngredientNutrition;

/// Ingredient as it appears in the recipe JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "strict_number")]
    pub nova_score: Option<f64>,
}

impl From<&IngredientRecord> for IngredientNutrition {
    fn from(record: &IngredientRecord) -> Self {
        IngredientNutrition::new(record.calories, record.nova_score)
    }
}

/// A stored ingredient row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub units: Option<String>,
    pub calories: Option<f64>,
    pub nova_score: Option<f64>,
}

impl RecipeIngredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            name: row.get("name")?,
            amount: row.get("amount")?,
            units: row.get("units")?,
            calories: row.get("calories")?,
            nova_score: row.get("nova_score")?,
        })
    }

    /// Add an ingredient to a recipe, returning its row id
    pub fn create(conn: &Connection, recipe_id: i64, data: &IngredientRecord) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO ingredients (recipe_id, name, amount, nova_score, calories, units)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                recipe_id,
                data.name,
                data.amount,
                data.nova_score,
                data.calories,
                data.units,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All ingredients of a recipe in insertion order
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM ingredients WHERE recipe_id = ?1 ORDER BY id")?;

        let ingredients = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }
}

impl From<RecipeIngredient> for IngredientRecord {
    fn from(row: RecipeIngredient) -> Self {
        Self {
            name: row.name,
            amount: row.amount,
            units: row.units,
            calories: row.calories,
            nova_score: row.nova_score,
        }
    }
}
