//! Recipe Step model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Step as it appears in the recipe JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_number: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A stored step row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: i64,
    pub recipe_id: i64,
    pub step_number: i64,
    pub description: String,
}

impl RecipeStep {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            step_number: row.get("step_number")?,
            description: row.get("description")?,
        })
    }

    /// Add a step to a recipe; a missing description is stored as empty text
    pub fn create(conn: &Connection, recipe_id: i64, data: &StepRecord) -> DbResult<i64> {
        conn.execute(
            "INSERT INTO steps (recipe_id, step_number, description) VALUES (?1, ?2, ?3)",
            params![
                recipe_id,
                data.step_number,
                data.description.as_deref().unwrap_or(""),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Steps of a recipe ordered by step number
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM steps WHERE recipe_id = ?1 ORDER BY step_number, id",
        )?;

        let steps = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(steps)
    }
}

impl From<RecipeStep> for StepRecord {
    fn from(row: RecipeStep) -> Self {
        Self {
            step_number: row.step_number,
            description: Some(row.description),
        }
    }
}
