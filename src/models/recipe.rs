//! Recipe model
//!
//! `RecipeRecord` is the JSON document shape produced by extraction and kept
//! on disk. `Recipe` is the stored database row.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::recipe_ingredient::{IngredientRecord, RecipeIngredient};
use super::recipe_step::{RecipeStep, StepRecord};
use crate::db::{DbError, DbResult};
use crate::error::{CalcError, CalcResult};
use crate::nutrition::{self, coerce_f64, IngredientNutrition, RecipeNutrition};

/// Meal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
    Beverage,
    Condiment,
}

impl MealType {
    pub const ALL: [MealType; 7] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Dessert,
        MealType::Snack,
        MealType::Beverage,
        MealType::Condiment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Dessert => "dessert",
            MealType::Snack => "snack",
            MealType::Beverage => "beverage",
            MealType::Condiment => "condiment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == lower)
    }
}

/// Whether a recipe scales by whole units or continuously
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingCategory {
    Discrete,
    Continuous,
}

impl ScalingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingCategory::Discrete => "discrete",
            ScalingCategory::Continuous => "continuous",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "discrete" => Some(ScalingCategory::Discrete),
            "continuous" => Some(ScalingCategory::Continuous),
            _ => None,
        }
    }
}

/// A duration as written on the card, e.g. `{ "length": 20, "units": "minutes" }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeInfo {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Recipe JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub scaling_category: Option<ScalingCategory>,
    #[serde(default)]
    pub active_time: Option<TimeInfo>,
    #[serde(default)]
    pub total_time: Option<TimeInfo>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub number_of_servings: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<IngredientRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<StepRecord>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories_per_serving: Option<f64>,
    #[serde(default, deserialize_with = "strict_number")]
    pub nova_score: Option<f64>,
}

impl RecipeRecord {
    /// Per-serving calories and NOVA score for this recipe
    pub fn nutrition(&self) -> CalcResult<RecipeNutrition> {
        let servings = self
            .number_of_servings
            .ok_or_else(|| CalcError::validation("'number_of_servings' is required"))?;
        nutrition::annotate(self.ingredients.iter().map(IngredientNutrition::from), servings)
    }

    /// Compute and store `calories_per_serving` and `nova_score`
    pub fn annotate(&mut self) -> CalcResult<RecipeNutrition> {
        let result = self.nutrition()?;
        self.calories_per_serving = Some(result.calories_per_serving);
        self.nova_score = result.nova_score;
        Ok(result)
    }

    /// Sum of ingredient calories divided by servings, treating missing
    /// calories as zero. `None` without a positive serving count.
    pub fn fallback_calories_per_serving(&self) -> Option<f64> {
        let servings = self.number_of_servings.filter(|s| *s > 0.0)?;
        let total: f64 = self.ingredients.iter().map(|i| i.calories.unwrap_or(0.0)).sum();
        Some(total / servings)
    }
}

/// Numbers as-is, numeric strings parsed, anything else `None`
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

/// Only JSON numbers; other values read as `None`
pub(crate) fn strict_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A stored recipe row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub meal_type: Option<MealType>,
    pub scaling_category: Option<ScalingCategory>,
    pub active_time_length: Option<f64>,
    pub active_time_units: Option<String>,
    pub total_time_length: Option<f64>,
    pub total_time_units: Option<String>,
    pub number_of_servings: Option<f64>,
    pub calories_per_serving: Option<f64>,
    pub nova_score: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Recipe {
    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: Option<String> = row.get("meal_type")?;
        let scaling_category: Option<String> = row.get("scaling_category")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            cuisine: row.get("cuisine")?,
            meal_type: meal_type.as_deref().and_then(MealType::from_str),
            scaling_category: scaling_category.as_deref().and_then(ScalingCategory::from_str),
            active_time_length: row.get("active_time_length")?,
            active_time_units: row.get("active_time_units")?,
            total_time_length: row.get("total_time_length")?,
            total_time_units: row.get("total_time_units")?,
            number_of_servings: row.get("number_of_servings")?,
            calories_per_serving: row.get("calories_per_serving")?,
            nova_score: row.get("nova_score")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a recipe with its ingredients and steps in one transaction
    pub fn create(conn: &Connection, data: &RecipeRecord) -> DbResult<Self> {
        let name = data
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DbError::Invalid("recipe name is required".to_string()))?;

        let active = data.active_time.clone().unwrap_or_default();
        let total = data.total_time.clone().unwrap_or_default();

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO recipes (
                name, description, cuisine, meal_type, scaling_category,
                active_time_length, active_time_units, total_time_length, total_time_units,
                number_of_servings, calories_per_serving, nova_score
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                name,
                data.description,
                data.cuisine,
                data.meal_type.map(|m| m.as_str()),
                data.scaling_category.map(|s| s.as_str()),
                active.length,
                active.units,
                total.length,
                total.units,
                data.number_of_servings,
                data.calories_per_serving,
                data.nova_score,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for ingredient in &data.ingredients {
            RecipeIngredient::create(&tx, id, ingredient)?;
        }
        for step in &data.steps {
            RecipeStep::create(&tx, id, step)?;
        }
        tx.commit()?;

        tracing::info!(
            "Stored recipe {} '{}' ({} ingredients, {} steps)",
            id,
            name,
            data.ingredients.len(),
            data.steps.len()
        );

        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recipes by name, optionally filtered by a name substring
    pub fn list(conn: &Connection, query: Option<&str>, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let recipes = match query {
            Some(q) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM recipes WHERE name LIKE ?1 ORDER BY name ASC LIMIT ?2 OFFSET ?3",
                )?;
                let pattern = format!("%{}%", q);
                let rows = stmt
                    .query_map(params![pattern, limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM recipes ORDER BY name ASC LIMIT ?1 OFFSET ?2")?;
                let rows = stmt
                    .query_map(params![limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(recipes)
    }

    /// Count recipes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a recipe; ingredients and steps cascade
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Reassemble the JSON document for this recipe
    pub fn to_record(&self, conn: &Connection) -> DbResult<RecipeRecord> {
        let ingredients = RecipeIngredient::list_for_recipe(conn, self.id)?
            .into_iter()
            .map(IngredientRecord::from)
            .collect();
        let steps = RecipeStep::list_for_recipe(conn, self.id)?
            .into_iter()
            .map(StepRecord::from)
            .collect();

        let time = |length: Option<f64>, units: &Option<String>| {
            (length.is_some() || units.is_some()).then(|| TimeInfo {
                length,
                units: units.clone(),
            })
        };

        Ok(RecipeRecord {
            name: Some(self.name.clone()),
            description: self.description.clone(),
            cuisine: self.cuisine.clone(),
            meal_type: self.meal_type,
            scaling_category: self.scaling_category,
            active_time: time(self.active_time_length, &self.active_time_units),
            total_time: time(self.total_time_length, &self.total_time_units),
            number_of_servings: self.number_of_servings,
            ingredients,
            steps,
            calories_per_serving: self.calories_per_serving,
            nova_score: self.nova_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use serde_json::json;

    fn sample_record() -> RecipeRecord {
        serde_json::from_value(json!({
            "name": "Buttermilk Ranch",
            "description": "Tangy dressing",
            "cuisine": "American",
            "meal_type": "condiment",
            "scaling_category": "continuous",
            "active_time": {"length": 10, "units": "minutes"},
            "total_time": {"length": "40", "units": "minutes"},
            "number_of_servings": 8,
            "ingredients": [
                {"name": "buttermilk", "amount": 1, "units": "cup", "calories": 100, "nova_score": 1},
                {"name": "mayonnaise", "amount": 0.5, "units": "cup", "calories": 700, "nova_score": 4}
            ],
            "steps": [
                {"step_number": 2, "description": "Chill for 30 minutes."},
                {"step_number": 1, "description": "Whisk everything together."}
            ],
            "calories_per_serving": null,
            "nova_score": null
        }))
        .unwrap()
    }

    #[test]
    fn test_record_lenient_fields() {
        let record = sample_record();
        assert_eq!(record.total_time.as_ref().unwrap().length, Some(40.0));
        assert_eq!(record.meal_type, Some(MealType::Condiment));

        let loose: RecipeRecord = serde_json::from_value(json!({
            "name": "Toast",
            "ingredients": null,
            "steps": null,
            "number_of_servings": "2",
            "nova_score": "unknown"
        }))
        .unwrap();
        assert!(loose.ingredients.is_empty());
        assert_eq!(loose.number_of_servings, Some(2.0));
        assert_eq!(loose.nova_score, None);
    }

    #[test]
    fn test_record_annotate() {
        let mut record = sample_record();
        let result = record.annotate().unwrap();
        assert_eq!(result.calories_per_serving, 100.0);
        assert_eq!(record.calories_per_serving, Some(100.0));
        assert_eq!(record.nova_score, Some((100.0 + 700.0 * 4.0) / 800.0));

        record.number_of_servings = None;
        assert!(matches!(record.annotate(), Err(CalcError::Validation(_))));
    }

    #[test]
    fn test_fallback_calories() {
        let mut record = sample_record();
        assert_eq!(record.fallback_calories_per_serving(), Some(100.0));
        record.number_of_servings = Some(0.0);
        assert_eq!(record.fallback_calories_per_serving(), None);
    }

    #[test]
    fn test_meal_type_from_str() {
        assert_eq!(MealType::from_str("Dessert"), Some(MealType::Dessert));
        assert_eq!(MealType::from_str("brunch"), None);
        assert_eq!(ScalingCategory::from_str("discrete"), Some(ScalingCategory::Discrete));
    }

    #[test]
    fn test_create_and_round_trip() {
        let conn = test_conn();
        let mut record = sample_record();
        record.annotate().unwrap();

        let recipe = Recipe::create(&conn, &record).unwrap();
        assert_eq!(recipe.name, "Buttermilk Ranch");
        assert_eq!(recipe.meal_type, Some(MealType::Condiment));
        assert_eq!(recipe.calories_per_serving, Some(100.0));

        let back = recipe.to_record(&conn).unwrap();
        assert_eq!(back.ingredients, record.ingredients);
        // Steps come back ordered by step number
        assert_eq!(back.steps[0].step_number, 1);
        assert_eq!(back.steps[1].step_number, 2);
        assert_eq!(back.active_time, record.active_time);
        assert_eq!(back.nova_score, record.nova_score);
    }

    #[test]
    fn test_create_requires_name() {
        let conn = test_conn();
        let mut record = sample_record();
        record.name = Some("   ".to_string());
        assert!(matches!(Recipe::create(&conn, &record), Err(DbError::Invalid(_))));
        assert_eq!(Recipe::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_name_and_cuisine_rejected() {
        let conn = test_conn();
        let record = sample_record();
        Recipe::create(&conn, &record).unwrap();
        assert!(Recipe::create(&conn, &record).is_err());
        // The failed insert leaves no orphaned rows
        assert_eq!(Recipe::count(&conn).unwrap(), 1);
        let ingredients: i64 = conn
            .query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ingredients, 2);
    }

    #[test]
    fn test_list_and_delete_cascade() {
        let conn = test_conn();
        let ranch = Recipe::create(&conn, &sample_record()).unwrap();
        let mut other = sample_record();
        other.name = Some("Apple Crumble".to_string());
        Recipe::create(&conn, &other).unwrap();

        let all = Recipe::list(&conn, None, 10, 0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Apple Crumble");

        let found = Recipe::list(&conn, Some("Ranch"), 10, 0).unwrap();
        assert_eq!(found.len(), 1);

        assert!(Recipe::delete(&conn, ranch.id).unwrap());
        assert!(Recipe::get_by_id(&conn, ranch.id).unwrap().is_none());
        assert!(RecipeIngredient::list_for_recipe(&conn, ranch.id).unwrap().is_empty());
        assert!(RecipeStep::list_for_recipe(&conn, ranch.id).unwrap().is_empty());
        assert!(!Recipe::delete(&conn, ranch.id).unwrap());
    }
}
