//! Recipe file annotation
//!
//! Writes `calories_per_serving` and `nova_score` into recipe JSON documents.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::aggregate::{annotate_values, RecipeNutrition};
use crate::error::{AppError, AppResult, CalcError, CalcResult};

/// Annotate a recipe document in place, overwriting any existing
/// `calories_per_serving` and `nova_score` keys.
pub fn annotate_recipe_value(recipe: &mut Value) -> CalcResult<RecipeNutrition> {
    let obj = recipe
        .as_object_mut()
        .ok_or_else(|| CalcError::validation("recipe must be a JSON object"))?;

    let nutrition = annotate_values(obj.get("ingredients"), obj.get("number_of_servings"))?;

    obj.insert(
        "calories_per_serving".to_string(),
        Value::from(nutrition.calories_per_serving),
    );
    obj.insert(
        "nova_score".to_string(),
        nutrition.nova_score.map(Value::from).unwrap_or(Value::Null),
    );

    Ok(nutrition)
}

/// Read a recipe JSON file, annotate it and replace the file atomically.
///
/// Returns the updated document.
pub fn annotate_recipe_file(path: impl AsRef<Path>) -> AppResult<Value> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AppError::NotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    let mut recipe: Value = serde_json::from_str(&text)?;

    let nutrition = annotate_recipe_value(&mut recipe)?;
    tracing::info!(
        "Annotated {}: {:.1} kcal/serving, NOVA {:?}",
        path.display(),
        nutrition.calories_per_serving,
        nutrition.nova_score
    );

    write_json_atomic(path, &recipe)?;
    Ok(recipe)
}

/// Write pretty JSON to `<path>.tmp` then rename it over `path`
pub fn write_json_atomic(path: &Path, value: &Value) -> AppResult<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');

    fs::write(tmp_path, body)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_annotate_value_sets_fields() {
        let mut recipe = json!({
            "name": "Ranch",
            "number_of_servings": 4,
            "ingredients": [
                {"name": "buttermilk", "calories": 200, "nova_score": 1},
                {"name": "mayo", "calories": 600, "nova_score": 4}
            ],
            "calories_per_serving": 1,
            "nova_score": 0
        });
        annotate_recipe_value(&mut recipe).unwrap();
        assert_eq!(recipe["calories_per_serving"], json!(200.0));
        assert_eq!(recipe["nova_score"], json!(3.25));
    }

    #[test]
    fn test_annotate_value_unknown_nova_is_null() {
        let mut recipe = json!({
            "number_of_servings": 1,
            "ingredients": [{"name": "water", "calories": 0}]
        });
        annotate_recipe_value(&mut recipe).unwrap();
        assert_eq!(recipe["nova_score"], Value::Null);
        assert_eq!(recipe["calories_per_serving"], json!(0.0));
    }

    #[test]
    fn test_annotate_value_rejects_non_object() {
        let mut recipe = json!([1, 2, 3]);
        assert!(annotate_recipe_value(&mut recipe).is_err());
    }

    #[test]
    fn test_failed_annotation_leaves_document_untouched() {
        let mut recipe = json!({"number_of_servings": 0, "ingredients": []});
        let before = recipe.clone();
        assert!(annotate_recipe_value(&mut recipe).is_err());
        assert_eq!(recipe, before);
    }

    #[test]
    fn test_annotate_file_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrots.json");
        fs::write(
            &path,
            r#"{"name":"Roasted Carrots","number_of_servings":2,"ingredients":[{"name":"carrot","calories":100,"nova_score":1}]}"#,
        )
        .unwrap();

        let updated = annotate_recipe_file(&path).unwrap();
        assert_eq!(updated["calories_per_serving"], json!(50.0));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.starts_with("{\n  \"name\""));
        let reread: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reread["nova_score"], json!(1.0));
        assert!(!dir.path().join("carrots.json.tmp").exists());
    }

    #[test]
    fn test_annotate_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(annotate_recipe_file(&missing), Err(AppError::NotFound(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(annotate_recipe_file(&bad), Err(AppError::Json(_))));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{"ingredients": [], "number_of_servings": -1}"#).unwrap();
        assert!(matches!(
            annotate_recipe_file(&invalid),
            Err(AppError::Calc(CalcError::Validation(_)))
        ));
    }
}
