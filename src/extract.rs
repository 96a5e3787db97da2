//! Recipe card extraction
//!
//! Sends a photo of a recipe card to a vision model through the Responses API
//! and parses the structured answer into a [`RecipeRecord`].

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::RecipeRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const EXTRACTION_INSTRUCTIONS: &str = "\
You are a recipe extraction assistant.
From the image provided, extract all available recipe information and return it in the given structure.

Rules:
- If any field is missing from the recipe, set its value to null.
- Step numbers should be sequential starting from 1.
- Times should be in minutes.
- If a range is given for any number, use the average value.
- Servings may be labelled differently, e.g. \"Serves\" or \"Makes\".
- If the image is not a recipe, return null for all fields.
- If a cuisine is not specified, infer it from the ingredients or context.
- If the meal type is not specified, estimate it from the ingredients and context. The options are: breakfast, lunch, dinner, snack, dessert, beverage or condiment.
- If calories are not specified, estimate them for each ingredient.
- If a NOVA score is not specified, estimate it for each ingredient from its processing level.
- Ignore fragments of other recipes in the image and focus on the main recipe.
- If the recipe is in a different language, translate it to English.";

pub struct RecipeExtractor {
    http: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl RecipeExtractor {
    pub fn new(base_url: &str, api_key: SecretString, model: &str) -> AppResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            &config.openai_base_url,
            config.require_openai_key()?.clone(),
            &config.openai_model,
        )
    }

    /// Extract a recipe from an image file
    pub fn extract_from_image(&self, image: &Path) -> AppResult<RecipeRecord> {
        if !image.is_file() {
            return Err(AppError::NotFound(image.to_path_buf()));
        }
        let bytes = std::fs::read(image)?;
        let data_url = format!("data:{};base64,{}", image_mime_type(image), STANDARD.encode(&bytes));

        tracing::info!(
            "Extracting recipe from {} ({} bytes) with {}",
            image.display(),
            bytes.len(),
            self.model
        );

        let resp = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body(&self.model, &data_url))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = resp.json()?;
        let record = parse_response(&body)?;
        tracing::info!(
            "Extracted recipe '{}'",
            record.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(record)
    }
}

/// MIME type for an image path by extension
fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn nullable(kind: &str) -> Value {
    json!({ "type": [kind, "null"] })
}

fn time_schema() -> Value {
    json!({
        "type": ["object", "null"],
        "properties": {
            "length": nullable("number"),
            "units": nullable("string")
        },
        "required": ["length", "units"],
        "additionalProperties": false
    })
}

/// Strict JSON schema for a recipe record
fn recipe_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": nullable("string"),
            "description": nullable("string"),
            "cuisine": nullable("string"),
            "meal_type": {
                "type": ["string", "null"],
                "enum": ["breakfast", "lunch", "dinner", "dessert", "snack", "beverage", "condiment", null]
            },
            "ingredients": {
                "type": ["array", "null"],
                "items": {
                    "type": "object",
                    "properties": {
                        "name": nullable("string"),
                        "amount": nullable("number"),
                        "nova_score": nullable("number"),
                        "calories": nullable("number"),
                        "units": nullable("string")
                    },
                    "required": ["name", "amount", "nova_score", "calories", "units"],
                    "additionalProperties": false
                }
            },
            "active_time": time_schema(),
            "total_time": time_schema(),
            "number_of_servings": nullable("number"),
            "steps": {
                "type": ["array", "null"],
                "items": {
                    "type": "object",
                    "properties": {
                        "step_number": { "type": "integer" },
                        "description": { "type": "string" }
                    },
                    "required": ["step_number", "description"],
                    "additionalProperties": false
                }
            }
        },
        "required": [
            "name", "description", "cuisine", "meal_type", "ingredients",
            "active_time", "total_time", "number_of_servings", "steps"
        ],
        "additionalProperties": false
    })
}

fn request_body(model: &str, image_data_url: &str) -> Value {
    json!({
        "model": model,
        "input": [
            { "role": "system", "content": EXTRACTION_INSTRUCTIONS },
            {
                "role": "user",
                "content": [
                    { "type": "input_image", "image_url": image_data_url }
                ]
            }
        ],
        "text": {
            "format": {
                "type": "json_schema",
                "name": "recipe",
                "strict": true,
                "schema": recipe_schema()
            }
        }
    })
}

/// Concatenated `output_text` parts of a Responses API reply
fn output_text(body: &Value) -> Option<String> {
    let text: String = body
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

fn refusal(body: &Value) -> Option<&str> {
    body.get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .find(|part| part.get("type").and_then(Value::as_str) == Some("refusal"))
        .and_then(|part| part.get("refusal").and_then(Value::as_str))
}

fn parse_response(body: &Value) -> AppResult<RecipeRecord> {
    if let Some(reason) = refusal(body) {
        return Err(AppError::Extraction(format!("model refused: {}", reason)));
    }
    let text = output_text(body)
        .ok_or_else(|| AppError::Extraction("response contained no output text".into()))?;
    serde_json::from_str(&text)
        .map_err(|e| AppError::Extraction(format!("invalid recipe JSON from model: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(text: &str) -> Value {
        json!({
            "id": "resp_1",
            "output": [
                { "type": "reasoning", "summary": [] },
                {
                    "type": "message",
                    "content": [ { "type": "output_text", "text": text, "annotations": [] } ]
                }
            ]
        })
    }

    #[test]
    fn test_parse_response() {
        let text = r#"{"name":"Pancakes","description":null,"cuisine":"American","meal_type":"breakfast",
            "ingredients":[{"name":"flour","amount":1.5,"nova_score":1,"calories":680,"units":"cup"}],
            "active_time":{"length":15,"units":"minutes"},"total_time":null,
            "number_of_servings":4,"steps":[{"step_number":1,"description":"Mix."}]}"#;
        let record = parse_response(&response_with(text)).unwrap();
        assert_eq!(record.name.as_deref(), Some("Pancakes"));
        assert_eq!(record.ingredients[0].calories, Some(680.0));
        assert_eq!(record.number_of_servings, Some(4.0));
        assert!(record.total_time.is_none());
    }

    #[test]
    fn test_parse_response_errors() {
        assert!(matches!(
            parse_response(&json!({ "output": [] })),
            Err(AppError::Extraction(_))
        ));
        assert!(matches!(
            parse_response(&response_with("not json")),
            Err(AppError::Extraction(_))
        ));
        let refused = json!({
            "output": [{ "type": "message", "content": [{ "type": "refusal", "refusal": "no" }] }]
        });
        assert!(matches!(parse_response(&refused), Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_request_body() {
        let body = request_body("gpt-5", "data:image/png;base64,AAAA");
        assert_eq!(body["model"], "gpt-5");
        assert_eq!(body["input"][1]["content"][0]["image_url"], "data:image/png;base64,AAAA");
        let format = &body["text"]["format"];
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["strict"], true);

        // Strict mode needs every property listed as required
        let schema = &format["schema"];
        let props = schema["properties"].as_object().unwrap();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(props.len(), required.len());
        for key in props.keys() {
            assert!(required.iter().any(|r| r == key), "{} not required", key);
        }
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("card.PNG")), "image/png");
        assert_eq!(image_mime_type(Path::new("card.jpg")), "image/jpeg");
        assert_eq!(image_mime_type(Path::new("card")), "image/jpeg");
    }

    #[test]
    fn test_missing_image() {
        let extractor =
            RecipeExtractor::new("http://127.0.0.1:9", SecretString::from("sk".to_string()), "gpt-5").unwrap();
        assert!(matches!(
            extractor.extract_from_image(Path::new("/nonexistent/card.jpg")),
            Err(AppError::NotFound(_))
        ));
    }

    fn card_image(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let image = dir.path().join("card.png");
        std::fs::write(&image, [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]).unwrap();
        image
    }

    #[tokio::test]
    async fn test_extract_from_image() {
        use wiremock::matchers::{body_partial_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let text = r#"{"name":"Lemonade","description":null,"cuisine":"American","meal_type":"beverage",
            "ingredients":[{"name":"lemon juice","amount":1,"nova_score":1,"calories":60,"units":"cup"}],
            "active_time":null,"total_time":null,"number_of_servings":4,
            "steps":[{"step_number":1,"description":"Stir."}]}"#;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-5",
                "text": { "format": { "type": "json_schema", "strict": true } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_with(text)))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = card_image(&dir);
        let base = server.uri();
        let record = tokio::task::spawn_blocking(move || {
            RecipeExtractor::new(&base, SecretString::from("sk-test".to_string()), "gpt-5")?
                .extract_from_image(&image)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(record.name.as_deref(), Some("Lemonade"));
        assert_eq!(record.number_of_servings, Some(4.0));
        assert_eq!(record.ingredients[0].calories, Some(60.0));
    }

    #[tokio::test]
    async fn test_extract_maps_error_status() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": {"message": "bad image"}})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = card_image(&dir);
        let base = server.uri();
        let result = tokio::task::spawn_blocking(move || {
            RecipeExtractor::new(&base, SecretString::from("sk-test".to_string()), "gpt-5")?
                .extract_from_image(&image)
        })
        .await
        .unwrap();

        match result {
            Err(AppError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("bad image"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
