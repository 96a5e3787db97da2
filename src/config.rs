//! Runtime configuration from environment variables

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::{AppError, AppResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5";
pub const DEFAULT_WHOOP_BASE_URL: &str = "https://api.prod.whoop.com/developer/v2";
pub const DEFAULT_RECIPES_DIR: &str = "recipes/jsons";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_path: PathBuf,
    pub recipes_dir: PathBuf,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub whoop_access_token: Option<SecretString>,
    pub whoop_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Build the configuration from a variable lookup function, so tests do
    /// not have to touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let secret = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty()).map(SecretString::from)
        };

        Self {
            database_path: get("MEALPLAN_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            recipes_dir: get("MEALPLAN_RECIPES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RECIPES_DIR)),
            openai_api_key: secret(get("OPENAI_MEAL_PLANNER_API_KEY")),
            openai_model: get("MEALPLAN_OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
            openai_base_url: get("MEALPLAN_OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            whoop_access_token: secret(get("WHOOP_ACCESS_TOKEN")),
            whoop_base_url: get("WHOOP_BASE_URL").unwrap_or_else(|| DEFAULT_WHOOP_BASE_URL.into()),
        }
    }

    pub fn require_openai_key(&self) -> AppResult<&SecretString> {
        self.openai_api_key
            .as_ref()
            .ok_or_else(|| AppError::Config("OPENAI_MEAL_PLANNER_API_KEY missing".into()))
    }

    pub fn require_whoop_token(&self) -> AppResult<&SecretString> {
        self.whoop_access_token
            .as_ref()
            .ok_or_else(|| AppError::Config("WHOOP_ACCESS_TOKEN missing".into()))
    }
}

/// `<project root>/data/recipes.db`, where the project root is found by
/// walking up out of `target/{debug,release}` when run via cargo
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("recipes.db");
    path
}
