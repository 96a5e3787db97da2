//! Utility to load a recipe JSON file into the database

use std::path::Path;

use tracing_subscriber::EnvFilter;

use mealplan::config::Config;
use mealplan::db::Database;
use mealplan::tools::recipes::load_recipe_file;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mealplan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: load_recipe <recipe.json>");
        std::process::exit(2);
    };

    let config = Config::from_env();
    let db_path = &config.database_path;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", db_path.display());

    let database = Database::open_migrated(db_path)?;
    let stored = load_recipe_file(&database, Path::new(&path))?;
    println!("Inserted recipe id={}", stored.id);

    Ok(())
}
