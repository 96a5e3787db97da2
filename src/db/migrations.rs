//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: recipes, ingredients and steps
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            cuisine TEXT,
            meal_type TEXT CHECK(meal_type IN
                ('breakfast', 'lunch', 'dinner', 'dessert', 'snack', 'beverage', 'condiment')),
            scaling_category TEXT CHECK(scaling_category IN ('discrete', 'continuous')),

            -- Times kept as length + units, as extracted
            active_time_length REAL,
            active_time_units TEXT,
            total_time_length REAL,
            total_time_units TEXT,

            number_of_servings REAL,
            calories_per_serving REAL,
            nova_score REAL,              -- NULL when no ingredient was scored

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(name, cuisine)
        );

        CREATE INDEX ix_recipe_name ON recipes(name);

        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            name TEXT,
            amount REAL,
            nova_score REAL,
            calories REAL,
            units TEXT
        );

        CREATE INDEX ix_ingredients_recipe ON ingredients(recipe_id);

        CREATE TABLE steps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            step_number INTEGER NOT NULL,
            description TEXT NOT NULL
        );

        CREATE INDEX ix_steps_recipe ON steps(recipe_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
