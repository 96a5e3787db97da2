//! Meal Planner
//!
//! Command-line entry point for recipe extraction, annotation and energy
//! balance calculations.

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use mealplan::build_info;
use mealplan::config::Config;
use mealplan::db::Database;
use mealplan::energy::{ActivityLevel, BmrMode, Person, Sex};
use mealplan::error::{AppError, AppResult, CalcError};
use mealplan::nutrition::annotate_recipe_file;
use mealplan::tools::recipes;
use mealplan::units::{LengthUnit, MassUnit, RateUnit};
use mealplan::whoop::{utc_day_window, WhoopClient};

const USAGE: &str = "\
Usage:
  mealplan add <image>
  mealplan annotate <recipe.json>
  mealplan load <recipe.json>
  mealplan show <id>
  mealplan energy <male|female> <weight> <kg|lb> <height> <cm|in> <YYYY-MM-DD> [activity] [bmr-mode] [rate-kg-per-week] [body-fat-%]
  mealplan pal <YYYY-MM-DD> <bmr-kcal>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so command output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mealplan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_env();

    if let Err(e) = run(&config, &args) {
        eprintln!("Error: {}", e);
        if matches!(e, AppError::Usage(_)) {
            eprintln!("{}", USAGE);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(config: &Config, args: &[String]) -> AppResult<()> {
    let (command, rest) = args
        .split_first()
        .ok_or_else(|| AppError::Usage("missing command".into()))?;

    match (command.as_str(), rest) {
        ("add", [image]) => {
            let db = open_database(config)?;
            let added = recipes::add_recipe_from_image(config, &db, Path::new(image))?;
            print_json(&added)
        }
        ("annotate", [path]) => {
            let recipe = annotate_recipe_file(path)?;
            print_json(&json!({
                "calories_per_serving": recipe["calories_per_serving"],
                "nova_score": recipe["nova_score"],
            }))
        }
        ("load", [path]) => {
            let db = open_database(config)?;
            let stored = recipes::load_recipe_file(&db, Path::new(path))?;
            println!("Inserted recipe id={}", stored.id);
            Ok(())
        }
        ("show", [id]) => {
            let id: i64 = id
                .parse()
                .map_err(|_| AppError::Usage(format!("recipe id must be an integer, got '{}'", id)))?;
            let db = open_database(config)?;
            let record = recipes::get_recipe(&db, id)?.ok_or(AppError::RecipeNotFound(id))?;
            print_json(&record)
        }
        ("energy", args) if (6..=10).contains(&args.len()) => {
            let person = person_from_args(args)?;
            print_json(&person.summary_on(Local::now().date_naive())?)
        }
        ("pal", [day, bmr]) => {
            let day = parse_date(day)?;
            let bmr = parse_number(bmr, "BMR")?;
            let client = WhoopClient::new(&config.whoop_base_url, config.require_whoop_token()?.clone())?;
            let (start, end) = utc_day_window(day);
            let pal = client.pal_for_day(bmr, start, end)?;
            print_json(&json!({ "date": day, "bmr_kcal": bmr, "pal": pal }))
        }
        (other, _) => Err(AppError::Usage(format!("unknown command or wrong arguments: {}", other))),
    }
}

fn open_database(config: &Config) -> AppResult<Database> {
    let path = &config.database_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!("Database path: {}", path.display());
    Ok(Database::open_migrated(path)?)
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_number(s: &str, what: &str) -> AppResult<f64> {
    s.trim()
        .parse()
        .map_err(|_| CalcError::validation(format!("{} must be a number, got '{}'", what, s)).into())
}

fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CalcError::validation(format!("expected YYYY-MM-DD, got '{}'", s)).into())
}

/// Build a person from the positional `energy` arguments
fn person_from_args(args: &[String]) -> AppResult<Person> {
    let sex: Sex = args[0].parse()?;
    let mut person = Person::new(sex);

    let weight_unit: MassUnit = args[2].parse()?;
    person.set_weight(parse_number(&args[1], "weight")?, weight_unit)?;
    let height_unit: LengthUnit = args[4].parse()?;
    person.set_height(parse_number(&args[3], "height")?, height_unit)?;
    person.set_birthday_str(&args[5])?;

    if let Some(activity) = args.get(6) {
        person.set_activity_level(activity.parse::<ActivityLevel>()?);
    }
    if let Some(mode) = args.get(7) {
        person.set_bmr_mode(mode.parse::<BmrMode>()?);
    }
    if let Some(rate) = args.get(8) {
        person.set_weight_change_rate(parse_number(rate, "rate")?, RateUnit::KilogramPerWeek)?;
    }
    if let Some(body_fat) = args.get(9) {
        person.set_body_fat_percent(parse_number(body_fat, "body fat")?)?;
    }
    Ok(person)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_person_from_args() {
        let person = person_from_args(&args(&[
            "male", "205", "lb", "74", "in", "1999-07-21", "active", "harris-benedict", "-0.5",
        ]))
        .unwrap();
        assert!((person.weight(MassUnit::Kilogram) - 92.98643585).abs() < 1e-6);
        assert!((person.height(LengthUnit::Centimeter) - 187.96).abs() < 1e-9);
        assert_eq!(person.activity_level(), Some(ActivityLevel::Active));
        assert_eq!(person.bmr_mode(), BmrMode::HarrisBenedictRevised);
        assert_eq!(person.weight_change_rate(RateUnit::KilogramPerWeek), -0.5);
        assert!((person.daily_caloric_deviation() + 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_person_from_args_rejects_bad_input() {
        let bad_unit = args(&["male", "80", "stone", "180", "cm", "1990-01-01"]);
        assert!(matches!(person_from_args(&bad_unit), Err(AppError::Calc(_))));
        let bad_date = args(&["female", "60", "kg", "165", "cm", "01/02/1990"]);
        assert!(matches!(person_from_args(&bad_date), Err(AppError::Calc(_))));
        let bad_activity = args(&["female", "60", "kg", "165", "cm", "1990-01-02", "couch"]);
        assert!(matches!(person_from_args(&bad_activity), Err(AppError::Calc(_))));
    }

    #[test]
    fn test_run_usage_errors() {
        let config = Config::from_env_with(|_| None);
        assert!(matches!(run(&config, &[]), Err(AppError::Usage(_))));
        assert!(matches!(run(&config, &args(&["bake"])), Err(AppError::Usage(_))));
        assert!(matches!(run(&config, &args(&["show", "abc"])), Err(AppError::Usage(_))));
        assert!(matches!(
            run(&config, &args(&["pal", "2025-01-01", "1800"])),
            Err(AppError::Config(_))
        ));
    }
}
