//! Build information
//!
//! Metadata embedded by `build.rs` for the startup banner.

/// CI build number, "0" for local builds
const BUILD_NUMBER: &str = match option_env!("MEALPLAN_BUILD_NUMBER") {
    Some(s) => s,
    None => "0",
};

const BUILD_TIMESTAMP: &str = match option_env!("MEALPLAN_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

fn banner() -> String {
    format!(
        "{} {} (build {}, {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        BUILD_NUMBER,
        BUILD_TIMESTAMP
    )
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    eprintln!("{}", banner());
}
