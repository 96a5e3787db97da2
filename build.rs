//! Build script for mealplan
//!
//! Embeds the build timestamp and an optional CI build number.

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=MEALPLAN_BUILD_NUMBER");

    // CI sets the number; local builds report 0
    let build_number: u64 = std::env::var("MEALPLAN_BUILD_NUMBER")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=MEALPLAN_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=MEALPLAN_BUILD_TIMESTAMP={}", timestamp);
}
