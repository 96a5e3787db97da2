//! Energy balance module
//!
//! BMR formulas, activity bands and the `Person` model that combines them
//! into TDEE and a daily intake target.

pub mod activity;
pub mod bmr;
pub mod person;

pub use activity::ActivityLevel;
pub use bmr::{harris_benedict_revised, katch_mcardle, mifflin_st_jeor, BmrMode, Sex};
pub use person::{empirical_pal, ensure_positive_bmr, EnergySummary, PalSource, Person, KCAL_PER_KG_BODY_MASS};
