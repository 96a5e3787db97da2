//! Basal metabolic rate formulas
//!
//! # References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy
//!   expenditure in healthy individuals. *Am J Clin Nutr*, 51(2), 241-247.
//! - Roza, A.M., & Shizgal, H.M. (1984). The Harris Benedict equation reevaluated.
//!   *Am J Clin Nutr*, 40(1), 168-182.
//! - Katch, F.I., & McArdle, W.D. (1996). *Nutrition, Weight Control, and Exercise*.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Biological sex, used only to pick a formula branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(CalcError::validation(format!("Invalid sex: {}", other))),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which BMR formula a person uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmrMode {
    #[default]
    MifflinStJeor,
    HarrisBenedictRevised,
    #[serde(rename = "katch_mcardle")]
    KatchMcArdle,
}

impl BmrMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmrMode::MifflinStJeor => "mifflin_st_jeor",
            BmrMode::HarrisBenedictRevised => "harris_benedict_revised",
            BmrMode::KatchMcArdle => "katch_mcardle",
        }
    }

    /// Whether the formula uses age
    pub fn needs_age(&self) -> bool {
        !matches!(self, BmrMode::KatchMcArdle)
    }
}

impl FromStr for BmrMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "mifflin_st_jeor" | "mifflin" => Ok(BmrMode::MifflinStJeor),
            "harris_benedict_revised" | "harris_benedict" => Ok(BmrMode::HarrisBenedictRevised),
            "katch_mcardle" | "katch" => Ok(BmrMode::KatchMcArdle),
            other => Err(CalcError::validation(format!("Unknown BMR mode: {}", other))),
        }
    }
}

impl fmt::Display for BmrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mifflin-St Jeor BMR in kcal/day
///
/// `10 * weight_kg + 6.25 * height_cm - 5 * age + s`, with `s = +5` for men
/// and `-161` for women.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: f64, sex: Sex) -> f64 {
    let sex_offset = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + sex_offset
}

/// Revised Harris-Benedict BMR (Roza & Shizgal) in kcal/day
pub fn harris_benedict_revised(weight_kg: f64, height_cm: f64, age_years: f64, sex: Sex) -> f64 {
    match sex {
        Sex::Male => 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age_years + 88.362,
        Sex::Female => 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age_years + 447.593,
    }
}

/// Katch-McArdle BMR in kcal/day from fat-free mass
pub fn katch_mcardle(weight_kg: f64, body_fat_percent: f64) -> f64 {
    let fat_free_mass_kg = weight_kg * (1.0 - body_fat_percent / 100.0);
    370.0 + 21.6 * fat_free_mass_kg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mifflin_st_jeor() {
        let bmr = mifflin_st_jeor(93.0, 188.0, 25.0, Sex::Male);
        assert!((bmr - 1985.0).abs() < 1e-9);

        let bmr = mifflin_st_jeor(60.0, 165.0, 30.0, Sex::Female);
        assert!((bmr - 1320.25).abs() < 1e-9);
    }

    #[test]
    fn test_harris_benedict_revised() {
        let male = harris_benedict_revised(80.0, 180.0, 40.0, Sex::Male);
        let expected = 13.397 * 80.0 + 4.799 * 180.0 - 5.677 * 40.0 + 88.362;
        assert!((male - expected).abs() < 1e-9);

        let female = harris_benedict_revised(60.0, 165.0, 30.0, Sex::Female);
        assert!((female - 1383.683).abs() < 1e-9);
    }

    #[test]
    fn test_katch_mcardle() {
        // 80 kg at 20% fat = 64 kg fat-free
        assert!((katch_mcardle(80.0, 20.0) - 1752.4).abs() < 1e-9);
        assert!((katch_mcardle(80.0, 0.0) - 2098.0).abs() < 1e-9);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("katch-mcardle".parse::<BmrMode>(), Ok(BmrMode::KatchMcArdle));
        assert_eq!("Mifflin St Jeor".parse::<BmrMode>(), Ok(BmrMode::MifflinStJeor));
        assert_eq!(BmrMode::default(), BmrMode::MifflinStJeor);
        assert!("cunningham".parse::<BmrMode>().is_err());
    }

    #[test]
    fn test_mode_serde_name_matches_as_str() {
        for mode in [BmrMode::MifflinStJeor, BmrMode::HarrisBenedictRevised, BmrMode::KatchMcArdle] {
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, serde_json::Value::from(mode.as_str()));
            assert_eq!(serde_json::from_value::<BmrMode>(json).unwrap(), mode);
        }
    }

    #[test]
    fn test_sex_parse() {
        assert_eq!("Female".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!("m".parse::<Sex>(), Ok(Sex::Male));
        assert!("x".parse::<Sex>().is_err());
    }
}
