//! Physical activity level bands

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Activity category, ordered from least to most active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    #[serde(rename = "low active", alias = "low_active")]
    LowActive,
    Active,
    #[serde(rename = "very active", alias = "very_active")]
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LowActive,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
        ActivityLevel::Athlete,
    ];

    /// PAL multiplier for this band
    pub fn pal(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LowActive => 1.5,
            ActivityLevel::Active => 1.75,
            ActivityLevel::VeryActive => 2.2,
            ActivityLevel::Athlete => 2.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LowActive => "low active",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very active",
            ActivityLevel::Athlete => "athlete",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "low active" => Ok(ActivityLevel::LowActive),
            "active" => Ok(ActivityLevel::Active),
            "very active" => Ok(ActivityLevel::VeryActive),
            "athlete" => Ok(ActivityLevel::Athlete),
            _ => Err(CalcError::validation(format!("Invalid PAL category: {}", s))),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pal_table() {
        let pals: Vec<f64> = ActivityLevel::ALL.iter().map(ActivityLevel::pal).collect();
        assert_eq!(pals, vec![1.2, 1.5, 1.75, 2.2, 2.5]);
    }

    #[test]
    fn test_bands_are_ordered() {
        assert!(ActivityLevel::Sedentary < ActivityLevel::Athlete);
        assert!(ActivityLevel::ALL.windows(2).all(|w| w[0].pal() < w[1].pal()));
    }

    #[test]
    fn test_parse() {
        assert_eq!("low active".parse::<ActivityLevel>(), Ok(ActivityLevel::LowActive));
        assert_eq!("very_active".parse::<ActivityLevel>(), Ok(ActivityLevel::VeryActive));
        assert_eq!("Athlete".parse::<ActivityLevel>(), Ok(ActivityLevel::Athlete));
        assert!(matches!("couch".parse::<ActivityLevel>(), Err(CalcError::Validation(_))));
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for level in ActivityLevel::ALL {
            let json = serde_json::to_value(level).unwrap();
            assert_eq!(json, serde_json::Value::from(level.as_str()));
            assert_eq!(serde_json::from_value::<ActivityLevel>(json).unwrap(), level);
        }
        let legacy: ActivityLevel = serde_json::from_str("\"low_active\"").unwrap();
        assert_eq!(legacy, ActivityLevel::LowActive);
    }

    #[test]
    fn test_display_round_trip() {
        for level in ActivityLevel::ALL {
            assert_eq!(level.to_string().parse::<ActivityLevel>(), Ok(level));
        }
    }
}
