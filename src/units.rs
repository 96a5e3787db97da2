//! Unit types and conversion constants
//!
//! Body quantities are stored in one canonical unit per dimension
//! (kg, cm, kg/week, kcal). Each unit enum converts to and from that
//! canonical unit with exact factors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Kilograms per pound (exact, international avoirdupois pound)
pub const KG_PER_LB: f64 = 0.45359237;
/// Centimeters per inch (exact)
pub const CM_PER_IN: f64 = 2.54;
/// Inches per foot
pub const IN_PER_FT: f64 = 12.0;
/// Kilojoules per kilocalorie (thermochemical calorie)
pub const KJ_PER_KCAL: f64 = 4.184;

/// Mass units accepted by weight accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassUnit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
}

impl MassUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MassUnit::Kilogram => "kg",
            MassUnit::Pound => "lb",
        }
    }

    /// Convert a value in this unit to kilograms
    pub fn to_canonical(&self, value: f64) -> f64 {
        match self {
            MassUnit::Kilogram => value,
            MassUnit::Pound => value * KG_PER_LB,
        }
    }

    /// Convert a value in kilograms to this unit
    pub fn from_canonical(&self, kg: f64) -> f64 {
        match self {
            MassUnit::Kilogram => kg,
            MassUnit::Pound => kg / KG_PER_LB,
        }
    }
}

impl FromStr for MassUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(MassUnit::Kilogram),
            "lb" | "lbs" | "pound" | "pounds" => Ok(MassUnit::Pound),
            other => Err(CalcError::validation(format!("unknown mass unit '{}'", other))),
        }
    }
}

/// Length units accepted by height accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "in")]
    Inch,
}

impl LengthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Centimeter => "cm",
            LengthUnit::Inch => "in",
        }
    }

    /// Convert a value in this unit to centimeters
    pub fn to_canonical(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Centimeter => value,
            LengthUnit::Inch => value * CM_PER_IN,
        }
    }

    /// Convert a value in centimeters to this unit
    pub fn from_canonical(&self, cm: f64) -> f64 {
        match self {
            LengthUnit::Centimeter => cm,
            LengthUnit::Inch => cm / CM_PER_IN,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(LengthUnit::Centimeter),
            "in" | "inch" | "inches" => Ok(LengthUnit::Inch),
            other => Err(CalcError::validation(format!("unknown length unit '{}'", other))),
        }
    }
}

/// Weekly weight-change rate units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateUnit {
    #[serde(rename = "kg/week")]
    KilogramPerWeek,
    #[serde(rename = "lb/week")]
    PoundPerWeek,
}

impl RateUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateUnit::KilogramPerWeek => "kg/week",
            RateUnit::PoundPerWeek => "lb/week",
        }
    }

    /// Convert a rate in this unit to kg/week
    pub fn to_canonical(&self, value: f64) -> f64 {
        match self {
            RateUnit::KilogramPerWeek => value,
            RateUnit::PoundPerWeek => value * KG_PER_LB,
        }
    }

    /// Convert a rate in kg/week to this unit
    pub fn from_canonical(&self, kg_per_week: f64) -> f64 {
        match self {
            RateUnit::KilogramPerWeek => kg_per_week,
            RateUnit::PoundPerWeek => kg_per_week / KG_PER_LB,
        }
    }
}

impl FromStr for RateUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "kg/week" | "kg/wk" | "kgs/week" => Ok(RateUnit::KilogramPerWeek),
            "lb/week" | "lb/wk" | "lbs/week" => Ok(RateUnit::PoundPerWeek),
            other => Err(CalcError::validation(format!("unknown rate unit '{}'", other))),
        }
    }
}

/// Energy units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "kcal")]
    Kilocalorie,
    #[serde(rename = "kJ")]
    Kilojoule,
}

impl EnergyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyUnit::Kilocalorie => "kcal",
            EnergyUnit::Kilojoule => "kJ",
        }
    }

    /// Convert a value in this unit to kilocalories
    pub fn to_canonical(&self, value: f64) -> f64 {
        match self {
            EnergyUnit::Kilocalorie => value,
            EnergyUnit::Kilojoule => value / KJ_PER_KCAL,
        }
    }

    /// Convert a value in kilocalories to this unit
    pub fn from_canonical(&self, kcal: f64) -> f64 {
        match self {
            EnergyUnit::Kilocalorie => kcal,
            EnergyUnit::Kilojoule => kcal * KJ_PER_KCAL,
        }
    }
}

impl FromStr for EnergyUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kcal" | "kilocalorie" | "kilocalories" => Ok(EnergyUnit::Kilocalorie),
            "kj" | "kilojoule" | "kilojoules" => Ok(EnergyUnit::Kilojoule),
            other => Err(CalcError::validation(format!("unknown energy unit '{}'", other))),
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(MassUnit, LengthUnit, RateUnit, EnergyUnit);

/// Compose a height given in feet and inches into centimeters
pub fn feet_inches_to_cm(feet: u32, inches: f64) -> f64 {
    (f64::from(feet) * IN_PER_FT + inches) * CM_PER_IN
}

/// Convert kilojoules to kilocalories
pub fn kj_to_kcal(kj: f64) -> f64 {
    EnergyUnit::Kilojoule.to_canonical(kj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_pound_round_trip() {
        let kg = MassUnit::Pound.to_canonical(150.0);
        assert!((kg - 150.0 / 2.2046226218).abs() < 1e-6);
        assert!(close(MassUnit::Pound.from_canonical(kg), 150.0));
    }

    #[test]
    fn test_inch_round_trip() {
        let cm = LengthUnit::Inch.to_canonical(74.0);
        assert!(close(cm, 187.96));
        assert!(close(LengthUnit::Inch.from_canonical(cm), 74.0));
    }

    #[test]
    fn test_feet_inches() {
        assert!(close(feet_inches_to_cm(6, 2.0), 187.96));
        assert!(close(feet_inches_to_cm(5, 0.0), 152.4));
    }

    #[test]
    fn test_rate_round_trip() {
        let kg = RateUnit::PoundPerWeek.to_canonical(-2.0);
        assert!(close(kg, -0.90718474));
        assert!(close(RateUnit::PoundPerWeek.from_canonical(kg), -2.0));
    }

    #[test]
    fn test_kj_to_kcal() {
        assert!(close(kj_to_kcal(4184.0), 1000.0));
        assert!(close(EnergyUnit::Kilojoule.from_canonical(1000.0), 4184.0));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("lbs".parse::<MassUnit>(), Ok(MassUnit::Pound));
        assert_eq!(" KG ".parse::<MassUnit>(), Ok(MassUnit::Kilogram));
        assert_eq!("in".parse::<LengthUnit>(), Ok(LengthUnit::Inch));
        assert_eq!("lb / week".parse::<RateUnit>(), Ok(RateUnit::PoundPerWeek));
        assert_eq!("kJ".parse::<EnergyUnit>(), Ok(EnergyUnit::Kilojoule));
    }

    #[test]
    fn test_unknown_unit_is_validation_error() {
        assert!(matches!("stone".parse::<MassUnit>(), Err(CalcError::Validation(_))));
        assert!(matches!("ft".parse::<LengthUnit>(), Err(CalcError::Validation(_))));
        assert!(matches!("g/day".parse::<RateUnit>(), Err(CalcError::Validation(_))));
        // Small calories are not kilocalories
        assert!(matches!("cal".parse::<EnergyUnit>(), Err(CalcError::Validation(_))));
        assert_eq!("Kilocalories".parse::<EnergyUnit>(), Ok(EnergyUnit::Kilocalorie));
    }
}
