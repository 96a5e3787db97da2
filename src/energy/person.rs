//! Person energy model
//!
//! Anthropometric state plus the derived BMR, TDEE and daily intake target.
//! Quantities are held in canonical units (kg, cm, kg/week) and converted at
//! the accessor boundary. Derived values are recomputed on every call.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::activity::ActivityLevel;
use super::bmr::{self, BmrMode, Sex};
use crate::error::{CalcError, CalcResult};
use crate::units::{feet_inches_to_cm, LengthUnit, MassUnit, RateUnit};

/// Approximate energy content of one kilogram of body mass change
pub const KCAL_PER_KG_BODY_MASS: f64 = 7700.0;

const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Where the PAL multiplier comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum PalSource {
    /// Fixed table lookup by activity band
    Category(ActivityLevel),
    /// Explicit multiplier, e.g. measured by a wearable
    Numeric(f64),
}

/// A person's energy-balance inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersonRecord")]
pub struct Person {
    sex: Sex,
    weight_kg: f64,
    height_cm: f64,
    birthday: Option<NaiveDate>,
    pal_source: PalSource,
    body_fat_percent: Option<f64>,
    bmr_mode: BmrMode,
    weight_change_kg_per_week: f64,
}

/// Wire form of `Person`; every field goes back through the setters
#[derive(Deserialize)]
struct PersonRecord {
    sex: Sex,
    #[serde(default)]
    weight_kg: f64,
    #[serde(default)]
    height_cm: f64,
    #[serde(default)]
    birthday: Option<NaiveDate>,
    #[serde(default = "default_pal_source")]
    pal_source: PalSource,
    #[serde(default)]
    body_fat_percent: Option<f64>,
    #[serde(default)]
    bmr_mode: BmrMode,
    #[serde(default)]
    weight_change_kg_per_week: f64,
}

fn default_pal_source() -> PalSource {
    PalSource::Category(ActivityLevel::default())
}

impl TryFrom<PersonRecord> for Person {
    type Error = CalcError;

    fn try_from(raw: PersonRecord) -> CalcResult<Self> {
        let mut person = match raw.pal_source {
            PalSource::Category(level) => {
                let mut p = Person::new(raw.sex);
                p.set_activity_level(level);
                p
            }
            PalSource::Numeric(pal) => Person::with_numeric_pal(raw.sex, pal),
        };
        person.set_weight(raw.weight_kg, MassUnit::Kilogram)?;
        person.set_height(raw.height_cm, LengthUnit::Centimeter)?;
        if let Some(birthday) = raw.birthday {
            person.set_birthday(birthday);
        }
        if let Some(percent) = raw.body_fat_percent {
            person.set_body_fat_percent(percent)?;
        }
        person.set_bmr_mode(raw.bmr_mode);
        person.set_weight_change_rate(raw.weight_change_kg_per_week, RateUnit::KilogramPerWeek)?;
        Ok(person)
    }
}

/// Snapshot of all derived energy values for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySummary {
    pub date: NaiveDate,
    pub bmr_mode: BmrMode,
    pub bmr_kcal: f64,
    pub pal: f64,
    pub tdee_kcal: f64,
    pub daily_deviation_kcal: f64,
    pub daily_target_kcal: f64,
}

impl Person {
    /// Create a person with the categorical PAL table (sedentary by default)
    pub fn new(sex: Sex) -> Self {
        Self {
            sex,
            weight_kg: 0.0,
            height_cm: 0.0,
            birthday: None,
            pal_source: PalSource::Category(ActivityLevel::default()),
            body_fat_percent: None,
            bmr_mode: BmrMode::default(),
            weight_change_kg_per_week: 0.0,
        }
    }

    /// Create a person whose PAL is a fixed number instead of a category.
    ///
    /// The value is checked when TDEE is computed.
    pub fn with_numeric_pal(sex: Sex, pal: f64) -> Self {
        Self {
            pal_source: PalSource::Numeric(pal),
            ..Self::new(sex)
        }
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
    }

    // ---- Weight / height ------------------------------------------------

    pub fn weight(&self, unit: MassUnit) -> f64 {
        unit.from_canonical(self.weight_kg)
    }

    pub fn set_weight(&mut self, weight: f64, unit: MassUnit) -> CalcResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(CalcError::validation(format!("Invalid weight: {}", weight)));
        }
        self.weight_kg = unit.to_canonical(weight);
        Ok(())
    }

    pub fn height(&self, unit: LengthUnit) -> f64 {
        unit.from_canonical(self.height_cm)
    }

    pub fn set_height(&mut self, height: f64, unit: LengthUnit) -> CalcResult<()> {
        if !height.is_finite() || height < 0.0 {
            return Err(CalcError::validation(format!("Invalid height: {}", height)));
        }
        self.height_cm = unit.to_canonical(height);
        Ok(())
    }

    pub fn set_height_feet_inches(&mut self, feet: u32, inches: f64) -> CalcResult<()> {
        self.set_height(feet_inches_to_cm(feet, inches), LengthUnit::Centimeter)
    }

    // ---- Birthday / age -------------------------------------------------

    pub fn birthday(&self) -> Option<NaiveDate> {
        self.birthday
    }

    pub fn set_birthday(&mut self, birthday: NaiveDate) {
        self.birthday = Some(birthday);
    }

    /// Set the birthday from an ISO `YYYY-MM-DD` string
    pub fn set_birthday_str(&mut self, birthday: &str) -> CalcResult<()> {
        let date = NaiveDate::parse_from_str(birthday.trim(), "%Y-%m-%d")
            .map_err(|_| CalcError::validation(format!("Birthday must be a date, got '{}'", birthday)))?;
        self.set_birthday(date);
        Ok(())
    }

    /// Age in years on `date`, counting 365.25 days per year
    pub fn age_years_on(&self, date: NaiveDate) -> CalcResult<f64> {
        let birthday = self
            .birthday
            .ok_or_else(|| CalcError::missing("Birthday is not set, cannot calculate age."))?;
        Ok((date - birthday).num_days() as f64 / DAYS_PER_YEAR)
    }

    /// Age in years as of today
    pub fn age_years(&self) -> CalcResult<f64> {
        self.age_years_on(today())
    }

    // ---- Activity -------------------------------------------------------

    pub fn pal_source(&self) -> PalSource {
        self.pal_source
    }

    /// Activity band, or `None` for a numeric-PAL person
    pub fn activity_level(&self) -> Option<ActivityLevel> {
        match self.pal_source {
            PalSource::Category(level) => Some(level),
            PalSource::Numeric(_) => None,
        }
    }

    /// Switch to (or change) the categorical PAL band
    pub fn set_activity_level(&mut self, level: ActivityLevel) {
        self.pal_source = PalSource::Category(level);
    }

    /// Set the PAL band from its name, e.g. `"low active"`
    pub fn set_activity_category(&mut self, category: &str) -> CalcResult<()> {
        self.set_activity_level(category.parse()?);
        Ok(())
    }

    pub fn pal(&self) -> f64 {
        match self.pal_source {
            PalSource::Category(level) => level.pal(),
            PalSource::Numeric(pal) => pal,
        }
    }

    // ---- Body composition / formula ------------------------------------

    pub fn body_fat_percent(&self) -> Option<f64> {
        self.body_fat_percent
    }

    pub fn set_body_fat_percent(&mut self, percent: f64) -> CalcResult<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(CalcError::validation(format!(
                "Body fat percent must be within 0-100, got {}",
                percent
            )));
        }
        self.body_fat_percent = Some(percent);
        Ok(())
    }

    pub fn clear_body_fat_percent(&mut self) {
        self.body_fat_percent = None;
    }

    pub fn bmr_mode(&self) -> BmrMode {
        self.bmr_mode
    }

    pub fn set_bmr_mode(&mut self, mode: BmrMode) {
        self.bmr_mode = mode;
    }

    // ---- Weight change --------------------------------------------------

    /// Desired weekly weight change; negative for loss
    pub fn weight_change_rate(&self, unit: RateUnit) -> f64 {
        unit.from_canonical(self.weight_change_kg_per_week)
    }

    pub fn set_weight_change_rate(&mut self, rate: f64, unit: RateUnit) -> CalcResult<()> {
        if !rate.is_finite() {
            return Err(CalcError::validation(format!("Invalid weight change rate: {}", rate)));
        }
        self.weight_change_kg_per_week = unit.to_canonical(rate);
        Ok(())
    }

    /// Daily kcal surplus (positive) or deficit (negative) for the weekly rate
    pub fn daily_caloric_deviation(&self) -> f64 {
        if self.weight_change_kg_per_week == 0.0 {
            return 0.0;
        }
        self.weight_change_kg_per_week * KCAL_PER_KG_BODY_MASS / DAYS_PER_WEEK
    }

    // ---- Derived energy -------------------------------------------------

    /// BMR in kcal/day on `date` with the selected formula
    pub fn bmr_on(&self, date: NaiveDate) -> CalcResult<f64> {
        match self.bmr_mode {
            BmrMode::MifflinStJeor => Ok(bmr::mifflin_st_jeor(
                self.weight_kg,
                self.height_cm,
                self.age_years_on(date)?,
                self.sex,
            )),
            BmrMode::HarrisBenedictRevised => Ok(bmr::harris_benedict_revised(
                self.weight_kg,
                self.height_cm,
                self.age_years_on(date)?,
                self.sex,
            )),
            BmrMode::KatchMcArdle => {
                let body_fat = self
                    .body_fat_percent
                    .ok_or_else(|| CalcError::missing("Katch-McArdle requires body_fat_percent."))?;
                Ok(bmr::katch_mcardle(self.weight_kg, body_fat))
            }
        }
    }

    /// BMR in kcal/day as of today
    pub fn bmr(&self) -> CalcResult<f64> {
        self.bmr_on(today())
    }

    /// Total daily energy expenditure in kcal/day on `date`
    pub fn tdee_on(&self, date: NaiveDate) -> CalcResult<f64> {
        let pal = self.pal();
        if !pal.is_finite() || pal <= 0.0 {
            return Err(CalcError::validation("PAL must be > 0."));
        }
        Ok(self.bmr_on(date)? * pal)
    }

    pub fn tdee(&self) -> CalcResult<f64> {
        self.tdee_on(today())
    }

    /// Daily total caloric intake target on `date`
    pub fn daily_target_intake_on(&self, date: NaiveDate) -> CalcResult<f64> {
        Ok(self.tdee_on(date)? + self.daily_caloric_deviation())
    }

    pub fn daily_target_intake(&self) -> CalcResult<f64> {
        self.daily_target_intake_on(today())
    }

    /// All derived values for `date` in one pass
    pub fn summary_on(&self, date: NaiveDate) -> CalcResult<EnergySummary> {
        let bmr_kcal = self.bmr_on(date)?;
        let tdee_kcal = self.tdee_on(date)?;
        let daily_deviation_kcal = self.daily_caloric_deviation();
        Ok(EnergySummary {
            date,
            bmr_mode: self.bmr_mode,
            bmr_kcal,
            pal: self.pal(),
            tdee_kcal,
            daily_deviation_kcal,
            daily_target_kcal: tdee_kcal + daily_deviation_kcal,
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// PAL measured from a day's total energy expenditure
///
/// # Errors
///
/// `CalcError::Validation` if `bmr_kcal` is not positive.
pub fn empirical_pal(measured_kcal: f64, bmr_kcal: f64) -> CalcResult<f64> {
    Ok(measured_kcal / ensure_positive_bmr(bmr_kcal)?)
}

/// Reject a BMR that cannot be used as a PAL denominator
pub fn ensure_positive_bmr(bmr_kcal: f64) -> CalcResult<f64> {
    if !bmr_kcal.is_finite() || bmr_kcal <= 0.0 {
        return Err(CalcError::validation("BMR must be > 0."));
    }
    Ok(bmr_kcal)
}
