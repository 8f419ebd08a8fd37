//! Health profile captured from the settings form.
//!
//! The profile is stored but never consumed by step detection. Weight and
//! height are kept in the unit they were entered in, with conversions for
//! display.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::PacerError;

pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;
pub const HEIGHT_RANGE: RangeInclusive<u32> = 30..=275;
pub const WEIGHT_RANGE: RangeInclusive<u32> = 1..=454;

const LBS_PER_KG: f64 = 2.20462;
const FEET_PER_CM: f64 = 0.0328084;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("Male"),
            Sex::Female => f.write_str("Female"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    Feet,
}

impl WeightUnit {
    fn label(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }

    fn other(self) -> Self {
        match self {
            WeightUnit::Kg => WeightUnit::Lbs,
            WeightUnit::Lbs => WeightUnit::Kg,
        }
    }
}

impl HeightUnit {
    fn label(self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Feet => "feet",
        }
    }

    fn other(self) -> Self {
        match self {
            HeightUnit::Cm => HeightUnit::Feet,
            HeightUnit::Feet => HeightUnit::Cm,
        }
    }
}

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / LBS_PER_KG
}

pub fn cm_to_feet(cm: f64) -> f64 {
    cm * FEET_PER_CM
}

pub fn feet_to_cm(feet: f64) -> f64 {
    feet / FEET_PER_CM
}

/// Weight value followed by its conversion, e.g. `72.00 kg (158.73 lbs)`.
pub fn format_weight(value: f64, unit: WeightUnit) -> String {
    let converted = match unit {
        WeightUnit::Kg => kg_to_lbs(value),
        WeightUnit::Lbs => lbs_to_kg(value),
    };
    format!(
        "{value:.2} {} ({converted:.2} {})",
        unit.label(),
        unit.other().label()
    )
}

/// Height value followed by its conversion, e.g. `180.00 cm (5.91 feet)`.
pub fn format_height(value: f64, unit: HeightUnit) -> String {
    let converted = match unit {
        HeightUnit::Cm => cm_to_feet(value),
        HeightUnit::Feet => feet_to_cm(value),
    };
    format!(
        "{value:.2} {} ({converted:.2} {})",
        unit.label(),
        unit.other().label()
    )
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthProfile {
    pub age: u32,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub height: f64,
    pub height_unit: HeightUnit,
    pub sex: Sex,
}

impl HealthProfile {
    /// Validated profile. Weight and height are range-checked in the unit
    /// they are given in, as offered by the form.
    pub fn new(
        age: u32,
        weight: f64,
        weight_unit: WeightUnit,
        height: f64,
        height_unit: HeightUnit,
        sex: Sex,
    ) -> Result<Self, PacerError> {
        if !AGE_RANGE.contains(&age) {
            return Err(PacerError::Validation(format!(
                "age {age} outside {}..={}",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            )));
        }
        check_range("weight", weight, &WEIGHT_RANGE)?;
        check_range("height", height, &HEIGHT_RANGE)?;
        Ok(Self {
            age,
            weight,
            weight_unit,
            height,
            height_unit,
            sex,
        })
    }

    /// Build a profile from raw form strings. Unparseable numbers become 0
    /// and are then rejected by validation.
    pub fn from_form(
        age: &str,
        weight: &str,
        weight_unit: WeightUnit,
        height: &str,
        height_unit: HeightUnit,
        sex: &str,
    ) -> Result<Self, PacerError> {
        let age = age.trim().parse().unwrap_or(0);
        let weight = weight.trim().parse().unwrap_or(0.0);
        let height = height.trim().parse().unwrap_or(0.0);
        let sex = Sex::parse(sex)
            .ok_or_else(|| PacerError::Validation(format!("unknown sex {sex:?}")))?;
        Self::new(age, weight, weight_unit, height, height_unit, sex)
    }

    pub fn weight_kg(&self) -> f64 {
        match self.weight_unit {
            WeightUnit::Kg => self.weight,
            WeightUnit::Lbs => lbs_to_kg(self.weight),
        }
    }

    pub fn height_cm(&self) -> f64 {
        match self.height_unit {
            HeightUnit::Cm => self.height,
            HeightUnit::Feet => feet_to_cm(self.height),
        }
    }

    pub fn weight_label(&self) -> String {
        format_weight(self.weight, self.weight_unit)
    }

    pub fn height_label(&self) -> String {
        format_height(self.height, self.height_unit)
    }
}

fn check_range(field: &str, value: f64, range: &RangeInclusive<u32>) -> Result<(), PacerError> {
    let (lo, hi) = (f64::from(*range.start()), f64::from(*range.end()));
    if value.is_finite() && value >= lo && value <= hi {
        Ok(())
    } else {
        Err(PacerError::Validation(format!(
            "{field} {value} outside {lo}..={hi}"
        )))
    }
}
