//! Meal-time schedule.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::PacerError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Snack, Meal::Dinner];
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Meal::Breakfast => "Breakfast",
            Meal::Lunch => "Lunch",
            Meal::Snack => "Snack",
            Meal::Dinner => "Dinner",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealSchedule {
    pub breakfast: Option<NaiveTime>,
    pub lunch: Option<NaiveTime>,
    pub snack: Option<NaiveTime>,
    pub dinner: Option<NaiveTime>,
}

impl MealSchedule {
    pub fn get(&self, meal: Meal) -> Option<NaiveTime> {
        *self.slot(meal)
    }

    pub fn set(&mut self, meal: Meal, time: NaiveTime) {
        *self.slot_mut(meal) = Some(time);
    }

    pub fn clear(&mut self, meal: Meal) {
        *self.slot_mut(meal) = None;
    }

    /// Button label, e.g. `Lunch Time: 12:30 PM` or `Lunch Time: Not Set`.
    pub fn label(&self, meal: Meal) -> String {
        match self.get(meal) {
            Some(t) => format!("{meal} Time: {}", t.format("%I:%M %p")),
            None => format!("{meal} Time: Not Set"),
        }
    }

    /// First scheduled meal strictly after `after`, earliest time first.
    pub fn next_meal(&self, after: NaiveTime) -> Option<(Meal, NaiveTime)> {
        Meal::ALL
            .iter()
            .filter_map(|&m| self.get(m).map(|t| (m, t)))
            .filter(|&(_, t)| t > after)
            .min_by_key(|&(_, t)| t)
    }

    fn slot(&self, meal: Meal) -> &Option<NaiveTime> {
        match meal {
            Meal::Breakfast => &self.breakfast,
            Meal::Lunch => &self.lunch,
            Meal::Snack => &self.snack,
            Meal::Dinner => &self.dinner,
        }
    }

    fn slot_mut(&mut self, meal: Meal) -> &mut Option<NaiveTime> {
        match meal {
            Meal::Breakfast => &mut self.breakfast,
            Meal::Lunch => &mut self.lunch,
            Meal::Snack => &mut self.snack,
            Meal::Dinner => &mut self.dinner,
        }
    }
}

/// Parse a time of day given as `HH:MM` (24h) or `hh:mm AM`/`hh:mm PM`.
pub fn parse_meal_time(s: &str) -> Result<NaiveTime, PacerError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&s.to_ascii_uppercase(), "%I:%M %p"))
        .map_err(|_| PacerError::Validation(format!("invalid meal time {s:?}")))
}
