use std::time::Duration;

use pacer_core::Config;
use pacer_core::meals::{Meal, MealSchedule, parse_meal_time};
use pacer_core::profile::{HealthProfile, HeightUnit, WeightUnit};

use crate::error::{AppError, AppResult};

/// Everything the host shell needs: the tracker config plus how long and how
/// fast to run the simulated walk.
#[derive(Clone, Debug)]
pub struct Settings {
    pub tracker: Config,
    pub session: Duration,
    pub sample_hz: u32,
    pub cadence_hz: f32,
    pub seed: u64,
    pub meals: MealSchedule,
    pub profile: Option<HealthProfile>,
}

impl Settings {
    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    pub fn from_env_with<F>(mut get: F) -> AppResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let tracker = Config::from_env_with(&mut get)?;
        let session = Duration::from_secs(number(&mut get, "PACER_SESSION_SECS", 30)?);
        let sample_hz = number(&mut get, "PACER_SAMPLE_HZ", 50)?;
        if sample_hz == 0 {
            return Err(AppError::Settings("PACER_SAMPLE_HZ must be positive".into()));
        }
        let cadence_hz = number(&mut get, "PACER_CADENCE_HZ", 1.8)?;
        let seed = number(&mut get, "PACER_SEED", 7)?;
        let meals = match get("PACER_MEALS") {
            Some(raw) => parse_meals(&raw)?,
            None => MealSchedule::default(),
        };
        let profile = match get("PACER_PROFILE_AGE") {
            Some(age) => Some(HealthProfile::from_form(
                &age,
                &get("PACER_PROFILE_WEIGHT").unwrap_or_default(),
                match get("PACER_PROFILE_WEIGHT_UNIT").as_deref() {
                    Some("lbs") => WeightUnit::Lbs,
                    _ => WeightUnit::Kg,
                },
                &get("PACER_PROFILE_HEIGHT").unwrap_or_default(),
                match get("PACER_PROFILE_HEIGHT_UNIT").as_deref() {
                    Some("feet") => HeightUnit::Feet,
                    _ => HeightUnit::Cm,
                },
                &get("PACER_PROFILE_SEX").unwrap_or_default(),
            )?),
            None => None,
        };
        Ok(Self {
            tracker,
            session,
            sample_hz,
            cadence_hz,
            seed,
            meals,
            profile,
        })
    }
}

/// Log filter directive: `PACER_LOG_LEVEL`, else `RUST_LOG`, else `info`.
pub fn log_filter() -> String {
    log_filter_with(|k| std::env::var(k).ok())
}

pub fn log_filter_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    get("PACER_LOG_LEVEL")
        .or_else(|| get("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}

fn number<F, T>(get: &mut F, key: &str, default: T) -> AppResult<T>
where
    F: FnMut(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Settings(format!("{key} has invalid value {raw:?}"))),
    }
}

/// Parse `breakfast=07:30,lunch=12:30 PM` into a schedule.
pub fn parse_meals(raw: &str) -> AppResult<MealSchedule> {
    let mut schedule = MealSchedule::default();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, time) = entry
            .split_once('=')
            .ok_or_else(|| AppError::Settings(format!("meal entry {entry:?} lacks '='")))?;
        let meal = Meal::ALL
            .into_iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| AppError::Settings(format!("unknown meal {name:?}")))?;
        schedule.set(meal, parse_meal_time(time)?);
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn defaults_when_unset() {
        let s = Settings::from_env_with(|_| None).expect("settings");
        assert_eq!(s.session, Duration::from_secs(30));
        assert_eq!(s.sample_hz, 50);
        assert_eq!(s.tracker, Config::default());
        assert!(s.profile.is_none());
        assert_eq!(s.meals, MealSchedule::default());
    }

    #[test]
    fn reads_meals_and_profile() {
        let get = |k: &str| match k {
            "PACER_MEALS" => Some("Breakfast=07:30, dinner=07:00 pm".into()),
            "PACER_PROFILE_AGE" => Some("29".into()),
            "PACER_PROFILE_WEIGHT" => Some("150".into()),
            "PACER_PROFILE_WEIGHT_UNIT" => Some("lbs".into()),
            "PACER_PROFILE_HEIGHT" => Some("170".into()),
            "PACER_PROFILE_SEX" => Some("male".into()),
            _ => None,
        };
        let s = Settings::from_env_with(get).expect("settings");
        assert_eq!(
            s.meals.get(Meal::Dinner),
            NaiveTime::from_hms_opt(19, 0, 0)
        );
        assert_eq!(s.meals.get(Meal::Lunch), None);
        let p = s.profile.expect("profile");
        assert_eq!(p.weight_unit, WeightUnit::Lbs);
        assert_eq!(p.age, 29);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_hz = |k: &str| (k == "PACER_SAMPLE_HZ").then(|| "0".to_string());
        assert!(matches!(
            Settings::from_env_with(zero_hz),
            Err(AppError::Settings(_))
        ));
        let bad_core = |k: &str| (k == "PACER_STEP_THRESHOLD").then(|| "high".to_string());
        assert!(matches!(
            Settings::from_env_with(bad_core),
            Err(AppError::Tracker(_))
        ));
        assert!(parse_meals("brunch=10:00").is_err());
        assert!(parse_meals("lunch").is_err());
    }
}
