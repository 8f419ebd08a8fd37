use crate::PacerError;
use std::str::FromStr;
use std::time::Duration;

/// Tunables for step detection and reminders.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Acceleration magnitude (m/s²) a sample must exceed to count as a step.
    pub step_threshold: f32,
    /// Minimum gap between two accepted accelerometer steps.
    pub debounce_ms: u64,
    /// Idle time after which the inactivity reminder is posted.
    pub inactivity_window: Duration,
    /// How often the inactivity check runs.
    pub inactivity_check_interval: Duration,
    pub milestone_interval: u64,
    pub calories_per_step: f64,
    pub initial_move_goal: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step_threshold: 12.0,
            debounce_ms: 500,
            inactivity_window: Duration::from_secs(2 * 60),
            inactivity_check_interval: Duration::from_secs(10 * 60),
            milestone_interval: 1000,
            calories_per_step: 0.04,
            initial_move_goal: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, PacerError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment. Missing keys keep their
    /// defaults; present but unparseable keys are an error.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, PacerError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let d = Self::default();
        let cfg = Self {
            step_threshold: parse_or(&mut get, "PACER_STEP_THRESHOLD", d.step_threshold)?,
            debounce_ms: parse_or(&mut get, "PACER_DEBOUNCE_MS", d.debounce_ms)?,
            inactivity_window: Duration::from_secs(parse_or(
                &mut get,
                "PACER_INACTIVITY_WINDOW_SECS",
                d.inactivity_window.as_secs(),
            )?),
            inactivity_check_interval: Duration::from_secs(parse_or(
                &mut get,
                "PACER_INACTIVITY_CHECK_SECS",
                d.inactivity_check_interval.as_secs(),
            )?),
            milestone_interval: parse_or(
                &mut get,
                "PACER_MILESTONE_INTERVAL",
                d.milestone_interval,
            )?,
            calories_per_step: parse_or(&mut get, "PACER_CALORIES_PER_STEP", d.calories_per_step)?,
            initial_move_goal: parse_or(&mut get, "PACER_INITIAL_MOVE_GOAL", d.initial_move_goal)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), PacerError> {
        if !self.step_threshold.is_finite() || self.step_threshold <= 0.0 {
            return Err(PacerError::Config(
                "PACER_STEP_THRESHOLD must be a positive number".into(),
            ));
        }
        if !self.calories_per_step.is_finite() || self.calories_per_step < 0.0 {
            return Err(PacerError::Config(
                "PACER_CALORIES_PER_STEP must be non-negative".into(),
            ));
        }
        if self.milestone_interval == 0 {
            return Err(PacerError::Config(
                "PACER_MILESTONE_INTERVAL must be greater than zero".into(),
            ));
        }
        if self.inactivity_check_interval.is_zero() {
            return Err(PacerError::Config(
                "PACER_INACTIVITY_CHECK_SECS must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(get: &mut F, key: &str, default: T) -> Result<T, PacerError>
where
    F: FnMut(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PacerError::Config(format!("{key} has invalid value {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_defaults_when_unset() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.inactivity_window, Duration::from_secs(120));
        assert_eq!(cfg.inactivity_check_interval, Duration::from_secs(600));
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "PACER_STEP_THRESHOLD" => Some("10.5".into()),
            "PACER_DEBOUNCE_MS" => Some(" 300 ".into()),
            "PACER_INACTIVITY_CHECK_SECS" => Some("60".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.step_threshold, 10.5);
        assert_eq!(cfg.debounce_ms, 300);
        assert_eq!(cfg.inactivity_check_interval, Duration::from_secs(60));
        assert_eq!(cfg.milestone_interval, 1000);
    }

    #[test]
    fn from_env_rejects_garbage() {
        let get = |k: &str| match k {
            "PACER_DEBOUNCE_MS" => Some("soon".into()),
            _ => None,
        };
        let err = Config::from_env_with(get).unwrap_err();
        assert!(err.to_string().contains("PACER_DEBOUNCE_MS"));
    }

    #[test]
    fn from_env_rejects_zero_milestone() {
        let get = |k: &str| match k {
            "PACER_MILESTONE_INTERVAL" => Some("0".into()),
            _ => None,
        };
        assert!(matches!(
            Config::from_env_with(get),
            Err(PacerError::Config(_))
        ));
    }
}
