//! Motion classifier: turns raw sensor samples into step events.
//!
//! Two inputs are understood:
//! - cumulative hardware step-counter readings, taken as-is
//! - accelerometer vectors, accepted as a step when the magnitude exceeds a
//!   fixed threshold and the previous accepted step is at least the debounce
//!   interval old
//!
//! There is no filtering or calibration; the accelerometer path is a plain
//! threshold plus debounce.

use crate::config::Config;
use crate::{MotionSample, SensorKind, StepEvent};

/// Configuration for the classifier, usually derived from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Magnitude (m/s²) that must be exceeded for a step.
    pub threshold: f32,
    /// Minimum time between accepted accelerometer steps in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ClassifierConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            threshold: cfg.step_threshold,
            debounce_ms: cfg.debounce_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotionClassifier {
    config: ClassifierConfig,
    /// Step count the classifier currently believes the session holds.
    step_count: u64,
    last_step_ms: Option<u64>,
    last_counter_reading: Option<u64>,
    last_magnitude: f32,
}

impl MotionClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            step_count: 0,
            last_step_ms: None,
            last_counter_reading: None,
            last_magnitude: 0.0,
        }
    }

    /// Classify one sample. Returns a [`StepEvent`] carrying the step count
    /// after the event, or `None` when the sample is not a step or is
    /// malformed.
    pub fn on_sample(&mut self, sample: &MotionSample) -> Option<StepEvent> {
        match *sample {
            MotionSample::StepCounter {
                timestamp_ms,
                total,
            } => self.on_counter(timestamp_ms, total),
            MotionSample::Accelerometer {
                timestamp_ms,
                accel,
            } => self.on_accel(timestamp_ms, accel),
        }
    }

    fn on_counter(&mut self, timestamp_ms: u64, total: f32) -> Option<StepEvent> {
        if !total.is_finite() || total < 0.0 {
            tracing::debug!("ignoring malformed step counter reading {}", total);
            return None;
        }
        let reading = total as u64;
        if self.last_counter_reading == Some(reading) {
            return None;
        }
        self.last_counter_reading = Some(reading);
        self.step_count = reading;
        self.last_step_ms = Some(timestamp_ms);
        Some(StepEvent {
            timestamp_ms,
            step_count: reading,
            source: SensorKind::StepCounter,
            magnitude: None,
        })
    }

    fn on_accel(&mut self, timestamp_ms: u64, accel: [f32; 3]) -> Option<StepEvent> {
        if accel.iter().any(|c| !c.is_finite()) {
            tracing::debug!("ignoring non-finite accelerometer sample at {}", timestamp_ms);
            return None;
        }
        let magnitude = magnitude(accel);
        self.last_magnitude = magnitude;
        if magnitude <= self.config.threshold || !self.debounce_elapsed(timestamp_ms) {
            return None;
        }
        self.step_count = self.step_count.saturating_add(1);
        self.last_step_ms = Some(timestamp_ms);
        Some(StepEvent {
            timestamp_ms,
            step_count: self.step_count,
            source: SensorKind::Accelerometer,
            magnitude: Some(magnitude),
        })
    }

    fn debounce_elapsed(&self, timestamp_ms: u64) -> bool {
        match self.last_step_ms {
            None => true,
            Some(last) => timestamp_ms >= last && timestamp_ms - last >= self.config.debounce_ms,
        }
    }

    /// Forget the running count and the counter baseline (the session was
    /// reset). The debounce instant is kept.
    pub fn reset(&mut self) {
        self.step_count = 0;
        self.last_counter_reading = None;
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_step_ms(&self) -> Option<u64> {
        self.last_step_ms
    }

    /// Magnitude of the most recent well-formed accelerometer sample.
    pub fn last_magnitude(&self) -> f32 {
        self.last_magnitude
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

/// Euclidean norm of a 3-axis vector.
pub fn magnitude(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
