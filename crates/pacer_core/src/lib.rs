//! Step tracking core: motion classification, step session state, milestone
//! and inactivity notifications.
//!
//! The OS surface is reduced to three collaborators: a [`SensorSource`] that
//! delivers [`MotionSample`]s, a [`notify::NotificationSink`] that displays
//! notifications, and a [`clock::Clock`]. [`tracker::StepTracker`] owns the
//! session and wires them together.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

pub mod classifier;
pub mod clock;
pub mod config;
pub mod meals;
pub mod notify;
pub mod profile;
pub mod scheduler;
pub mod sensor;
pub mod session;
pub mod tracker;

pub use classifier::MotionClassifier;
pub use config::Config;
pub use session::{SessionSnapshot, StepSession};
pub use tracker::StepTracker;

#[derive(Debug, Error)]
pub enum PacerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("no step counter or accelerometer available")]
    NoSensor,
    #[error("tracker already started")]
    AlreadyStarted,
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("notification error: {0}")]
    Notification(String),
}

/// Kind of motion sensor a sample comes from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Hardware cumulative step counter (already debounced).
    StepCounter,
    /// Raw 3-axis accelerometer.
    Accelerometer,
}

/// A single reading delivered by a [`SensorSource`]. Not retained.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionSample {
    /// Cumulative steps since the sensor was last rebooted.
    StepCounter { timestamp_ms: u64, total: f32 },
    /// Acceleration in m/s² including gravity.
    Accelerometer { timestamp_ms: u64, accel: [f32; 3] },
}

impl MotionSample {
    pub fn kind(&self) -> SensorKind {
        match self {
            MotionSample::StepCounter { .. } => SensorKind::StepCounter,
            MotionSample::Accelerometer { .. } => SensorKind::Accelerometer,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match *self {
            MotionSample::StepCounter { timestamp_ms, .. }
            | MotionSample::Accelerometer { timestamp_ms, .. } => timestamp_ms,
        }
    }

    /// Same reading taken at `timestamp_ms`.
    pub fn with_timestamp(self, timestamp_ms: u64) -> Self {
        match self {
            MotionSample::StepCounter { total, .. } => MotionSample::StepCounter {
                timestamp_ms,
                total,
            },
            MotionSample::Accelerometer { accel, .. } => MotionSample::Accelerometer {
                timestamp_ms,
                accel,
            },
        }
    }
}

/// One accepted step (or a jump in the hardware counter).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StepEvent {
    pub timestamp_ms: u64,
    /// Step count the session should hold after this event.
    pub step_count: u64,
    pub source: SensorKind,
    /// Acceleration magnitude that triggered the step, accelerometer only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f32>,
}

/// Subscribe/unsubscribe interface to the device motion sensors.
///
/// Samples of one kind are delivered in arrival order on the returned
/// channel. The channel closes when the source is unsubscribed or exhausted.
/// Sample timestamps may use any time base: the tracker restamps every
/// sample with its [`clock::Clock`] on arrival.
#[async_trait]
pub trait SensorSource: Send + Sync + 'static {
    /// Sensor kinds present on the device.
    fn available(&self) -> Vec<SensorKind>;

    async fn subscribe(&self, kind: SensorKind)
    -> Result<mpsc::Receiver<MotionSample>, PacerError>;

    async fn unsubscribe(&self, kind: SensorKind);
}

/// Pick the sensor to listen to: the step counter when present, else the
/// accelerometer. Never both.
pub fn preferred_sensor(available: &[SensorKind]) -> Option<SensorKind> {
    if available.contains(&SensorKind::StepCounter) {
        Some(SensorKind::StepCounter)
    } else if available.contains(&SensorKind::Accelerometer) {
        Some(SensorKind::Accelerometer)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_counter_is_preferred() {
        let both = [SensorKind::Accelerometer, SensorKind::StepCounter];
        assert_eq!(preferred_sensor(&both), Some(SensorKind::StepCounter));
        assert_eq!(
            preferred_sensor(&[SensorKind::Accelerometer]),
            Some(SensorKind::Accelerometer)
        );
        assert_eq!(preferred_sensor(&[]), None);
    }

    #[test]
    fn motion_sample_serializes_with_kind_tag() {
        let s = MotionSample::Accelerometer {
            timestamp_ms: 5,
            accel: [0.0, 0.0, 9.81],
        };
        let v = serde_json::to_value(s).unwrap();
        assert_eq!(v["kind"], "accelerometer");
        assert_eq!(v["timestamp_ms"], 5);
        let back: MotionSample = serde_json::from_value(v).unwrap();
        assert_eq!(back.kind(), SensorKind::Accelerometer);
    }
}
