//! Simulated accelerometer standing in for device sensors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pacer_core::clock::Clock;
use pacer_core::{MotionSample, PacerError, SensorKind, SensorSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const GRAVITY: f32 = 9.81;

/// Shape of the simulated gait.
#[derive(Clone, Debug)]
pub struct WalkModel {
    pub sample_hz: u32,
    pub cadence_hz: f32,
    /// Peak acceleration added to gravity on heel strike (m/s²).
    pub strike_peak: f32,
    /// Uniform noise amplitude on every axis (m/s²).
    pub noise: f32,
    pub seed: u64,
}

impl Default for WalkModel {
    fn default() -> Self {
        Self {
            sample_hz: 50,
            cadence_hz: 1.8,
            strike_peak: 5.0,
            noise: 0.4,
            seed: 7,
        }
    }
}

impl WalkModel {
    pub fn period(&self) -> Duration {
        Duration::from_micros((1_000_000 / u64::from(self.sample_hz.max(1))).max(1))
    }

    /// Acceleration for sample `index`. Heel strikes land on the first
    /// sample of each step period.
    pub fn accel_at(&self, index: u64, rng: &mut impl Rng) -> [f32; 3] {
        let samples_per_step = (self.sample_hz as f32 / self.cadence_hz.max(0.1)).round() as u64;
        let strike = samples_per_step > 0 && index % samples_per_step.max(1) == 0;
        let mut jitter = || {
            if self.noise > 0.0 {
                rng.random_range(-self.noise..self.noise)
            } else {
                0.0
            }
        };
        let vertical = GRAVITY + if strike { self.strike_peak } else { 0.0 };
        [jitter(), jitter(), vertical + jitter()]
    }
}

/// [`SensorSource`] exposing only an accelerometer fed by a [`WalkModel`].
pub struct SimulatedWalk {
    model: WalkModel,
    clock: Arc<dyn Clock>,
    feeds: Mutex<HashMap<SensorKind, JoinHandle<()>>>,
}

impl SimulatedWalk {
    pub fn new(model: WalkModel, clock: Arc<dyn Clock>) -> Self {
        Self {
            model,
            clock,
            feeds: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SensorSource for SimulatedWalk {
    fn available(&self) -> Vec<SensorKind> {
        vec![SensorKind::Accelerometer]
    }

    async fn subscribe(
        &self,
        kind: SensorKind,
    ) -> Result<mpsc::Receiver<MotionSample>, PacerError> {
        if kind != SensorKind::Accelerometer {
            return Err(PacerError::Sensor(format!("{kind:?} not simulated")));
        }
        let (tx, rx) = mpsc::channel(256);
        let model = self.model.clone();
        let clock = self.clock.clone();
        let feed = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(model.seed);
            let mut ticker = tokio::time::interval(model.period());
            let mut index = 0u64;
            loop {
                ticker.tick().await;
                let sample = MotionSample::Accelerometer {
                    timestamp_ms: clock.now_ms(),
                    accel: model.accel_at(index, &mut rng),
                };
                if tx.send(sample).await.is_err() {
                    break;
                }
                index += 1;
            }
        });
        let previous = self
            .feeds
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(kind, feed);
        if let Some(previous) = previous {
            previous.abort();
        }
        tracing::debug!("simulated {:?} feed at {} Hz", kind, self.model.sample_hz);
        Ok(rx)
    }

    async fn unsubscribe(&self, kind: SensorKind) {
        let feed = self
            .feeds
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&kind);
        if let Some(feed) = feed {
            feed.abort();
        }
    }
}
