//! The step tracker: single owner of the session state.
//!
//! Sensor samples and the inactivity timer run as two background tasks that
//! both go through one mutex, so step updates and inactivity checks never
//! interleave. `start()` subscribes to exactly one sensor and `stop()`
//! unsubscribes it exactly once.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

use crate::classifier::{ClassifierConfig, MotionClassifier};
use crate::clock::Clock;
use crate::config::Config;
use crate::meals::MealSchedule;
use crate::notify::{Notification, NotificationChannel, NotificationSink, post_and_forget};
use crate::profile::HealthProfile;
use crate::scheduler;
use crate::session::{SessionSnapshot, StepSession};
use crate::{MotionSample, PacerError, SensorKind, SensorSource, StepEvent, preferred_sensor};

pub struct StepTracker {
    config: Config,
    sensor: Arc<dyn SensorSource>,
    shared: Arc<Shared>,
    running: Option<Running>,
}

struct Shared {
    state: Mutex<TrackerState>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    milestone_interval: u64,
    inactivity_window: std::time::Duration,
}

struct TrackerState {
    session: StepSession,
    classifier: MotionClassifier,
    active: Option<SensorKind>,
    profile: Option<HealthProfile>,
    meals: MealSchedule,
}

struct Running {
    kind: SensorKind,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl StepTracker {
    pub fn new(
        config: Config,
        sensor: Arc<dyn SensorSource>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = StepSession::new(&config, clock.now_ms());
        let (snapshot_tx, _) = watch::channel(session.snapshot());
        let shared = Arc::new(Shared {
            state: Mutex::new(TrackerState {
                session,
                classifier: MotionClassifier::new(ClassifierConfig::from(&config)),
                active: None,
                profile: None,
                meals: MealSchedule::default(),
            }),
            sink,
            clock,
            snapshot_tx,
            milestone_interval: config.milestone_interval,
            inactivity_window: config.inactivity_window,
        });
        Self {
            config,
            sensor,
            shared,
            running: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register the notification channel, subscribe to the preferred sensor
    /// and spawn the sample and inactivity tasks. Returns the sensor in use.
    pub async fn start(&mut self) -> Result<SensorKind, PacerError> {
        if self.running.is_some() {
            return Err(PacerError::AlreadyStarted);
        }
        if let Err(e) = self
            .shared
            .sink
            .create_channel(&NotificationChannel::default())
            .await
        {
            tracing::warn!("could not register notification channel: {}", e);
        }

        let kind = preferred_sensor(&self.sensor.available()).ok_or(PacerError::NoSensor)?;
        let samples = self.sensor.subscribe(kind).await?;
        self.shared.state.lock().await.active = Some(kind);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let pump = tokio::spawn(pump_samples(
            self.shared.clone(),
            samples,
            shutdown_rx.clone(),
        ));
        let shared = self.shared.clone();
        let inactivity = tokio::spawn(scheduler::run_every(
            self.config.inactivity_check_interval,
            shutdown_rx,
            move || {
                let shared = shared.clone();
                async move {
                    shared.check_inactivity().await;
                }
            },
        ));

        self.running = Some(Running {
            kind,
            shutdown,
            tasks: vec![pump, inactivity],
        });
        tracing::info!(
            "step tracker started on {:?}, inactivity check every {:?}",
            kind,
            self.config.inactivity_check_interval
        );
        Ok(kind)
    }

    /// Stop both background tasks and unsubscribe from the sensor. Calling
    /// this on a stopped tracker does nothing.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        for task in running.tasks {
            if let Err(e) = task.await {
                tracing::warn!("tracker task ended abnormally: {}", e);
            }
        }
        self.sensor.unsubscribe(running.kind).await;
        self.shared.state.lock().await.active = None;
        tracing::info!("step tracker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Sensor currently subscribed to, if running.
    pub fn active_sensor(&self) -> Option<SensorKind> {
        self.running.as_ref().map(|r| r.kind)
    }

    /// Receiver that always holds the latest session snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.lock().await.session.snapshot()
    }

    /// Feed one sample through the classifier and session. This is the path
    /// the sensor task uses; hosts may call it directly. The sample is
    /// restamped with the tracker clock.
    pub async fn handle_sample(&self, sample: MotionSample) -> Option<StepEvent> {
        self.shared.handle_sample(sample).await
    }

    /// Run one inactivity check now. Returns whether a reminder was posted.
    pub async fn check_inactivity(&self) -> bool {
        self.shared.check_inactivity().await
    }

    pub async fn reset_steps(&self) {
        let mut state = self.shared.state.lock().await;
        state.session.reset();
        state.classifier.reset();
        self.shared.publish(&state.session);
        tracing::info!("step count reset");
    }

    pub async fn increase_move_goal(&self) -> u32 {
        let mut state = self.shared.state.lock().await;
        state.session.increase_move_goal();
        self.shared.publish(&state.session);
        state.session.move_goal()
    }

    pub async fn decrease_move_goal(&self) -> u32 {
        let mut state = self.shared.state.lock().await;
        state.session.decrease_move_goal();
        self.shared.publish(&state.session);
        state.session.move_goal()
    }

    pub async fn set_health_profile(&self, profile: HealthProfile) {
        tracing::info!(
            age = profile.age,
            weight = %profile.weight_label(),
            height = %profile.height_label(),
            sex = %profile.sex,
            "health profile updated"
        );
        self.shared.state.lock().await.profile = Some(profile);
    }

    pub async fn health_profile(&self) -> Option<HealthProfile> {
        self.shared.state.lock().await.profile.clone()
    }

    pub async fn set_meal_schedule(&self, meals: MealSchedule) {
        self.shared.state.lock().await.meals = meals;
    }

    pub async fn meal_schedule(&self) -> MealSchedule {
        self.shared.state.lock().await.meals.clone()
    }
}

impl Drop for StepTracker {
    fn drop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        for task in &running.tasks {
            task.abort();
        }
        let (sensor, kind) = (self.sensor.clone(), running.kind);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { sensor.unsubscribe(kind).await });
            }
            Err(_) => tracing::warn!(
                "step tracker dropped outside a runtime; {:?} left subscribed",
                kind
            ),
        }
    }
}

impl Shared {
    async fn handle_sample(&self, sample: MotionSample) -> Option<StepEvent> {
        let (event, snapshot) = {
            let mut state = self.state.lock().await;
            // debounce and inactivity both run on the tracker clock
            let sample = sample.with_timestamp(self.clock.now_ms());
            if let Some(active) = state.active.filter(|k| *k != sample.kind()) {
                tracing::debug!("ignoring {:?} sample while {:?} is active", sample.kind(), active);
                return None;
            }
            let event = state.classifier.on_sample(&sample)?;
            if !state.session.apply(&event) {
                return None;
            }
            let snapshot = self.publish(&state.session);
            (event, snapshot)
        };

        metrics::counter!("pacer_steps_accepted_total").increment(1);
        tracing::debug!(
            "step accepted: count={} calories={:.2}",
            snapshot.step_count,
            snapshot.calories
        );
        if let Some(n) = scheduler::milestone(snapshot.step_count, self.milestone_interval) {
            post_and_forget(self.sink.as_ref(), &n).await;
        }
        Some(event)
    }

    async fn check_inactivity(&self) -> bool {
        let idle_ms = {
            let state = self.state.lock().await;
            state.session.idle_ms(self.clock.now_ms())
        };
        if !scheduler::is_inactive(idle_ms, self.inactivity_window) {
            tracing::debug!("inactivity check: idle for {} ms", idle_ms);
            return false;
        }
        post_and_forget(self.sink.as_ref(), &Notification::inactivity()).await;
        true
    }

    fn publish(&self, session: &StepSession) -> SessionSnapshot {
        let snapshot = session.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

async fn pump_samples(
    shared: Arc<Shared>,
    mut samples: mpsc::Receiver<MotionSample>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            sample = samples.recv() => match sample {
                Some(sample) => {
                    shared.handle_sample(sample).await;
                }
                None => {
                    tracing::debug!("sensor stream closed");
                    break;
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
