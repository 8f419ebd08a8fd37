//! Host shell for the step tracker: wires the simulated sensor, the logging
//! notification sink and the system clock into a [`StepTracker`] and runs it
//! for one session.

use std::future::Future;
use std::sync::Arc;

use pacer_core::clock::{Clock, SystemClock};
use pacer_core::notify::NotificationSink;
use pacer_core::{SessionSnapshot, StepTracker};

pub mod error;
pub mod settings;
pub mod sim;
pub mod sink;

use error::AppResult;
use settings::Settings;
use sim::{SimulatedWalk, WalkModel};
use sink::LogSink;

/// Build a tracker from settings using the simulated walk as sensor.
pub async fn build_tracker(
    settings: &Settings,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
) -> StepTracker {
    let model = WalkModel {
        sample_hz: settings.sample_hz,
        cadence_hz: settings.cadence_hz,
        seed: settings.seed,
        ..WalkModel::default()
    };
    let sensor = Arc::new(SimulatedWalk::new(model, clock.clone()));
    let tracker = StepTracker::new(settings.tracker.clone(), sensor, sink, clock.clone());
    if let Some(profile) = settings.profile.clone() {
        tracker.set_health_profile(profile).await;
    }
    tracker.set_meal_schedule(settings.meals.clone()).await;
    tracker
}

/// Run one session until `shutdown` resolves or the configured duration
/// elapses, whichever comes first. Returns the final snapshot.
pub async fn run_session<S>(settings: &Settings, shutdown: S) -> AppResult<SessionSnapshot>
where
    S: Future<Output = ()>,
{
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut tracker = build_tracker(settings, Arc::new(LogSink), clock).await;

    let now = chrono::Local::now().time();
    if let Some((meal, at)) = tracker.meal_schedule().await.next_meal(now) {
        tracing::info!("next meal: {} at {}", meal, at.format("%I:%M %p"));
    }

    let kind = tracker.start().await?;
    tracing::info!("pacer_app: tracking with {:?} for {:?}", kind, settings.session);

    let mut updates = tracker.subscribe();
    let progress = async {
        while updates.changed().await.is_ok() {
            let snap = updates.borrow_and_update().clone();
            if snap.step_count > 0 && snap.step_count % 10 == 0 {
                tracing::info!(
                    "{} steps, {:.2} kcal, {:.0}% of goal {}",
                    snap.step_count,
                    snap.calories,
                    snap.goal_progress * 100.0,
                    snap.move_goal
                );
            }
        }
    };

    tokio::select! {
        _ = tokio::time::sleep(settings.session) => {}
        _ = shutdown => tracing::info!("pacer_app: shutdown requested"),
        _ = progress => {}
    }

    tracker.stop().await;
    Ok(tracker.snapshot().await)
}
