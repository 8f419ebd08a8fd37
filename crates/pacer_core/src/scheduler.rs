//! Milestone and inactivity triggers, plus the periodic loop that drives the
//! inactivity check.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::notify::Notification;

/// Milestone notification for `step_count`, if it is a positive multiple of
/// `interval`.
pub fn milestone(step_count: u64, interval: u64) -> Option<Notification> {
    if step_count > 0 && interval > 0 && step_count % interval == 0 {
        Some(Notification::milestone(step_count))
    } else {
        None
    }
}

/// Whether an idle gap is long enough to remind the user. The window itself
/// does not trigger.
pub fn is_inactive(idle_ms: u64, window: Duration) -> bool {
    u128::from(idle_ms) > window.as_millis()
}

/// Run `tick` every `period` until `shutdown` flips to `true` or its sender
/// is dropped. The first tick happens one full period after the call.
pub async fn run_every<F, Fut>(period: Duration, mut shutdown: watch::Receiver<bool>, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    if *shutdown.borrow() {
        return;
    }
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = interval.tick() => tick().await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!("periodic task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn milestone_only_on_positive_multiples() {
        assert!(milestone(0, 1000).is_none());
        assert!(milestone(999, 1000).is_none());
        assert_eq!(milestone(1000, 1000).unwrap().id, 1000);
        assert!(milestone(1001, 1000).is_none());
        assert_eq!(milestone(2000, 1000).unwrap().id, 2000);
        assert!(milestone(5, 0).is_none());
    }

    #[test]
    fn inactivity_window_is_exclusive() {
        let window = Duration::from_secs(120);
        assert!(!is_inactive(120_000, window));
        assert!(is_inactive(120_001, window));
        assert!(!is_inactive(0, window));
    }

    #[tokio::test(start_paused = true)]
    async fn run_every_ticks_after_each_period() {
        let ticks = Arc::new(AtomicU32::new(0));
        let (tx, rx) = watch::channel(false);
        let t = ticks.clone();
        let handle = tokio::spawn(run_every(Duration::from_secs(600), rx, move || {
            let t = t.clone();
            async move {
                t.fetch_add(1, Ordering::SeqCst);
            }
        }));

        tokio::time::sleep(Duration::from_secs(599)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(1200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        tx.send(true).unwrap();
        handle.await.unwrap();
        tokio::time::sleep(Duration::from_secs(6000)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn run_every_stops_when_sender_dropped() {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_every(Duration::from_secs(1), rx, || async {}));
        drop(tx);
        handle.await.unwrap();
    }
}
