//! Mutable step session state and the goal/reset operations on it.

use serde::{Deserialize, Serialize};

use crate::StepEvent;
use crate::config::Config;

/// Amount a single goal adjustment moves the move goal by.
pub const MOVE_GOAL_STEP: u32 = 10;
/// The move goal is never decreased at or below this value.
pub const MOVE_GOAL_FLOOR: u32 = 10;

/// Step counters for one tracker lifetime. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSession {
    step_count: u64,
    calories: f64,
    move_goal: u32,
    last_step_ms: u64,
    calories_per_step: f64,
}

/// Serializable view of a [`StepSession`] published to observers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub step_count: u64,
    pub calories: f64,
    pub move_goal: u32,
    pub last_step_ms: u64,
    /// `step_count / move_goal`, clamped to `[0, 1]`.
    pub goal_progress: f64,
}

impl StepSession {
    /// Fresh session. `created_ms` seeds the last-step instant so that
    /// inactivity is measured from creation until the first step.
    pub fn new(config: &Config, created_ms: u64) -> Self {
        Self {
            step_count: 0,
            calories: 0.0,
            move_goal: config.initial_move_goal,
            last_step_ms: created_ms,
            calories_per_step: config.calories_per_step,
        }
    }

    /// Apply an accepted step. Returns `false` (and changes nothing) when the
    /// event would not move the count forwards.
    pub fn apply(&mut self, event: &StepEvent) -> bool {
        if event.step_count <= self.step_count {
            tracing::debug!(
                "dropping step event {} at or below current count {}",
                event.step_count,
                self.step_count
            );
            return false;
        }
        self.step_count = event.step_count;
        self.calories = self.calories_for(self.step_count);
        self.last_step_ms = self.last_step_ms.max(event.timestamp_ms);
        true
    }

    pub fn reset(&mut self) {
        self.step_count = 0;
        self.calories = 0.0;
    }

    pub fn increase_move_goal(&mut self) {
        self.move_goal = self.move_goal.saturating_add(MOVE_GOAL_STEP);
    }

    pub fn decrease_move_goal(&mut self) {
        if self.move_goal > MOVE_GOAL_FLOOR {
            self.move_goal -= MOVE_GOAL_STEP;
        }
    }

    pub fn calories_for(&self, steps: u64) -> f64 {
        steps as f64 * self.calories_per_step
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    pub fn move_goal(&self) -> u32 {
        self.move_goal
    }

    pub fn last_step_ms(&self) -> u64 {
        self.last_step_ms
    }

    /// Milliseconds since the last accepted step (0 if `now_ms` is earlier).
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_step_ms)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let goal_progress = if self.move_goal == 0 {
            1.0
        } else {
            (self.step_count as f64 / self.move_goal as f64).clamp(0.0, 1.0)
        };
        SessionSnapshot {
            step_count: self.step_count,
            calories: self.calories,
            move_goal: self.move_goal,
            last_step_ms: self.last_step_ms,
            goal_progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SensorKind;

    fn step(t: u64, count: u64) -> StepEvent {
        StepEvent {
            timestamp_ms: t,
            step_count: count,
            source: SensorKind::Accelerometer,
            magnitude: Some(15.0),
        }
    }

    #[test]
    fn apply_recomputes_calories_exactly() {
        let mut s = StepSession::new(&Config::default(), 0);
        assert!(s.apply(&step(0, 1)));
        assert_eq!(s.calories(), 0.04);
        assert!(s.apply(&step(600, 2)));
        assert_eq!(s.calories(), 0.08);
        for n in 3..=50 {
            s.apply(&step(n * 600, n));
            assert_eq!(s.calories(), n as f64 * 0.04);
        }
    }

    #[test]
    fn apply_refuses_to_go_backwards() {
        let mut s = StepSession::new(&Config::default(), 0);
        s.apply(&step(10, 30));
        assert!(!s.apply(&step(20, 12)));
        assert_eq!(s.step_count(), 30);
        assert_eq!(s.last_step_ms(), 10);
    }

    #[test]
    fn apply_ignores_count_it_already_holds() {
        let mut s = StepSession::new(&Config::default(), 0);
        assert!(s.apply(&step(10, 1000)));
        assert!(!s.apply(&step(20, 1000)));
        assert_eq!(s.last_step_ms(), 10);
        assert!(!s.apply(&step(30, 0)));
    }

    #[test]
    fn reset_zeroes_counters_only() {
        let mut s = StepSession::new(&Config::default(), 0);
        s.apply(&step(900, 5));
        s.increase_move_goal();
        s.reset();
        assert_eq!(s.step_count(), 0);
        assert_eq!(s.calories(), 0.0);
        assert_eq!(s.move_goal(), 1010);
        assert_eq!(s.last_step_ms(), 900);
    }

    #[test]
    fn move_goal_floor_is_ten() {
        let mut s = StepSession::new(&Config::default(), 0);
        assert_eq!(s.move_goal(), 1000);
        for _ in 0..100 {
            s.decrease_move_goal();
        }
        assert_eq!(s.move_goal(), 10);
        s.decrease_move_goal();
        assert_eq!(s.move_goal(), 10);
    }

    #[test]
    fn move_goal_never_below_floor_from_any_start() {
        for start in [10u32, 11, 15, 19, 20, 25, 1000, 1005] {
            let cfg = Config {
                initial_move_goal: start,
                ..Config::default()
            };
            let mut s = StepSession::new(&cfg, 0);
            for _ in 0..300 {
                s.decrease_move_goal();
                assert!(s.move_goal() >= MOVE_GOAL_FLOOR, "start {start}");
            }
        }
    }

    #[test]
    fn increase_saturates() {
        let cfg = Config {
            initial_move_goal: u32::MAX - 3,
            ..Config::default()
        };
        let mut s = StepSession::new(&cfg, 0);
        s.increase_move_goal();
        assert_eq!(s.move_goal(), u32::MAX);
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut s = StepSession::new(&Config::default(), 0);
        s.apply(&step(0, 250));
        let snap = s.snapshot();
        assert_eq!(snap.goal_progress, 0.25);
        s.apply(&step(1, 4000));
        assert_eq!(s.snapshot().goal_progress, 1.0);
    }

    #[test]
    fn idle_is_measured_from_creation() {
        let s = StepSession::new(&Config::default(), 5_000);
        assert_eq!(s.idle_ms(125_000), 120_000);
        assert_eq!(s.idle_ms(1_000), 0);
    }
}
