use std::sync::Arc;

use pacer_core::clock::ManualClock;
use pacer_core::notify::MemorySink;
use pacer_core::sensor::ScriptedSource;
use pacer_core::{Config, MotionSample, SensorKind, StepTracker};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    // two seconds of walking at 2 steps/s, sampled at 50 Hz
    let samples = (0..100u64).map(|i| MotionSample::Accelerometer {
        timestamp_ms: i * 20,
        accel: [0.2, 0.4, if i % 25 == 0 { 14.0 } else { 9.81 }],
    });
    let clock = ManualClock::new(0);
    let sink = MemorySink::new();
    let tracker = StepTracker::new(
        cfg,
        Arc::new(ScriptedSource::new([SensorKind::Accelerometer])),
        Arc::new(sink.clone()),
        Arc::new(clock.clone()),
    );
    // replay on the manual clock so the debounce sees the recorded spacing
    for sample in samples {
        clock.set(sample.timestamp_ms());
        if let Some(step) = tracker.handle_sample(sample).await {
            println!("step {} at {} ms", step.step_count, step.timestamp_ms);
        }
    }
    println!("{}", serde_json::to_string_pretty(&tracker.snapshot().await)?);
    Ok(())
}
