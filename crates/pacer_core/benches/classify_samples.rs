use criterion::{Criterion, criterion_group, criterion_main};
use pacer_core::{MotionClassifier, MotionSample};
use std::hint::black_box;

fn walking_samples(count: u64) -> Vec<MotionSample> {
    // 50 Hz accelerometer with a heel-strike spike every 25 samples
    (0..count)
        .map(|i| {
            let z = if i % 25 == 0 { 14.5 } else { 9.81 };
            MotionSample::Accelerometer {
                timestamp_ms: i * 20,
                accel: [0.3, 0.1, z],
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let samples = walking_samples(10_000);
    c.bench_function("classify_accelerometer_10k", |b| {
        b.iter(|| {
            let mut classifier = MotionClassifier::default();
            let mut steps = 0u32;
            for s in &samples {
                if classifier.on_sample(black_box(s)).is_some() {
                    steps += 1;
                }
            }
            black_box(steps)
        })
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
