//! A scripted [`SensorSource`] for tests and replays.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{MotionSample, PacerError, SensorKind, SensorSource};

const CHANNEL_CAPACITY: usize = 64;

/// Replays a fixed list of samples per sensor kind on subscribe, then keeps
/// the channel open for [`ScriptedSource::push`] until unsubscribed.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    available: Vec<SensorKind>,
    scripts: Mutex<HashMap<SensorKind, Vec<MotionSample>>>,
    live: Mutex<HashMap<SensorKind, mpsc::Sender<MotionSample>>>,
    subscribes: AtomicUsize,
    unsubscribes: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(available: impl Into<Vec<SensorKind>>) -> Self {
        Self {
            available: available.into(),
            ..Self::default()
        }
    }

    /// Samples to replay on the next subscription to their kind. Kinds are
    /// taken from the samples themselves.
    pub fn with_script(self, samples: impl IntoIterator<Item = MotionSample>) -> Self {
        {
            let mut scripts = self.scripts.lock().unwrap_or_else(|p| p.into_inner());
            for s in samples {
                scripts.entry(s.kind()).or_default().push(s);
            }
        }
        self
    }

    /// Deliver a sample to the active subscription of its kind. Returns
    /// `false` when nobody is subscribed.
    pub async fn push(&self, sample: MotionSample) -> bool {
        let tx = self
            .live
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&sample.kind())
            .cloned();
        match tx {
            Some(tx) => tx.send(sample).await.is_ok(),
            None => false,
        }
    }

    pub fn is_subscribed(&self, kind: SensorKind) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(&kind)
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorSource for ScriptedSource {
    fn available(&self) -> Vec<SensorKind> {
        self.available.clone()
    }

    async fn subscribe(
        &self,
        kind: SensorKind,
    ) -> Result<mpsc::Receiver<MotionSample>, PacerError> {
        if !self.available.contains(&kind) {
            return Err(PacerError::Sensor(format!("{kind:?} not present")));
        }
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let script = self
            .scripts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&kind)
            .unwrap_or_default();
        self.live
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(kind, tx.clone());
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            for sample in script {
                if tx.send(sample).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn unsubscribe(&self, kind: SensorKind) {
        self.live
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&kind);
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
    }
}
