//! Notification model and sinks.
//!
//! A [`NotificationSink`] stands in for the OS notification service: posting
//! with an id that is already displayed replaces that notification.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::PacerError;

/// Fixed id of the inactivity reminder; each reminder replaces the last.
pub const INACTIVITY_NOTIFICATION_ID: u64 = 12345;

pub const CHANNEL_ID: &str = "stepCounterChannel";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self {
            id: CHANNEL_ID.into(),
            name: "Step Counter Channel".into(),
            description: "Notifications for step milestones".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub channel_id: String,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(id: u64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            channel_id: CHANNEL_ID.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// Congratulation for reaching `steps`. Tagged with the step value so
    /// different milestones do not replace each other.
    pub fn milestone(steps: u64) -> Self {
        Self::new(
            steps,
            "Congratulations!",
            format!("You've reached {steps} steps!"),
        )
    }

    pub fn inactivity() -> Self {
        Self::new(
            INACTIVITY_NOTIFICATION_ID,
            "Get Moving!",
            "It seems like you haven't walked for a while. Take a break and walk around!",
        )
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Register the channel notifications are posted on. Default: no-op.
    async fn create_channel(&self, _channel: &NotificationChannel) -> Result<(), PacerError> {
        Ok(())
    }

    async fn post(&self, notification: &Notification) -> Result<(), PacerError>;
}

/// Post without observing the outcome. Failures are logged and dropped.
pub async fn post_and_forget(sink: &dyn NotificationSink, notification: &Notification) {
    match sink.post(notification).await {
        Ok(()) => {
            metrics::counter!("pacer_notifications_posted_total").increment(1);
            tracing::info!(
                "posted notification {}: {}",
                notification.id,
                notification.title
            );
        }
        Err(e) => tracing::warn!("notification {} not delivered: {}", notification.id, e),
    }
}

/// In-memory sink: keeps what is currently "displayed" (latest per id) and
/// the full post history. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkState>>,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    channels: Vec<NotificationChannel>,
    displayed: BTreeMap<u64, Notification>,
    history: Vec<Notification>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.lock().channels.clone()
    }

    /// Notifications currently shown, ordered by id.
    pub fn displayed(&self) -> Vec<Notification> {
        self.lock().displayed.values().cloned().collect()
    }

    pub fn history(&self) -> Vec<Notification> {
        self.lock().history.clone()
    }

    pub fn posts_with_id(&self, id: u64) -> usize {
        self.lock().history.iter().filter(|n| n.id == id).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkState> {
        // a panic while holding the lock leaves plain data behind; keep going
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn create_channel(&self, channel: &NotificationChannel) -> Result<(), PacerError> {
        let mut state = self.lock();
        if !state.channels.iter().any(|c| c.id == channel.id) {
            state.channels.push(channel.clone());
        }
        Ok(())
    }

    async fn post(&self, notification: &Notification) -> Result<(), PacerError> {
        let mut state = self.lock();
        state
            .displayed
            .insert(notification.id, notification.clone());
        state.history.push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn post(&self, _n: &Notification) -> Result<(), PacerError> {
            Err(PacerError::Notification("service unavailable".into()))
        }
    }

    #[test]
    fn milestone_is_tagged_with_value() {
        let n = Notification::milestone(3000);
        assert_eq!(n.id, 3000);
        assert_eq!(n.title, "Congratulations!");
        assert_eq!(n.body, "You've reached 3000 steps!");
        assert_eq!(n.channel_id, CHANNEL_ID);
    }

    #[tokio::test]
    async fn same_id_replaces_displayed() {
        let sink = MemorySink::new();
        sink.post(&Notification::inactivity()).await.unwrap();
        sink.post(&Notification::milestone(1000)).await.unwrap();
        sink.post(&Notification::inactivity()).await.unwrap();
        assert_eq!(sink.displayed().len(), 2);
        assert_eq!(sink.history().len(), 3);
        assert_eq!(sink.posts_with_id(INACTIVITY_NOTIFICATION_ID), 2);
    }

    #[tokio::test]
    async fn channel_registered_once() {
        let sink = MemorySink::new();
        let ch = NotificationChannel::default();
        sink.create_channel(&ch).await.unwrap();
        sink.create_channel(&ch).await.unwrap();
        assert_eq!(sink.channels(), vec![ch]);
    }

    #[tokio::test]
    async fn post_and_forget_swallows_errors() {
        post_and_forget(&FailingSink, &Notification::inactivity()).await;
    }
}
