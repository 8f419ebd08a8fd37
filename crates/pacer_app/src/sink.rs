use async_trait::async_trait;
use pacer_core::PacerError;
use pacer_core::notify::{Notification, NotificationChannel, NotificationSink};

/// Notification sink that writes to the log instead of a device tray.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn create_channel(&self, channel: &NotificationChannel) -> Result<(), PacerError> {
        tracing::info!("notification channel {} ({})", channel.id, channel.name);
        Ok(())
    }

    async fn post(&self, notification: &Notification) -> Result<(), PacerError> {
        tracing::info!(
            id = notification.id,
            "[{}] {}: {}",
            notification.channel_id,
            notification.title,
            notification.body
        );
        Ok(())
    }
}
