use async_trait::async_trait;

use crate::services::{EmailMessage, NotificationChannel};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationChannel;

#[async_trait]
impl NotificationChannel for LogNotificationChannel {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        tracing::info!(to = %message.to_address, message = %message.message, "📧 Customer notification");
        Ok(())
    }
}
