//! Mail transport that writes notifications to the log

use async_trait::async_trait;
use dealroom_service::Notifier;
use tracing::info;

pub struct LogMailer;

#[async_trait]
impl Notifier for LogMailer {
    async fn send_notification(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(to, subject, body, "Notification");
        Ok(())
    }
}
