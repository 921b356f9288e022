//! New-message notification mail
//!
//! Dispatch is fire-and-forget: the mail is handed to a spawned task and
//! failures are only logged, so a broken transport never fails a send.
//! [`NotificationDispatcher::drain`] waits for outstanding mail on shutdown.

use std::sync::{Arc, Mutex};

use dealroom_access::UserId;
use dealroom_store::DealId;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::providers::Notifier;

/// Composed mail ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// What a new-message mail talks about
#[derive(Debug, Clone)]
pub struct NewMessageNotice<'a> {
    pub sender_id: UserId,
    pub sender_name: &'a str,
    pub recipient_email: &'a str,
    pub deal_id: Option<DealId>,
    /// Title of the deal, when it still resolves
    pub deal_title: Option<&'a str>,
    pub text: &'a str,
}

pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    site_url: String,
    site_name: String,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, site_url: &str, site_name: &str) -> Self {
        Self {
            notifier,
            site_url: site_url.trim_end_matches('/').to_string(),
            site_name: site_name.to_string(),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn compose(&self, notice: &NewMessageNotice<'_>) -> Notification {
        let mut body = format!(
            "You have received a new message from {} on {}.\n\n",
            notice.sender_name, self.site_name
        );

        if let Some(title) = notice.deal_title {
            body.push_str(&format!("Regarding: {}\n\n", title));
        }

        body.push_str(&format!("Message:\n{}\n\n", notice.text));

        let mut link = format!(
            "{}/dealroom-messaging/?user={}",
            self.site_url, notice.sender_id
        );
        if let Some(deal_id) = notice.deal_id {
            link.push_str(&format!("&deal={}", deal_id));
        }
        body.push_str(&format!("To reply, please visit:\n{}", link));

        Notification {
            to: notice.recipient_email.to_string(),
            subject: format!("New Message from {}", notice.sender_name),
            body,
        }
    }

    /// Hand the mail to a background task and return immediately.
    pub fn dispatch(&self, notification: Notification) {
        let notifier = Arc::clone(&self.notifier);

        let handle = tokio::spawn(async move {
            match notifier
                .send_notification(&notification.to, &notification.subject, &notification.body)
                .await
            {
                Ok(()) => debug!("Notification sent to {}", notification.to),
                Err(e) => warn!("Failed to send notification to {}: {:#}", notification.to, e),
            }
        });

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Wait for every dispatched mail to finish. Used before shutdown.
    pub async fn drain(&self) {
        let handles = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *in_flight)
        };

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Notification task failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn send_notification(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn dispatcher() -> NotificationDispatcher {
        NotificationDispatcher::new(Arc::new(NullNotifier), "https://deals.example.com/", "DealRoom")
    }

    #[test]
    fn test_compose_with_deal() {
        let mail = dispatcher().compose(&NewMessageNotice {
            sender_id: 7,
            sender_name: "Alice",
            recipient_email: "bob@example.com",
            deal_id: Some(42),
            deal_title: Some("Solar Farm"),
            text: "Interested in your deal",
        });

        assert_eq!(mail.to, "bob@example.com");
        assert_eq!(mail.subject, "New Message from Alice");
        assert!(mail
            .body
            .starts_with("You have received a new message from Alice on DealRoom."));
        assert!(mail.body.contains("Regarding: Solar Farm"));
        assert!(mail.body.contains("Message:\nInterested in your deal"));
        assert!(mail
            .body
            .ends_with("https://deals.example.com/dealroom-messaging/?user=7&deal=42"));
    }

    #[test]
    fn test_compose_without_resolved_deal() {
        let mail = dispatcher().compose(&NewMessageNotice {
            sender_id: 7,
            sender_name: "Alice",
            recipient_email: "bob@example.com",
            deal_id: Some(42),
            deal_title: None,
            text: "hello",
        });

        assert!(!mail.body.contains("Regarding:"));
        // The link still points at the deal thread
        assert!(mail.body.ends_with("?user=7&deal=42"));
    }

    #[test]
    fn test_compose_without_deal() {
        let mail = dispatcher().compose(&NewMessageNotice {
            sender_id: 3,
            sender_name: "Carol",
            recipient_email: "dan@example.com",
            deal_id: None,
            deal_title: None,
            text: "hi",
        });

        assert!(mail.body.ends_with("/dealroom-messaging/?user=3"));
    }

    struct CountingNotifier(std::sync::atomic::AtomicUsize);

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send_notification(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
            tokio::task::yield_now().await;
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drain_waits_for_delivery() {
        let notifier = Arc::new(CountingNotifier(Default::default()));
        let dispatcher = NotificationDispatcher::new(notifier.clone(), "https://x", "DealRoom");

        for to in ["a@example.com", "b@example.com"] {
            dispatcher.dispatch(Notification {
                to: to.to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            });
        }
        dispatcher.drain().await;

        assert_eq!(notifier.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
