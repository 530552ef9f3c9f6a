//! Background delivery of customer notifications.
//!
//! Request handlers push a [`Notification`] onto a bounded channel and return
//! immediately. A single worker task drains the channel and sends each email,
//! logging failures. A full or closed queue drops the notification with a
//! warning; notifications never fail a request.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::email::{EmailService, OrderConfirmation};

/// Queue capacity before new notifications are dropped.
const QUEUE_CAPACITY: usize = 256;

/// A message to deliver out of band.
#[derive(Debug, Clone)]
pub enum Notification {
    /// Sent after registration.
    Welcome { to: String, username: String },
    /// Sent after a successful checkout.
    OrderConfirmation(Box<OrderConfirmation>),
}

impl Notification {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::OrderConfirmation(_) => "order_confirmation",
        }
    }
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    /// Create a queue and spawn its worker.
    ///
    /// With no mailer, notifications are accepted and discarded at debug level.
    /// Each send is bounded by `timeout`. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn spawn(mailer: Option<EmailService>, timeout: Duration) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run_worker(receiver, mailer, timeout));
        (Self { sender }, worker)
    }

    /// Create a queue over an existing channel without a worker.
    #[must_use]
    pub const fn from_sender(sender: mpsc::Sender<Notification>) -> Self {
        Self { sender }
    }

    /// Enqueue a notification without waiting.
    pub fn enqueue(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.sender.try_send(notification) {
            tracing::warn!(kind, error = %e, "Notification dropped");
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<Notification>,
    mailer: Option<EmailService>,
    timeout: Duration,
) {
    while let Some(notification) = receiver.recv().await {
        let kind = notification.kind();

        let Some(mailer) = mailer.as_ref() else {
            tracing::debug!(kind, "Email not configured, skipping notification");
            continue;
        };

        let send = async {
            match &notification {
                Notification::Welcome { to, username } => mailer.send_welcome(to, username).await,
                Notification::OrderConfirmation(order) => {
                    mailer.send_order_confirmation(order).await
                }
            }
        };

        match tokio::time::timeout(timeout, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(kind, error = %e, "Failed to send notification"),
            Err(_) => tracing::error!(kind, ?timeout, "Notification send timed out"),
        }
    }

    tracing::debug!("Notification queue closed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn welcome() -> Notification {
        Notification::Welcome {
            to: "ada@example.com".to_owned(),
            username: "ada".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_enqueue_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let queue = NotificationQueue::from_sender(tx);

        queue.enqueue(welcome());

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, Notification::Welcome { ref username, .. } if username == "ada"));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let queue = NotificationQueue::from_sender(tx);

        queue.enqueue(welcome());
        queue.enqueue(welcome());

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_worker_without_mailer_drains_and_exits() {
        let (queue, worker) = NotificationQueue::spawn(None, Duration::from_secs(1));
        queue.enqueue(welcome());
        drop(queue);

        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
