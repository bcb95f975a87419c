//! Gateway that logs deliveries instead of transmitting them.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use lifeweeks_core::clock::Clock;
use lifeweeks_core::gateway::NotificationGateway;
use lifeweeks_core::notification::{DeliveryResult, NotificationPayload};
use tracing::info;

use super::telegram::format_notification;

/// A delivery recorded by [`LoggingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoggedDelivery {
    /// A plain message.
    Message {
        /// Recipient.
        recipient_id: i64,
        /// Message text.
        text: String,
    },
    /// An image.
    Photo {
        /// Recipient.
        recipient_id: i64,
        /// Image size in bytes.
        size: usize,
        /// Caption, if any.
        caption: Option<String>,
    },
    /// A structured notification.
    Notification(NotificationPayload),
}

/// Records every delivery and reports success. Used when no transport is
/// configured and in tests that need to inspect what would have been sent.
pub struct LoggingGateway {
    clock: Arc<dyn Clock>,
    sent: Mutex<Vec<LoggedDelivery>>,
}

impl std::fmt::Debug for LoggingGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingGateway")
            .field("sent", &self.sent)
            .finish_non_exhaustive()
    }
}

impl LoggingGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything delivered so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<LoggedDelivery> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Notifications delivered so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<NotificationPayload> {
        self.sent()
            .into_iter()
            .filter_map(|delivery| match delivery {
                LoggedDelivery::Notification(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Forgets every recorded delivery.
    pub fn clear(&self) {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn record(&self, delivery: LoggedDelivery) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delivery);
    }
}

#[async_trait]
impl NotificationGateway for LoggingGateway {
    fn channel(&self) -> &'static str {
        "log"
    }

    async fn send_message(&self, recipient_id: i64, message: &str) -> bool {
        info!(recipient_id, message, "message (not transmitted)");
        self.record(LoggedDelivery::Message {
            recipient_id,
            text: message.to_owned(),
        });
        true
    }

    async fn send_photo(&self, recipient_id: i64, photo: &[u8], caption: Option<&str>) -> bool {
        info!(recipient_id, bytes = photo.len(), caption, "photo (not transmitted)");
        self.record(LoggedDelivery::Photo {
            recipient_id,
            size: photo.len(),
            caption: caption.map(str::to_owned),
        });
        true
    }

    async fn send_notification(&self, payload: &NotificationPayload) -> DeliveryResult {
        info!(
            recipient_id = payload.recipient_id(),
            message_type = payload.message_type(),
            text = %format_notification(payload),
            "notification (not transmitted)"
        );
        self.record(LoggedDelivery::Notification(payload.clone()));
        DeliveryResult::delivered(payload.recipient_id(), self.clock.now())
    }
}
