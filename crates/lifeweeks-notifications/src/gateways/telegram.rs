//! Telegram delivery gateway.

use std::sync::Arc;

use async_trait::async_trait;
use lifeweeks_core::clock::Clock;
use lifeweeks_core::gateway::{BotTransport, NotificationGateway};
use lifeweeks_core::notification::{DeliveryResult, NotificationPayload};
use tracing::{debug, error, instrument};

/// Renders a payload as Telegram HTML: bold title, blank line, body. A
/// payload without a title is sent as its body alone.
#[must_use]
pub fn format_notification(payload: &NotificationPayload) -> String {
    if payload.title().is_empty() {
        payload.body().to_owned()
    } else {
        format!("<b>{}</b>\n\n{}", payload.title(), payload.body())
    }
}

/// Delivers notifications through a Telegram bot transport.
pub struct TelegramNotificationGateway<T> {
    transport: T,
    clock: Arc<dyn Clock>,
}

impl<T> std::fmt::Debug for TelegramNotificationGateway<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotificationGateway").finish_non_exhaustive()
    }
}

impl<T: BotTransport> TelegramNotificationGateway<T> {
    /// Wraps `transport`; `clock` stamps delivery results.
    #[must_use]
    pub fn new(transport: T, clock: Arc<dyn Clock>) -> Self {
        Self { transport, clock }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: BotTransport> NotificationGateway for TelegramNotificationGateway<T> {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send_message(&self, recipient_id: i64, message: &str) -> bool {
        match self.transport.send_text(recipient_id, message).await {
            Ok(()) => {
                debug!(recipient_id, "message sent");
                true
            }
            Err(err) => {
                error!(recipient_id, error = %err, "failed to send message");
                false
            }
        }
    }

    async fn send_photo(&self, recipient_id: i64, photo: &[u8], caption: Option<&str>) -> bool {
        match self.transport.send_photo(recipient_id, photo, caption).await {
            Ok(()) => {
                debug!(recipient_id, bytes = photo.len(), "photo sent");
                true
            }
            Err(err) => {
                error!(recipient_id, error = %err, "failed to send photo");
                false
            }
        }
    }

    #[instrument(
        skip_all,
        fields(
            recipient_id = payload.recipient_id(),
            message_type = payload.message_type(),
        )
    )]
    async fn send_notification(&self, payload: &NotificationPayload) -> DeliveryResult {
        let text = format_notification(payload);
        match self.transport.send_text(payload.recipient_id(), &text).await {
            Ok(()) => {
                debug!("notification delivered");
                DeliveryResult::delivered(payload.recipient_id(), self.clock.now())
            }
            Err(err) => {
                error!(error = %err, "notification delivery failed");
                DeliveryResult::failed(payload.recipient_id(), err.to_string(), self.clock.now())
            }
        }
    }
}
