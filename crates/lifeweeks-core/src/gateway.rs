//! Notification gateway port.

use async_trait::async_trait;
use thiserror::Error;

use crate::notification::{DeliveryResult, NotificationPayload};

/// Failure reported by a messaging provider transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be completed.
    #[error("request failed: {0}")]
    Request(String),

    /// The provider refused delivery to this recipient (blocked bot,
    /// deleted chat).
    #[error("recipient {0} is unreachable")]
    Unreachable(i64),
}

/// Low-level bot platform client.
///
/// This is the wire-facing seam below a gateway: it reports failures as
/// errors, and the gateway turns them into booleans and delivery results.
/// Texts and captions are Telegram HTML (`<b>`, `<i>`, ...).
#[async_trait]
pub trait BotTransport: Send + Sync {
    /// Sends a text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    /// Sends an image to a chat.
    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &[u8],
        caption: Option<&str>,
    ) -> Result<(), TransportError>;
}

/// Channel-specific delivery adapter.
///
/// Implementations catch every transport fault at this boundary: the boolean
/// operations return `false` and the structured operations return a failed
/// [`DeliveryResult`] carrying the transport error text.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Short channel name used in logs (e.g. `"telegram"`).
    fn channel(&self) -> &'static str;

    /// Best-effort delivery of a single text message.
    async fn send_message(&self, recipient_id: i64, message: &str) -> bool;

    /// Best-effort delivery of an image with an optional caption.
    async fn send_photo(&self, recipient_id: i64, photo: &[u8], caption: Option<&str>) -> bool;

    /// Formats `payload` for the channel and delivers it.
    async fn send_notification(&self, payload: &NotificationPayload) -> DeliveryResult;

    /// Delivers `payloads` one by one. Returns one result per payload in
    /// input order; a failed item never stops the remaining ones.
    async fn send_batch(&self, payloads: &[NotificationPayload]) -> Vec<DeliveryResult> {
        let mut results = Vec::with_capacity(payloads.len());
        for payload in payloads {
            results.push(self.send_notification(payload).await);
        }
        results
    }
}
