//! Transport-agnostic notification DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message type tag for the periodic life statistics summary.
pub const MESSAGE_TYPE_WEEKLY_SUMMARY: &str = "weekly_summary";

/// Message type tag for milestone notifications.
pub const MESSAGE_TYPE_MILESTONE: &str = "milestone";

/// Notification content that is not yet bound to any delivery channel.
///
/// Built fresh for every dispatch and never reused across recipients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    recipient_id: i64,
    message_type: String,
    title: String,
    body: String,
    metadata: BTreeMap<String, serde_json::Value>,
    scheduled_at: DateTime<Utc>,
}

impl NotificationPayload {
    /// Creates a payload with empty metadata.
    #[must_use]
    pub fn new(
        recipient_id: i64,
        message_type: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            recipient_id,
            message_type: message_type.into(),
            title: title.into(),
            body: body.into(),
            metadata: BTreeMap::new(),
            scheduled_at,
        }
    }

    /// Returns the payload with one more metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Identifier of the recipient.
    #[must_use]
    pub const fn recipient_id(&self) -> i64 {
        self.recipient_id
    }

    /// Free-form type tag such as [`MESSAGE_TYPE_WEEKLY_SUMMARY`].
    #[must_use]
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Short title; may be empty.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Main message body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Channel-specific extras.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// When the payload was created.
    #[must_use]
    pub const fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }
}

/// Outcome of one delivery attempt.
///
/// `error` is present exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    success: bool,
    recipient_id: i64,
    error: Option<String>,
    delivered_at: DateTime<Utc>,
}

impl DeliveryResult {
    /// A successful delivery.
    #[must_use]
    pub const fn delivered(recipient_id: i64, delivered_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            recipient_id,
            error: None,
            delivered_at,
        }
    }

    /// A failed delivery. Blank error text is replaced so a failure always
    /// carries a message.
    #[must_use]
    pub fn failed(recipient_id: i64, error: impl Into<String>, at: DateTime<Utc>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown delivery error".to_owned();
        }
        Self {
            success: false,
            recipient_id,
            error: Some(error),
            delivered_at: at,
        }
    }

    /// Whether the delivery succeeded.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Identifier of the recipient.
    #[must_use]
    pub const fn recipient_id(&self) -> i64 {
        self.recipient_id
    }

    /// Transport error text for failed deliveries.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the attempt completed.
    #[must_use]
    pub const fn delivered_at(&self) -> DateTime<Utc> {
        self.delivered_at
    }
}
