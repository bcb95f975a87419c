//! Domain event abstractions.
//!
//! Every event is an [`Event`] envelope: immutable [`EventMetadata`] plus an
//! [`EventKind`] payload. Subscriptions are keyed by the fieldless
//! [`EventType`] discriminant, so routing never inspects runtime type
//! information.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlation ID for tracing an event through its handlers.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    /// Creates metadata with a fresh correlation ID stamped at `clock.now()`.
    #[must_use]
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            timestamp: clock.now(),
        }
    }
}

/// Subscription key identifying one concrete event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// See [`UserSettingsChanged`].
    UserSettingsChanged,
    /// See [`UserRegistered`].
    UserRegistered,
    /// See [`UserDeleted`].
    UserDeleted,
    /// See [`ScheduleRecalculationRequested`].
    ScheduleRecalculationRequested,
    /// See [`NotificationSent`].
    NotificationSent,
}

impl EventType {
    /// Returns the stable event type name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserSettingsChanged => USER_SETTINGS_CHANGED_EVENT_TYPE,
            Self::UserRegistered => USER_REGISTERED_EVENT_TYPE,
            Self::UserDeleted => USER_DELETED_EVENT_TYPE,
            Self::ScheduleRecalculationRequested => SCHEDULE_RECALCULATION_REQUESTED_EVENT_TYPE,
            Self::NotificationSent => NOTIFICATION_SENT_EVENT_TYPE,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type identifier for [`UserSettingsChanged`].
pub const USER_SETTINGS_CHANGED_EVENT_TYPE: &str = "user.settings_changed";

/// Event type identifier for [`UserRegistered`].
pub const USER_REGISTERED_EVENT_TYPE: &str = "user.registered";

/// Event type identifier for [`UserDeleted`].
pub const USER_DELETED_EVENT_TYPE: &str = "user.deleted";

/// Event type identifier for [`ScheduleRecalculationRequested`].
pub const SCHEDULE_RECALCULATION_REQUESTED_EVENT_TYPE: &str =
    "scheduler.recalculation_requested";

/// Event type identifier for [`NotificationSent`].
pub const NOTIFICATION_SENT_EVENT_TYPE: &str = "notification.sent";

/// Emitted whenever a persisted user setting mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettingsChanged {
    /// The user whose settings changed.
    pub user_id: i64,
    /// Name of the changed setting.
    pub setting_name: String,
    /// Previous value, if any.
    pub old_value: Option<serde_json::Value>,
    /// New value, if any.
    pub new_value: Option<serde_json::Value>,
}

/// Emitted once per successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    /// The newly registered user.
    pub user_id: i64,
}

/// Emitted once per account removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeleted {
    /// The removed user.
    pub user_id: i64,
}

/// Emitted when a schedule recompute is requested without a specific
/// setting change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecalculationRequested {
    /// The user whose schedule should be recomputed.
    pub user_id: i64,
}

/// Emitted after every delivery attempt, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSent {
    /// The recipient of the notification.
    pub user_id: i64,
    /// Message type tag of the delivered payload.
    pub message_type: String,
    /// Whether the delivery succeeded.
    pub success: bool,
    /// Transport error text when delivery failed.
    pub error: Option<String>,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A user setting has changed.
    UserSettingsChanged(UserSettingsChanged),
    /// A user has registered.
    UserRegistered(UserRegistered),
    /// A user has been deleted.
    UserDeleted(UserDeleted),
    /// A schedule recompute was requested.
    ScheduleRecalculationRequested(ScheduleRecalculationRequested),
    /// A notification delivery was attempted.
    NotificationSent(NotificationSent),
}

impl EventKind {
    /// Returns the subscription key for this payload.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::UserSettingsChanged(_) => EventType::UserSettingsChanged,
            Self::UserRegistered(_) => EventType::UserRegistered,
            Self::UserDeleted(_) => EventType::UserDeleted,
            Self::ScheduleRecalculationRequested(_) => EventType::ScheduleRecalculationRequested,
            Self::NotificationSent(_) => EventType::NotificationSent,
        }
    }

    /// Returns the user every event variant refers to.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        match self {
            Self::UserSettingsChanged(e) => e.user_id,
            Self::UserRegistered(e) => e.user_id,
            Self::UserDeleted(e) => e.user_id,
            Self::ScheduleRecalculationRequested(e) => e.user_id,
            Self::NotificationSent(e) => e.user_id,
        }
    }
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type (used for subscription routing).
    fn event_type(&self) -> EventType;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}

/// Immutable domain event envelope.
///
/// Fields are private: once built, neither the metadata nor the payload can
/// change.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    metadata: EventMetadata,
    kind: EventKind,
}

impl Event {
    /// Wraps `kind` with fresh metadata taken from the system clock.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self::at(kind, &SystemClock)
    }

    /// Wraps `kind` with fresh metadata taken from `clock`.
    #[must_use]
    pub fn at(kind: EventKind, clock: &dyn Clock) -> Self {
        Self {
            metadata: EventMetadata::new(clock),
            kind,
        }
    }

    /// Returns the event payload.
    #[must_use]
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Shorthand for a [`UserSettingsChanged`] event.
    #[must_use]
    pub fn user_settings_changed(
        user_id: i64,
        setting_name: impl Into<String>,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    ) -> Self {
        Self::new(EventKind::UserSettingsChanged(UserSettingsChanged {
            user_id,
            setting_name: setting_name.into(),
            old_value,
            new_value,
        }))
    }

    /// Shorthand for a [`UserRegistered`] event.
    #[must_use]
    pub fn user_registered(user_id: i64) -> Self {
        Self::new(EventKind::UserRegistered(UserRegistered { user_id }))
    }

    /// Shorthand for a [`UserDeleted`] event.
    #[must_use]
    pub fn user_deleted(user_id: i64) -> Self {
        Self::new(EventKind::UserDeleted(UserDeleted { user_id }))
    }

    /// Shorthand for a [`ScheduleRecalculationRequested`] event.
    #[must_use]
    pub fn schedule_recalculation_requested(user_id: i64) -> Self {
        Self::new(EventKind::ScheduleRecalculationRequested(
            ScheduleRecalculationRequested { user_id },
        ))
    }

    /// Shorthand for a [`NotificationSent`] event.
    #[must_use]
    pub fn notification_sent(
        user_id: i64,
        message_type: impl Into<String>,
        success: bool,
        error: Option<String>,
    ) -> Self {
        Self::new(EventKind::NotificationSent(NotificationSent {
            user_id,
            message_type: message_type.into(),
            success,
            error,
        }))
    }
}

impl DomainEvent for Event {
    fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("EventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
