//! Event listeners bridging user lifecycle events to the scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::event::{Event, EventKind, EventType};
use lifeweeks_core::repository::UserProfileRepository;
use lifeweeks_core::scheduler::{JobType, ScheduleTrigger, SchedulerPort};
use lifeweeks_event_bus::{EventBus, EventHandler};
use tracing::{debug, error, info, instrument, warn};

/// Name of the listener keeping weekly jobs in sync with user state.
pub const SCHEDULE_REFRESH_LISTENER: &str = "schedule_refresh";

/// Name of the listener removing jobs of deleted users.
pub const JOB_REMOVAL_LISTENER: &str = "job_removal";

/// Name of the listener logging delivery outcomes.
pub const DELIVERY_AUDIT_LISTENER: &str = "delivery_audit";

/// Events that make [`ScheduleRefreshListener`] recompute a user's job.
pub const SCHEDULE_REFRESH_EVENTS: [EventType; 3] = [
    EventType::UserSettingsChanged,
    EventType::UserRegistered,
    EventType::ScheduleRecalculationRequested,
];

/// Installs or replaces the weekly summary job of the user an event refers
/// to.
pub struct ScheduleRefreshListener {
    users: Arc<dyn UserProfileRepository>,
    scheduler: Arc<dyn SchedulerPort>,
}

impl ScheduleRefreshListener {
    /// Creates the listener.
    #[must_use]
    pub fn new(users: Arc<dyn UserProfileRepository>, scheduler: Arc<dyn SchedulerPort>) -> Self {
        Self { users, scheduler }
    }
}

#[async_trait]
impl EventHandler for ScheduleRefreshListener {
    fn name(&self) -> &str {
        SCHEDULE_REFRESH_LISTENER
    }

    #[instrument(skip_all, fields(event_type = %event.kind().event_type(), user_id = event.kind().user_id()))]
    async fn handle(&self, event: &Event) -> Result<(), DomainError> {
        if let EventKind::UserSettingsChanged(changed) = event.kind() {
            debug!(setting = %changed.setting_name, "settings changed");
        }
        let user_id = event.kind().user_id();

        if self.users.get_user_profile(user_id).await?.is_none() {
            warn!("user not found, schedule not refreshed");
            return Ok(());
        }

        // TODO: build the trigger from settings.notifications_day,
        // notifications_time and timezone once the job engine evaluates
        // non-UTC zones.
        let trigger = ScheduleTrigger::weekly_default();
        let job_type = JobType::WeeklySummary;
        let job_id = job_type.job_id(user_id);

        if self
            .scheduler
            .schedule_job(&job_id, &trigger, user_id, job_type)
            .await
        {
            info!(job_id = %job_id, "weekly job scheduled");
        } else {
            error!(job_id = %job_id, "failed to schedule weekly job");
        }
        Ok(())
    }
}

/// Removes the weekly summary job of a deleted user.
pub struct JobRemovalListener {
    scheduler: Arc<dyn SchedulerPort>,
}

impl JobRemovalListener {
    /// Creates the listener.
    #[must_use]
    pub fn new(scheduler: Arc<dyn SchedulerPort>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl EventHandler for JobRemovalListener {
    fn name(&self) -> &str {
        JOB_REMOVAL_LISTENER
    }

    #[instrument(skip_all, fields(user_id = event.kind().user_id()))]
    async fn handle(&self, event: &Event) -> Result<(), DomainError> {
        let job_id = JobType::WeeklySummary.job_id(event.kind().user_id());
        if self.scheduler.remove_job(&job_id).await {
            info!(job_id = %job_id, "weekly job removed");
        } else {
            debug!(job_id = %job_id, "job not found or already removed");
        }
        Ok(())
    }
}

/// Logs the outcome of every delivery attempt.
#[derive(Debug, Default)]
pub struct DeliveryAuditListener;

#[async_trait]
impl EventHandler for DeliveryAuditListener {
    fn name(&self) -> &str {
        DELIVERY_AUDIT_LISTENER
    }

    async fn handle(&self, event: &Event) -> Result<(), DomainError> {
        let EventKind::NotificationSent(sent) = event.kind() else {
            return Ok(());
        };
        if sent.success {
            info!(
                user_id = sent.user_id,
                message_type = %sent.message_type,
                "notification delivered"
            );
        } else {
            warn!(
                user_id = sent.user_id,
                message_type = %sent.message_type,
                error = sent.error.as_deref().unwrap_or_default(),
                "notification not delivered"
            );
        }
        Ok(())
    }
}

fn subscribe_once(bus: &EventBus, event_type: EventType, handler: &Arc<dyn EventHandler>) -> bool {
    let already = bus
        .get_handlers(event_type)
        .iter()
        .any(|registered| registered.name() == handler.name());
    if already {
        return false;
    }
    bus.subscribe(event_type, Arc::clone(handler));
    true
}

/// Subscribes the scheduler listeners to `bus`. Listeners already present
/// (by name) are not added again, so calling this twice leaves one
/// subscription per listener and event type. Returns the number of new
/// subscriptions.
pub fn register_event_listeners(
    bus: &EventBus,
    users: Arc<dyn UserProfileRepository>,
    scheduler: Arc<dyn SchedulerPort>,
) -> usize {
    let refresh: Arc<dyn EventHandler> =
        Arc::new(ScheduleRefreshListener::new(users, Arc::clone(&scheduler)));
    let removal: Arc<dyn EventHandler> = Arc::new(JobRemovalListener::new(scheduler));
    let audit: Arc<dyn EventHandler> = Arc::new(DeliveryAuditListener);

    let mut added = 0;
    for event_type in SCHEDULE_REFRESH_EVENTS {
        added += usize::from(subscribe_once(bus, event_type, &refresh));
    }
    added += usize::from(subscribe_once(bus, EventType::UserDeleted, &removal));
    added += usize::from(subscribe_once(bus, EventType::NotificationSent, &audit));

    info!(added, "registered scheduler event listeners");
    added
}

#[cfg(test)]
mod tests {
    use lifeweeks_core::profile::UserProfile;
    use lifeweeks_test_support::{
        FailingUserRepository, InMemoryUserRepository, RecordingSchedulerPort,
    };
    use serde_json::json;

    use super::*;

    fn wired(
        users: Arc<dyn UserProfileRepository>,
        scheduler: Arc<RecordingSchedulerPort>,
    ) -> EventBus {
        let bus = EventBus::new();
        register_event_listeners(&bus, users, scheduler);
        bus
    }

    #[tokio::test]
    async fn test_settings_change_schedules_weekly_job_once() {
        // Arrange
        let users = Arc::new(InMemoryUserRepository::with_users([UserProfile::new(123)]));
        let scheduler = Arc::new(RecordingSchedulerPort::succeeding());
        let bus = wired(users, scheduler.clone());

        // Act
        bus.publish(&Event::user_settings_changed(
            123,
            "birth_date",
            None,
            Some(json!("1990-03-15")),
        ))
        .await;

        // Assert
        let calls = scheduler.scheduled();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].job_id, "weekly_123");
        assert_eq!(calls[0].user_id, 123);
        assert_eq!(calls[0].job_type, JobType::WeeklySummary);
        assert_eq!(calls[0].trigger, ScheduleTrigger::weekly_default());
    }

    #[tokio::test]
    async fn test_registration_and_recalculation_also_schedule() {
        let users = Arc::new(InMemoryUserRepository::with_users([UserProfile::new(5)]));
        let scheduler = Arc::new(RecordingSchedulerPort::succeeding());
        let bus = wired(users, scheduler.clone());

        bus.publish(&Event::user_registered(5)).await;
        bus.publish(&Event::schedule_recalculation_requested(5)).await;

        assert_eq!(scheduler.scheduled().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_scheduled() {
        // Arrange
        let scheduler = Arc::new(RecordingSchedulerPort::succeeding());
        let bus = wired(Arc::new(InMemoryUserRepository::new()), scheduler.clone());

        // Act
        bus.publish(&Event::user_settings_changed(77, "language", None, Some(json!("en"))))
            .await;

        // Assert
        assert!(scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn test_repository_failure_is_contained_by_bus() {
        let scheduler = Arc::new(RecordingSchedulerPort::succeeding());
        let bus = wired(Arc::new(FailingUserRepository), scheduler.clone());

        bus.publish(&Event::user_registered(1)).await;

        assert!(scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn test_scheduler_failure_is_not_retried() {
        let users = Arc::new(InMemoryUserRepository::with_users([UserProfile::new(3)]));
        let scheduler = Arc::new(RecordingSchedulerPort::with_results(false, false));
        let bus = wired(users, scheduler.clone());

        bus.publish(&Event::user_registered(3)).await;

        assert_eq!(scheduler.scheduled().len(), 1);
    }

    #[tokio::test]
    async fn test_user_deletion_removes_job_and_tolerates_absence() {
        // Arrange
        let scheduler = Arc::new(RecordingSchedulerPort::with_results(true, false));
        let bus = wired(Arc::new(InMemoryUserRepository::new()), scheduler.clone());

        // Act
        bus.publish(&Event::user_deleted(42)).await;
        bus.publish(&Event::user_deleted(42)).await;

        // Assert
        assert_eq!(scheduler.removed(), vec!["weekly_42", "weekly_42"]);
    }

    #[test]
    fn test_register_event_listeners_is_idempotent() {
        // Arrange
        let bus = EventBus::new();
        let users: Arc<dyn UserProfileRepository> = Arc::new(InMemoryUserRepository::new());
        let scheduler: Arc<dyn SchedulerPort> = Arc::new(RecordingSchedulerPort::succeeding());

        // Act
        let first = register_event_listeners(&bus, Arc::clone(&users), Arc::clone(&scheduler));
        let second = register_event_listeners(&bus, users, scheduler);

        // Assert
        assert_eq!(first, 5);
        assert_eq!(second, 0);
        for event_type in SCHEDULE_REFRESH_EVENTS {
            assert_eq!(bus.handler_count(event_type), 1);
        }
        assert_eq!(bus.handler_count(EventType::UserDeleted), 1);
        assert_eq!(bus.handler_count(EventType::NotificationSent), 1);
    }

    #[tokio::test]
    async fn test_delivery_audit_accepts_both_outcomes() {
        let listener = DeliveryAuditListener;

        let ok = listener
            .handle(&Event::notification_sent(1, "weekly_summary", true, None))
            .await;
        let failed = listener
            .handle(&Event::notification_sent(
                1,
                "weekly_summary",
                false,
                Some("blocked".into()),
            ))
            .await;

        assert!(ok.is_ok());
        assert!(failed.is_ok());
    }
}
