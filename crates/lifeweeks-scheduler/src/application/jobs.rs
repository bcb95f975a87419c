//! Job execution.

use std::sync::Arc;

use async_trait::async_trait;
use lifeweeks_core::event::Event;
use lifeweeks_core::gateway::NotificationGateway;
use lifeweeks_core::scheduler::JobType;
use lifeweeks_event_bus::EventBus;
use lifeweeks_notifications::application::notification_service::NotificationService;
use tracing::{error, info, instrument, warn};

use crate::application::worker::JobRunner;
use crate::domain::engine::ScheduledJob;

/// Generates the job's notification, delivers it and publishes a
/// `NotificationSent` event with the outcome.
pub struct NotificationJob {
    service: NotificationService,
    gateway: Arc<dyn NotificationGateway>,
    bus: Arc<EventBus>,
}

impl std::fmt::Debug for NotificationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationJob")
            .field("channel", &self.gateway.channel())
            .finish_non_exhaustive()
    }
}

impl NotificationJob {
    /// Creates a runner delivering through `gateway`.
    #[must_use]
    pub fn new(
        service: NotificationService,
        gateway: Arc<dyn NotificationGateway>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            service,
            gateway,
            bus,
        }
    }
}

#[async_trait]
impl JobRunner for NotificationJob {
    #[instrument(
        skip_all,
        fields(job_id = %job.job_id, user_id = job.user_id, job_type = %job.job_type)
    )]
    async fn run(&self, job: &ScheduledJob) {
        info!("executing job");
        let payload = match job.job_type {
            JobType::WeeklySummary => self.service.generate_weekly_summary(job.user_id).await,
        };
        let Some(payload) = payload else {
            warn!("no payload generated, skipping delivery");
            return;
        };

        let result = self.gateway.send_notification(&payload).await;
        if result.success() {
            info!(channel = self.gateway.channel(), "notification sent");
        } else {
            error!(
                channel = self.gateway.channel(),
                error = result.error().unwrap_or_default(),
                "notification delivery failed"
            );
        }

        self.bus
            .publish(&Event::notification_sent(
                job.user_id,
                payload.message_type(),
                result.success(),
                result.error().map(str::to_owned),
            ))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{NaiveDate, TimeZone, Utc};
    use lifeweeks_core::event::{EventKind, EventType};
    use lifeweeks_core::profile::UserProfile;
    use lifeweeks_core::scheduler::ScheduleTrigger;
    use lifeweeks_core::statistics::LifeStatistics;
    use lifeweeks_event_bus::handler_fn;
    use lifeweeks_notifications::application::notification_service::NotificationSettings;
    use lifeweeks_notifications::gateways::{LoggingGateway, TelegramNotificationGateway};
    use lifeweeks_test_support::{
        FailingTransport, FixedClock, FixedLifeCalculator, InMemoryUserRepository,
        PassthroughLocalizer,
    };

    use super::*;

    fn service(users: InMemoryUserRepository) -> NotificationService {
        NotificationService::new(
            Arc::new(users),
            Arc::new(FixedLifeCalculator(LifeStatistics {
                age: 35,
                life_expectancy: 80,
                total_weeks_lived: 1870,
                remaining_weeks: 2290,
                total_weeks_expected: 4160,
                percentage_lived: 0.45,
            })),
            Arc::new(PassthroughLocalizer),
            Arc::new(FixedClock::at(2026, 1, 12, 9, 0)),
            NotificationSettings::default(),
        )
    }

    fn job(user_id: i64) -> ScheduledJob {
        ScheduledJob {
            job_id: JobType::WeeklySummary.job_id(user_id),
            user_id,
            job_type: JobType::WeeklySummary,
            trigger: ScheduleTrigger::weekly_default(),
            next_run_at: Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).unwrap(),
            paused: false,
        }
    }

    fn sent_events(bus: &EventBus) -> Arc<Mutex<Vec<Event>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        bus.subscribe(
            EventType::NotificationSent,
            handler_fn("capture", move |event| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().unwrap().push(event);
                    Ok(())
                }
            }),
        );
        events
    }

    fn born(user_id: i64) -> UserProfile {
        UserProfile::new(user_id).with_birth_date(NaiveDate::from_ymd_opt(1990, 3, 15).unwrap())
    }

    #[tokio::test]
    async fn test_run_delivers_and_publishes_success() {
        // Arrange
        let bus = Arc::new(EventBus::new());
        let events = sent_events(&bus);
        let gateway = Arc::new(LoggingGateway::new(Arc::new(FixedClock::at(2026, 1, 12, 9, 0))));
        let runner = NotificationJob::new(
            service(InMemoryUserRepository::with_users([born(7)])),
            gateway.clone(),
            Arc::clone(&bus),
        );

        // Act
        runner.run(&job(7)).await;

        // Assert
        assert_eq!(gateway.notifications().len(), 1);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let EventKind::NotificationSent(sent) = events[0].kind() else {
            panic!("expected NotificationSent");
        };
        assert_eq!(sent.user_id, 7);
        assert_eq!(sent.message_type, "weekly_summary");
        assert!(sent.success);
        assert!(sent.error.is_none());
    }

    #[tokio::test]
    async fn test_run_publishes_failure_with_error_text() {
        // Arrange
        let bus = Arc::new(EventBus::new());
        let events = sent_events(&bus);
        let clock = Arc::new(FixedClock::at(2026, 1, 12, 9, 0));
        let runner = NotificationJob::new(
            service(InMemoryUserRepository::with_users([born(8)])),
            Arc::new(TelegramNotificationGateway::new(FailingTransport, clock)),
            Arc::clone(&bus),
        );

        // Act
        runner.run(&job(8)).await;

        // Assert
        let events = events.lock().unwrap();
        let EventKind::NotificationSent(sent) = events[0].kind() else {
            panic!("expected NotificationSent");
        };
        assert!(!sent.success);
        assert!(!sent.error.as_deref().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_run_skips_user_without_birth_date() {
        // Arrange
        let bus = Arc::new(EventBus::new());
        let events = sent_events(&bus);
        let gateway = Arc::new(LoggingGateway::new(Arc::new(FixedClock::at(2026, 1, 12, 9, 0))));
        let runner = NotificationJob::new(
            service(InMemoryUserRepository::with_users([UserProfile::new(9)])),
            gateway.clone(),
            Arc::clone(&bus),
        );

        // Act
        runner.run(&job(9)).await;

        // Assert
        assert!(gateway.sent().is_empty());
        assert!(events.lock().unwrap().is_empty());
    }
}
