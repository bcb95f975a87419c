//! Wiring of the notification backbone.

use std::sync::Arc;

use lifeweeks_core::clock::{Clock, SystemClock};
use lifeweeks_core::event::Event;
use lifeweeks_core::gateway::NotificationGateway;
use lifeweeks_core::repository::UserProfileRepository;
use lifeweeks_core::scheduler::SchedulerPort;
use lifeweeks_event_bus::EventBus;
use lifeweeks_notifications::application::notification_service::NotificationService;
use lifeweeks_notifications::domain::catalog::MessageCatalog;
use lifeweeks_notifications::domain::statistics::StandardLifeCalculator;
use lifeweeks_notifications::gateways::LoggingGateway;
use lifeweeks_scheduler::application::channel::{DEFAULT_CHANNEL_CAPACITY, scheduler_channel};
use lifeweeks_scheduler::application::client::SchedulerClient;
use lifeweeks_scheduler::application::jobs::NotificationJob;
use lifeweeks_scheduler::application::listeners::register_event_listeners;
use lifeweeks_scheduler::application::worker::SchedulerWorker;
use lifeweeks_scheduler::domain::engine::JobEngine;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::users::InMemoryUserStore;

/// The running backbone: bus, user store, scheduler client and worker.
pub struct App {
    /// Event bus shared by every component.
    pub bus: Arc<EventBus>,
    /// User profiles.
    pub users: Arc<InMemoryUserStore>,
    /// Scheduler client, also registered as the listeners' scheduler port.
    pub scheduler: Arc<SchedulerClient>,
    /// Delivery gateway used by scheduled jobs.
    pub gateway: Arc<LoggingGateway>,
    worker: JoinHandle<JobEngine>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("users", &self.users.len())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Loads the configured user file, if any, and assembles the backbone on
    /// the system clock.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the user file or message catalog cannot be
    /// loaded.
    pub async fn build(config: &AppConfig) -> Result<Self, AppError> {
        let users = match &config.users_file {
            Some(path) => InMemoryUserStore::load(path).await?,
            None => InMemoryUserStore::new(),
        };
        Self::assemble(config, Arc::new(users), Arc::new(SystemClock))
    }

    /// Assembles the backbone around `users` and `clock`, spawning the
    /// scheduler worker on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Catalog` if the embedded message catalog is
    /// invalid.
    pub fn assemble(
        config: &AppConfig,
        users: Arc<InMemoryUserStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let catalog = MessageCatalog::embedded()?;
        let bus = Arc::new(EventBus::new());
        let repository: Arc<dyn UserProfileRepository> = users.clone();

        let service = NotificationService::new(
            Arc::clone(&repository),
            Arc::new(StandardLifeCalculator::new(Arc::clone(&clock))),
            Arc::new(catalog),
            Arc::clone(&clock),
            config.notification_settings(),
        );
        let gateway = Arc::new(LoggingGateway::new(Arc::clone(&clock)));
        let delivery: Arc<dyn NotificationGateway> = gateway.clone();
        let runner = Arc::new(NotificationJob::new(service, delivery, Arc::clone(&bus)));

        let (client_end, worker_end) = scheduler_channel(DEFAULT_CHANNEL_CAPACITY);
        let worker = SchedulerWorker::new(worker_end, runner, clock, config.worker_config());
        let worker = tokio::spawn(worker.run());
        let scheduler = Arc::new(SchedulerClient::start(client_end, config.client_config()));

        let port: Arc<dyn SchedulerPort> = scheduler.clone();
        register_event_listeners(&bus, repository, port);

        info!(users = users.len(), "notification backbone assembled");
        Ok(Self {
            bus,
            users,
            scheduler,
            gateway,
            worker,
        })
    }

    /// Publishes a schedule recalculation for every stored user. Returns the
    /// number of events published.
    pub async fn seed_schedules(&self) -> usize {
        let user_ids = self.users.user_ids();
        for &user_id in &user_ids {
            self.bus
                .publish(&Event::schedule_recalculation_requested(user_id))
                .await;
        }
        info!(users = user_ids.len(), "requested schedule recalculation");
        user_ids.len()
    }

    /// Stops the scheduler worker and returns its final job table.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Worker` if the worker task panicked. A worker that
    /// does not acknowledge the shutdown is still awaited once the client
    /// side is dropped.
    pub async fn shutdown(self) -> Result<JobEngine, AppError> {
        if let Err(err) = self.scheduler.shutdown().await {
            warn!(error = %err, "scheduler did not acknowledge shutdown");
        }
        let Self {
            bus,
            scheduler,
            worker,
            ..
        } = self;
        // Listeners hold the client; clearing them drops the command sender.
        bus.clear();
        drop(scheduler);

        let engine = worker.await.map_err(|e| AppError::Worker(e.to_string()))?;
        info!(jobs = engine.len(), "scheduler worker stopped");
        Ok(engine)
    }
}
