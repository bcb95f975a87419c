//! Scheduler worker loop.
//!
//! The worker owns the [`JobEngine`]. It answers every command it receives
//! with exactly one response and, on a fixed tick, hands due jobs to a
//! [`JobRunner`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lifeweeks_core::clock::Clock;
use lifeweeks_core::command::Command;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::application::channel::WorkerEndpoint;
use crate::domain::commands::{
    JobIdPayload, ReschedulePayload, SchedulerCommand, SchedulerCommandType,
    SchedulerResponse,
};
use crate::domain::engine::{JobEngine, ScheduledJob};
use crate::domain::error::SchedulerError;

/// Executes a job that has become due. Implementations handle their own
/// failures; nothing is reported back to the worker.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Runs one occurrence of `job`.
    async fn run(&self, job: &ScheduledJob);
}

/// Worker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// How often the engine is checked for due jobs.
    pub tick_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
        }
    }
}

/// Services scheduler commands and runs due jobs.
pub struct SchedulerWorker {
    commands: mpsc::Receiver<SchedulerCommand>,
    responses: mpsc::Sender<SchedulerResponse>,
    engine: JobEngine,
    runner: Arc<dyn JobRunner>,
    clock: Arc<dyn Clock>,
    config: WorkerConfig,
}

impl std::fmt::Debug for SchedulerWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerWorker")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SchedulerWorker {
    /// Creates a worker listening on `endpoint` with an empty job table.
    #[must_use]
    pub fn new(
        endpoint: WorkerEndpoint,
        runner: Arc<dyn JobRunner>,
        clock: Arc<dyn Clock>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            commands: endpoint.commands,
            responses: endpoint.responses,
            engine: JobEngine::new(),
            runner,
            clock,
            config,
        }
    }

    /// Runs until a SHUTDOWN command has been answered or every command
    /// sender is dropped. Returns the final job table.
    pub async fn run(mut self) -> JobEngine {
        info!(tick_interval = ?self.config.tick_interval, "scheduler worker started");
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        info!("command channel closed");
                        break;
                    };
                    let terminal = command.is_terminal();
                    let response = self.handle(&command);
                    if self.responses.send(response).await.is_err() {
                        warn!(command_id = %command.command_id(), "client dropped before response");
                    }
                    if terminal {
                        info!("shutdown requested");
                        break;
                    }
                }
                _ = ticker.tick() => self.run_due_jobs().await,
            }
        }

        info!(jobs = self.engine.len(), "scheduler worker stopped");
        self.engine
    }

    #[instrument(
        skip_all,
        fields(
            command_type = %command.command_type(),
            command_id = %command.command_id(),
        )
    )]
    fn handle(&mut self, command: &SchedulerCommand) -> SchedulerResponse {
        debug!("handling command");
        let id = command.command_id();
        match self.execute(command) {
            Ok(Some(data)) => SchedulerResponse::ok_with(id, data),
            Ok(None) => SchedulerResponse::ok(id),
            Err(err) => {
                warn!(error = %err, "command failed");
                SchedulerResponse::failed(id, err.to_string())
            }
        }
    }

    fn execute(
        &mut self,
        command: &SchedulerCommand,
    ) -> Result<Option<serde_json::Value>, SchedulerError> {
        let now = self.clock.now();
        match command.command_type() {
            SchedulerCommandType::Reschedule => {
                let payload: ReschedulePayload = command.decode_payload()?;
                let user_id = command.user_id().ok_or(SchedulerError::InvalidPayload {
                    command_type: SchedulerCommandType::Reschedule,
                    reason: "missing user_id".to_owned(),
                })?;
                let replaced = self.engine.upsert(
                    payload.job_id.clone(),
                    user_id,
                    payload.job_type,
                    payload.trigger,
                    now,
                );
                info!(job_id = %payload.job_id, user_id, replaced, "job scheduled");
                Ok(None)
            }
            SchedulerCommandType::RemoveJob => {
                let payload: JobIdPayload = command.decode_payload()?;
                if self.engine.remove(&payload.job_id) {
                    info!(job_id = %payload.job_id, "job removed");
                    Ok(None)
                } else {
                    Err(SchedulerError::JobNotFound(payload.job_id))
                }
            }
            SchedulerCommandType::Pause => {
                let affected = self.engine.pause(command.user_id());
                info!(user_id = ?command.user_id(), affected, "jobs paused");
                Ok(Some(json!({ "affected": affected })))
            }
            SchedulerCommandType::Resume => {
                let affected = self.engine.resume(command.user_id(), now);
                info!(user_id = ?command.user_id(), affected, "jobs resumed");
                Ok(Some(json!({ "affected": affected })))
            }
            SchedulerCommandType::ListJobs => {
                let jobs = serde_json::to_value(self.engine.jobs())
                    .map_err(|err| SchedulerError::UnexpectedResponse(err.to_string()))?;
                Ok(Some(json!({ "jobs": jobs })))
            }
            SchedulerCommandType::GetJob => {
                let payload: JobIdPayload = command.decode_payload()?;
                let job = serde_json::to_value(self.engine.get(&payload.job_id))
                    .map_err(|err| SchedulerError::UnexpectedResponse(err.to_string()))?;
                Ok(Some(json!({ "job": job })))
            }
            SchedulerCommandType::HealthCheck => Ok(Some(json!({
                "running": true,
                "paused": self.engine.is_paused(),
                "jobs": self.engine.len(),
            }))),
            SchedulerCommandType::Shutdown => Ok(None),
        }
    }

    async fn run_due_jobs(&mut self) {
        let due = self.engine.due_jobs(self.clock.now());
        if due.is_empty() {
            return;
        }
        debug!(count = due.len(), "running due jobs");
        for job in &due {
            self.runner.run(job).await;
        }
    }
}
