//! Scheduler client.
//!
//! Sends [`SchedulerCommand`]s to a worker and pairs each one with its
//! response by `command_id`. A background task drains the response channel
//! into the in-flight table; callers wait on a oneshot with a timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use lifeweeks_core::command::Command;
use lifeweeks_core::scheduler::{JobType, ScheduleTrigger, SchedulerPort};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::application::channel::ClientEndpoint;
use crate::domain::commands::{SchedulerCommand, SchedulerResponse};
use crate::domain::engine::ScheduledJob;
use crate::domain::error::SchedulerError;

type PendingTable = Arc<Mutex<HashMap<Uuid, oneshot::Sender<SchedulerResponse>>>>;

/// Client tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerClientConfig {
    /// How long to wait for each response.
    pub timeout: Duration,
}

impl Default for SchedulerClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Request/response client for a [`SchedulerWorker`](super::worker::SchedulerWorker).
pub struct SchedulerClient {
    commands: mpsc::Sender<SchedulerCommand>,
    pending: PendingTable,
    listener: JoinHandle<()>,
    config: SchedulerClientConfig,
}

impl std::fmt::Debug for SchedulerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerClient")
            .field("pending", &self.pending_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SchedulerClient {
    /// Starts the response listener on the current runtime and returns the
    /// connected client.
    #[must_use]
    pub fn start(endpoint: ClientEndpoint, config: SchedulerClientConfig) -> Self {
        let pending: PendingTable = Arc::default();
        let listener = tokio::spawn(listen(endpoint.responses, Arc::clone(&pending)));
        info!("scheduler client listener started");
        Self {
            commands: endpoint.commands,
            pending,
            listener,
            config,
        }
    }

    /// Number of commands still waiting for a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sends `command` and waits for its response. One deadline covers both
    /// enqueueing the command and receiving the reply, so a full command
    /// channel times out like a silent worker.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Disconnected` when the worker is gone and
    /// `SchedulerError::Timeout` when no response arrives in time. A failed
    /// command is removed from the in-flight table.
    #[instrument(
        skip_all,
        fields(
            command_type = command.command_name(),
            command_id = %command.command_id(),
        )
    )]
    pub async fn send(&self, command: SchedulerCommand) -> Result<SchedulerResponse, SchedulerError> {
        let command_id = command.command_id();
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command_id, tx);

        let exchange = async {
            self.commands
                .send(command)
                .await
                .map_err(|_| SchedulerError::Disconnected)?;
            debug!("command sent");
            rx.await.map_err(|_| SchedulerError::Disconnected)
        };

        match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                self.forget(command_id);
                Err(err)
            }
            Err(_) => {
                self.forget(command_id);
                error!(timeout = ?self.config.timeout, "timed out waiting for scheduler response");
                Err(SchedulerError::Timeout(self.config.timeout))
            }
        }
    }

    /// Sends `command` and returns the response data of a successful reply.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus `SchedulerError::Rejected` when the
    /// worker answers with a failure.
    pub async fn execute(&self, command: SchedulerCommand) -> Result<Option<Value>, SchedulerError> {
        self.send(command).await?.into_result()
    }

    /// Pauses the jobs of `user_id`, or every job when `None`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` when the round trip fails.
    pub async fn pause(&self, user_id: Option<i64>) -> Result<(), SchedulerError> {
        self.execute(SchedulerCommand::pause(user_id)).await.map(|_| ())
    }

    /// Resumes the jobs of `user_id`, or every job when `None`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` when the round trip fails.
    pub async fn resume(&self, user_id: Option<i64>) -> Result<(), SchedulerError> {
        self.execute(SchedulerCommand::resume(user_id)).await.map(|_| ())
    }

    /// Lists the jobs installed in the worker.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` when the round trip fails or the reply has
    /// no decodable `jobs` list.
    pub async fn list_jobs(&self) -> Result<Vec<ScheduledJob>, SchedulerError> {
        let data = self
            .execute(SchedulerCommand::list_jobs())
            .await?
            .and_then(|mut data| data.get_mut("jobs").map(Value::take))
            .ok_or_else(|| SchedulerError::UnexpectedResponse("missing jobs".to_owned()))?;
        serde_json::from_value(data).map_err(|err| SchedulerError::UnexpectedResponse(err.to_string()))
    }

    /// Looks up one job by id. `Ok(None)` means the worker has no such job.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` when the round trip fails or the reply has
    /// no decodable `job` entry.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<ScheduledJob>, SchedulerError> {
        let data = self
            .execute(SchedulerCommand::get_job(job_id))
            .await?
            .and_then(|mut data| data.get_mut("job").map(Value::take))
            .ok_or_else(|| SchedulerError::UnexpectedResponse("missing job".to_owned()))?;
        serde_json::from_value(data).map_err(|err| SchedulerError::UnexpectedResponse(err.to_string()))
    }

    /// Whether the worker answers and reports itself running. Any failure,
    /// including a timeout, reads as unhealthy.
    pub async fn health_check(&self) -> bool {
        match self.execute(SchedulerCommand::health_check()).await {
            Ok(Some(data)) => data.get("running").and_then(Value::as_bool).unwrap_or(false),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "scheduler health check failed");
                false
            }
        }
    }

    /// Asks the worker to stop and waits for its acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError` when the round trip fails.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        self.execute(SchedulerCommand::shutdown()).await.map(|_| ())
    }

    fn forget(&self, command_id: Uuid) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&command_id);
    }
}

impl Drop for SchedulerClient {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn listen(mut responses: mpsc::Receiver<SchedulerResponse>, pending: PendingTable) {
    while let Some(response) = responses.recv().await {
        let waiter = pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&response.command_id());
        match waiter {
            Some(waiter) => {
                // The caller may have given up between removal and send.
                let _ = waiter.send(response);
            }
            None => debug!(
                command_id = %response.command_id(),
                "response for unknown or expired command"
            ),
        }
    }
    warn!("scheduler response channel closed");
    // Dropping the senders wakes every waiter with a disconnect.
    pending.lock().unwrap_or_else(PoisonError::into_inner).clear();
}

#[async_trait]
impl SchedulerPort for SchedulerClient {
    async fn schedule_job(
        &self,
        job_id: &str,
        trigger: &ScheduleTrigger,
        user_id: i64,
        job_type: JobType,
    ) -> bool {
        let command = SchedulerCommand::reschedule(user_id, job_id, job_type, trigger);
        match self.execute(command).await {
            Ok(_) => true,
            Err(err) => {
                error!(job_id, user_id, error = %err, "failed to schedule job");
                false
            }
        }
    }

    async fn remove_job(&self, job_id: &str) -> bool {
        match self.execute(SchedulerCommand::remove_job(job_id)).await {
            Ok(_) => true,
            Err(SchedulerError::Rejected(reason)) => {
                debug!(job_id, reason = %reason, "job not removed");
                false
            }
            Err(err) => {
                warn!(job_id, error = %err, "failed to remove job");
                false
            }
        }
    }
}
