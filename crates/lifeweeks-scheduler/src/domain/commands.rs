//! Scheduler command protocol.
//!
//! Commands and responses are plain serializable messages so the worker can
//! run behind any channel, in-process or not. Every command gets a fresh
//! `command_id` at construction and the worker answers with a response
//! carrying the same id.

use std::fmt;

use lifeweeks_core::command::Command;
use lifeweeks_core::scheduler::{JobType, ScheduleTrigger};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::error::SchedulerError;

/// Kind of scheduler command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchedulerCommandType {
    /// Install or replace a user's recurring job.
    Reschedule,
    /// Suspend job execution for one user or for everyone.
    Pause,
    /// Undo a previous pause.
    Resume,
    /// Stop the worker. Terminal.
    Shutdown,
    /// Delete a job by id.
    RemoveJob,
    /// List installed jobs.
    ListJobs,
    /// Look up one job by id.
    GetJob,
    /// Liveness probe.
    HealthCheck,
}

impl SchedulerCommandType {
    /// Wire name of the command type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reschedule => "RESCHEDULE",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
            Self::Shutdown => "SHUTDOWN",
            Self::RemoveJob => "REMOVE_JOB",
            Self::ListJobs => "LIST_JOBS",
            Self::GetJob => "GET_JOB",
            Self::HealthCheck => "HEALTH_CHECK",
        }
    }
}

impl fmt::Display for SchedulerCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a [`SchedulerCommandType::Reschedule`] command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReschedulePayload {
    /// Deterministic job id.
    pub job_id: String,
    /// What the job does when it fires.
    pub job_type: JobType,
    /// When the job fires.
    pub trigger: ScheduleTrigger,
}

/// Payload of the [`SchedulerCommandType::RemoveJob`] and
/// [`SchedulerCommandType::GetJob`] commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdPayload {
    /// Job the command targets.
    pub job_id: String,
}

/// A request sent to the scheduler worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerCommand {
    command_type: SchedulerCommandType,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    payload: Map<String, Value>,
    command_id: Uuid,
}

impl SchedulerCommand {
    /// Creates a command with a fresh `command_id`.
    #[must_use]
    pub fn new(
        command_type: SchedulerCommandType,
        user_id: Option<i64>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            command_type,
            user_id,
            payload,
            command_id: Uuid::new_v4(),
        }
    }

    /// Installs or replaces the job `job_id` for `user_id`.
    #[must_use]
    pub fn reschedule(
        user_id: i64,
        job_id: impl Into<String>,
        job_type: JobType,
        trigger: &ScheduleTrigger,
    ) -> Self {
        let payload = ReschedulePayload {
            job_id: job_id.into(),
            job_type,
            trigger: trigger.clone(),
        };
        Self::new(
            SchedulerCommandType::Reschedule,
            Some(user_id),
            to_map(&payload),
        )
    }

    /// Pauses one user's jobs, or every job when `user_id` is `None`.
    #[must_use]
    pub fn pause(user_id: Option<i64>) -> Self {
        Self::new(SchedulerCommandType::Pause, user_id, Map::new())
    }

    /// Resumes one user's jobs, or every job when `user_id` is `None`.
    #[must_use]
    pub fn resume(user_id: Option<i64>) -> Self {
        Self::new(SchedulerCommandType::Resume, user_id, Map::new())
    }

    /// Stops the worker.
    #[must_use]
    pub fn shutdown() -> Self {
        Self::new(SchedulerCommandType::Shutdown, None, Map::new())
    }

    /// Deletes the job `job_id`.
    #[must_use]
    pub fn remove_job(job_id: impl Into<String>) -> Self {
        let payload = JobIdPayload {
            job_id: job_id.into(),
        };
        Self::new(SchedulerCommandType::RemoveJob, None, to_map(&payload))
    }

    /// Looks up the job `job_id`.
    #[must_use]
    pub fn get_job(job_id: impl Into<String>) -> Self {
        let payload = JobIdPayload {
            job_id: job_id.into(),
        };
        Self::new(SchedulerCommandType::GetJob, None, to_map(&payload))
    }

    /// Lists installed jobs.
    #[must_use]
    pub fn list_jobs() -> Self {
        Self::new(SchedulerCommandType::ListJobs, None, Map::new())
    }

    /// Asks whether the worker is running.
    #[must_use]
    pub fn health_check() -> Self {
        Self::new(SchedulerCommandType::HealthCheck, None, Map::new())
    }

    /// The command kind.
    #[must_use]
    pub const fn command_type(&self) -> SchedulerCommandType {
        self.command_type
    }

    /// The user the command acts on.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// Raw command payload.
    #[must_use]
    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidPayload` when the payload does not
    /// have the shape `T` expects.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, SchedulerError> {
        serde_json::from_value(Value::Object(self.payload.clone())).map_err(|err| {
            SchedulerError::InvalidPayload {
                command_type: self.command_type,
                reason: err.to_string(),
            }
        })
    }
}

impl Command for SchedulerCommand {
    fn command_name(&self) -> &'static str {
        self.command_type.as_str()
    }

    fn command_id(&self) -> Uuid {
        self.command_id
    }

    fn target_user(&self) -> Option<i64> {
        self.user_id
    }

    fn is_terminal(&self) -> bool {
        self.command_type == SchedulerCommandType::Shutdown
    }
}

fn to_map<T: Serialize>(payload: &T) -> Map<String, Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// The worker's answer to one [`SchedulerCommand`].
///
/// `error` is present exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerResponse {
    success: bool,
    command_id: Uuid,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl SchedulerResponse {
    /// A successful response without data.
    #[must_use]
    pub const fn ok(command_id: Uuid) -> Self {
        Self {
            success: true,
            command_id,
            error: None,
            data: None,
        }
    }

    /// A successful response carrying `data`.
    #[must_use]
    pub const fn ok_with(command_id: Uuid, data: Value) -> Self {
        Self {
            success: true,
            command_id,
            error: None,
            data: Some(data),
        }
    }

    /// A failed response.
    #[must_use]
    pub fn failed(command_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            success: false,
            command_id,
            error: Some(error.into()),
            data: None,
        }
    }

    /// Whether the command succeeded.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Id of the command this answers.
    #[must_use]
    pub const fn command_id(&self) -> Uuid {
        self.command_id
    }

    /// Failure reason.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Command-specific result data.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Splits the response into its data or its failure reason.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Rejected` for a failed response.
    pub fn into_result(self) -> Result<Option<Value>, SchedulerError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(SchedulerError::Rejected(
                self.error.unwrap_or_else(|| "unspecified failure".to_owned()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_each_command_gets_fresh_id() {
        let first = SchedulerCommand::health_check();
        let second = SchedulerCommand::health_check();

        assert_ne!(first.command_id(), second.command_id());
    }

    #[test]
    fn test_reschedule_wire_format() {
        // Arrange
        let trigger = ScheduleTrigger::weekly_default();
        let command = SchedulerCommand::reschedule(
            123,
            JobType::WeeklySummary.job_id(123),
            JobType::WeeklySummary,
            &trigger,
        );

        // Act
        let wire = serde_json::to_value(&command).unwrap();

        // Assert
        assert_eq!(wire["command_type"], "RESCHEDULE");
        assert_eq!(wire["user_id"], 123);
        assert_eq!(wire["payload"]["job_id"], "weekly_123");
        assert_eq!(wire["payload"]["job_type"], "weekly_summary");
        assert_eq!(wire["payload"]["trigger"]["day_of_week"], 0);
        assert_eq!(wire["payload"]["trigger"]["hour"], 9);
        assert_eq!(wire["command_id"], command.command_id().to_string());
    }

    #[test]
    fn test_reschedule_payload_decodes() {
        let trigger = ScheduleTrigger::new(4, 18, 30, "UTC").unwrap();
        let command =
            SchedulerCommand::reschedule(7, "weekly_7", JobType::WeeklySummary, &trigger);

        let payload: ReschedulePayload = command.decode_payload().unwrap();

        assert_eq!(payload.job_id, "weekly_7");
        assert_eq!(payload.trigger, trigger);
    }

    #[test]
    fn test_malformed_payload_is_reported() {
        let command = SchedulerCommand::new(SchedulerCommandType::Reschedule, Some(1), Map::new());

        let result = command.decode_payload::<ReschedulePayload>();

        assert!(matches!(
            result,
            Err(SchedulerError::InvalidPayload {
                command_type: SchedulerCommandType::Reschedule,
                ..
            })
        ));
    }

    #[test]
    fn test_only_shutdown_is_terminal() {
        assert!(SchedulerCommand::shutdown().is_terminal());
        assert!(!SchedulerCommand::pause(None).is_terminal());
        assert!(!SchedulerCommand::remove_job("weekly_1").is_terminal());
    }

    #[test]
    fn test_command_reports_target_user() {
        assert_eq!(SchedulerCommand::pause(Some(5)).target_user(), Some(5));
        assert_eq!(SchedulerCommand::resume(None).target_user(), None);
        assert_eq!(SchedulerCommand::list_jobs().command_name(), "LIST_JOBS");
    }

    #[test]
    fn test_get_job_carries_job_id() {
        let command = SchedulerCommand::get_job("weekly_4");

        let payload: JobIdPayload = command.decode_payload().unwrap();

        assert_eq!(command.command_name(), "GET_JOB");
        assert_eq!(payload.job_id, "weekly_4");
    }

    #[test]
    fn test_command_round_trips_through_json() {
        let command = SchedulerCommand::remove_job("weekly_9");

        let decoded: SchedulerCommand =
            serde_json::from_str(&serde_json::to_string(&command).unwrap()).unwrap();

        assert_eq!(decoded, command);
    }

    #[test]
    fn test_failed_response_becomes_rejection() {
        let id = Uuid::new_v4();

        let result = SchedulerResponse::failed(id, "job weekly_1 not found").into_result();

        assert!(matches!(result, Err(SchedulerError::Rejected(reason)) if reason.contains("weekly_1")));
    }

    #[test]
    fn test_successful_response_yields_data() {
        let id = Uuid::new_v4();
        let response = SchedulerResponse::ok_with(id, json!({"running": true}));

        assert_eq!(response.command_id(), id);
        assert!(response.error().is_none());
        assert_eq!(response.into_result().unwrap(), Some(json!({"running": true})));
    }
}
