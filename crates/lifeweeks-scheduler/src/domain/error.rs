//! Scheduler errors.

use std::time::Duration;

use thiserror::Error;

use crate::domain::commands::SchedulerCommandType;

/// Failures of a scheduler command round trip.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No response arrived in time. The pending entry has been dropped.
    #[error("no scheduler response within {0:?}")]
    Timeout(Duration),

    /// The worker side of the channel is gone.
    #[error("scheduler worker is not running")]
    Disconnected,

    /// The worker answered with a failure.
    #[error("scheduler rejected command: {0}")]
    Rejected(String),

    /// The job to act on does not exist.
    #[error("job {0} not found")]
    JobNotFound(String),

    /// The command payload does not match its type.
    #[error("invalid {command_type} payload: {reason}")]
    InvalidPayload {
        /// Type of the offending command.
        command_type: SchedulerCommandType,
        /// Decoder message.
        reason: String,
    },

    /// The response data does not have the expected shape.
    #[error("unexpected scheduler response: {0}")]
    UnexpectedResponse(String),
}
