//! Life Weeks — application error types.

use lifeweeks_notifications::domain::catalog::CatalogError;
use lifeweeks_scheduler::domain::error::SchedulerError;
use thiserror::Error;

/// Startup and runtime errors for the `lifeweeks` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading a file or waiting for a signal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The tracing pipeline could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// The message catalog is invalid.
    #[error("message catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The scheduler worker did not answer or stopped abnormally.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// The scheduler worker task panicked or was cancelled.
    #[error("scheduler worker failed: {0}")]
    Worker(String),
}
