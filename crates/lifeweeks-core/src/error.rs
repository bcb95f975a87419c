//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No profile exists for the user.
    #[error("user not found: {0}")]
    UserNotFound(i64),

    /// The user exists but has not recorded a birth date.
    #[error("user {0} has no birth date")]
    MissingBirthDate(i64),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// An event handler failed while processing an event.
    #[error("handler error: {0}")]
    Handler(String),
}
