//! Command abstractions for messages that cross a process boundary.

use uuid::Uuid;

/// Trait implemented by every command sent to another process.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Wire name of the command (for logging/routing).
    fn command_name(&self) -> &'static str;

    /// Identifier that pairs this command with its response.
    fn command_id(&self) -> Uuid;

    /// The user the command acts on, or `None` for global commands.
    fn target_user(&self) -> Option<i64>;

    /// Whether the receiver stops servicing commands after this one.
    fn is_terminal(&self) -> bool {
        false
    }
}
