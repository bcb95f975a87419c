//! Command and response channels between a scheduler client and its worker.

use tokio::sync::mpsc;

use crate::domain::commands::{SchedulerCommand, SchedulerResponse};

/// Default buffer size of each direction.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// The client's half: sends commands, receives responses.
#[derive(Debug)]
pub struct ClientEndpoint {
    /// Outgoing commands.
    pub commands: mpsc::Sender<SchedulerCommand>,
    /// Incoming responses.
    pub responses: mpsc::Receiver<SchedulerResponse>,
}

/// The worker's half: receives commands, sends responses.
#[derive(Debug)]
pub struct WorkerEndpoint {
    /// Incoming commands.
    pub commands: mpsc::Receiver<SchedulerCommand>,
    /// Outgoing responses.
    pub responses: mpsc::Sender<SchedulerResponse>,
}

/// Creates a connected pair of endpoints, each direction buffering up to
/// `capacity` messages.
#[must_use]
pub fn scheduler_channel(capacity: usize) -> (ClientEndpoint, WorkerEndpoint) {
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (response_tx, response_rx) = mpsc::channel(capacity);
    (
        ClientEndpoint {
            commands: command_tx,
            responses: response_rx,
        },
        WorkerEndpoint {
            commands: command_rx,
            responses: response_tx,
        },
    )
}
