//! Life Weeks — composition root.
//!
//! Reads configuration from the environment, installs tracing and wires the
//! event bus, notification service, scheduler worker and event listeners
//! into a running [`App`](container::App).

pub mod config;
pub mod container;
pub mod error;
pub mod telemetry;
pub mod users;
