//! Life Weeks — scheduling bounded context.
//!
//! Keeps one recurring job per user and job type, runs due jobs through a
//! [`JobRunner`](application::worker::JobRunner), and exposes the engine to
//! the rest of the application through a request/response command protocol.
//! Event listeners translate user lifecycle events into scheduler calls.

pub mod application;
pub mod domain;
