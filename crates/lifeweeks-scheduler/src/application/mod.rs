//! Application layer for the scheduling context.

pub mod channel;
pub mod client;
pub mod jobs;
pub mod listeners;
pub mod worker;
