//! Domain layer for the scheduling context.

pub mod commands;
pub mod engine;
pub mod error;
