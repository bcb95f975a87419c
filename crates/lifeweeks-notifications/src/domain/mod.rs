//! Domain logic for the notification context.

pub mod catalog;
pub mod messages;
pub mod statistics;
