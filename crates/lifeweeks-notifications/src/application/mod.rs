//! Application services for the notification context.

pub mod notification_service;
