//! Delivery gateways.

pub mod logging;
pub mod telegram;

pub use logging::{LoggedDelivery, LoggingGateway};
pub use telegram::TelegramNotificationGateway;
