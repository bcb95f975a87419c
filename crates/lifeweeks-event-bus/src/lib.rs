//! In-process publish/subscribe event bus.
//!
//! Routes each published [`Event`](lifeweeks_core::event::Event) to the
//! handlers subscribed to its exact [`EventType`](lifeweeks_core::event::EventType),
//! one at a time and in subscription order. A failing handler is logged and
//! skipped; it never stops the others.

pub mod bus;
pub mod handler;

pub use bus::EventBus;
pub use handler::{EventHandler, FnHandler, handler_fn};
