//! The event bus.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use lifeweeks_core::event::{DomainEvent, Event, EventType};
use tracing::{debug, error, instrument, warn};

use crate::handler::EventHandler;

/// In-process publish/subscribe bus keyed by [`EventType`].
///
/// The registry lock is only held while copying the handler list, never
/// while a handler runs, so a suspended handler does not block independent
/// `publish` calls.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<EventType, Vec<Arc<dyn EventHandler>>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let counts: HashMap<&EventType, usize> =
            handlers.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    /// Creates a bus with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`. Handlers run in registration
    /// order; registering the same handler twice makes it run twice.
    pub fn subscribe(&self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        debug!(handler = handler.name(), event_type = %event_type, "subscribed handler");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type)
            .or_default()
            .push(handler);
    }

    /// Removes one registration of `handler` (matched by `Arc` identity)
    /// from `event_type`. Returns whether a registration was removed; an
    /// absent handler only produces a warning.
    pub fn unsubscribe(&self, event_type: EventType, handler: &Arc<dyn EventHandler>) -> bool {
        let mut registry = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let position = registry
            .get(&event_type)
            .and_then(|list| list.iter().position(|h| Arc::ptr_eq(h, handler)));

        match position {
            Some(index) => {
                if let Some(list) = registry.get_mut(&event_type) {
                    list.remove(index);
                    if list.is_empty() {
                        registry.remove(&event_type);
                    }
                }
                debug!(handler = handler.name(), event_type = %event_type, "unsubscribed handler");
                true
            }
            None => {
                warn!(
                    handler = handler.name(),
                    event_type = %event_type,
                    "handler not found for unsubscribe"
                );
                false
            }
        }
    }

    /// Delivers `event` to every handler subscribed to its exact type.
    ///
    /// Handlers are awaited one after another. An error or panic from one
    /// handler is logged with the handler name and event identity, and the
    /// next handler still runs. Never fails.
    #[instrument(
        skip_all,
        fields(
            event_type = %event.event_type(),
            correlation_id = %event.metadata().correlation_id,
        )
    )]
    pub async fn publish(&self, event: &Event) {
        let handlers = self.get_handlers(event.event_type());
        if handlers.is_empty() {
            debug!("no handlers registered");
            return;
        }

        debug!(handler_count = handlers.len(), "publishing event");

        for handler in handlers {
            match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(handler = handler.name(), error = %err, "event handler failed");
                }
                Err(panic) => {
                    error!(
                        handler = handler.name(),
                        panic = panic_message(panic.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner).clear();
        debug!("cleared all event handlers");
    }

    /// Returns a copy of the handlers registered for `event_type`. Changing
    /// the returned list does not affect the bus.
    #[must_use]
    pub fn get_handlers(&self, event_type: EventType) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of registrations for `event_type`.
    #[must_use]
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_type)
            .map_or(0, Vec::len)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use lifeweeks_core::error::DomainError;

    use super::*;
    use crate::handler::handler_fn;

    fn recorder(
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn EventHandler> {
        let log = Arc::clone(log);
        handler_fn(name, move |_event| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name);
                Ok(())
            }
        })
    }

    async fn explode(_event: Event) -> Result<(), DomainError> {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_publish_invokes_handlers_in_subscription_order() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventType::UserDeleted, recorder("first", &log));
        bus.subscribe(EventType::UserDeleted, recorder("second", &log));
        bus.subscribe(EventType::UserDeleted, recorder("third", &log));

        // Act
        bus.publish(&Event::user_deleted(1)).await;

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_later_handlers() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventType::UserDeleted, recorder("before", &log));
        bus.subscribe(
            EventType::UserDeleted,
            handler_fn("broken", |_event| async {
                Err(DomainError::Handler("boom".into()))
            }),
        );
        bus.subscribe(EventType::UserDeleted, recorder("after", &log));

        // Act
        bus.publish(&Event::user_deleted(1)).await;

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_stop_later_handlers() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(
            EventType::UserRegistered,
            handler_fn("panicky", explode),
        );
        bus.subscribe(EventType::UserRegistered, recorder("survivor", &log));

        // Act
        bus.publish(&Event::user_registered(5)).await;

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[tokio::test]
    async fn test_publish_routes_by_exact_event_type() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventType::UserRegistered, recorder("registered", &log));
        bus.subscribe(EventType::UserDeleted, recorder("deleted", &log));

        // Act
        bus.publish(&Event::user_deleted(1)).await;

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["deleted"]);
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_noop() {
        let bus = EventBus::new();

        bus.publish(&Event::schedule_recalculation_requested(9)).await;

        assert_eq!(bus.handler_count(EventType::ScheduleRecalculationRequested), 0);
    }

    #[tokio::test]
    async fn test_same_handler_subscribed_twice_runs_twice() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder("dup", &log);
        bus.subscribe(EventType::UserDeleted, Arc::clone(&handler));
        bus.subscribe(EventType::UserDeleted, handler);

        // Act
        bus.publish(&Event::user_deleted(1)).await;

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["dup", "dup"]);
    }

    #[test]
    fn test_unsubscribe_removes_single_registration() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder("dup", &log);
        bus.subscribe(EventType::UserDeleted, Arc::clone(&handler));
        bus.subscribe(EventType::UserDeleted, Arc::clone(&handler));

        // Act
        let removed = bus.unsubscribe(EventType::UserDeleted, &handler);

        // Assert
        assert!(removed);
        assert_eq!(bus.handler_count(EventType::UserDeleted), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_handler_is_noop() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let registered = recorder("registered", &log);
        let stranger = recorder("stranger", &log);
        bus.subscribe(EventType::UserDeleted, registered);

        // Act
        let removed_wrong_handler = bus.unsubscribe(EventType::UserDeleted, &stranger);
        let removed_wrong_type = bus.unsubscribe(EventType::UserRegistered, &stranger);

        // Assert
        assert!(!removed_wrong_handler);
        assert!(!removed_wrong_type);
        assert_eq!(bus.handler_count(EventType::UserDeleted), 1);
    }

    #[test]
    fn test_get_handlers_returns_independent_snapshot() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventType::UserDeleted, recorder("only", &log));

        // Act
        let mut snapshot = bus.get_handlers(EventType::UserDeleted);
        snapshot.clear();

        // Assert
        assert_eq!(bus.handler_count(EventType::UserDeleted), 1);
        assert_eq!(bus.get_handlers(EventType::UserDeleted)[0].name(), "only");
    }

    #[test]
    fn test_clear_removes_all_subscriptions() {
        // Arrange
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventType::UserDeleted, recorder("a", &log));
        bus.subscribe(EventType::NotificationSent, recorder("b", &log));

        // Act
        bus.clear();

        // Assert
        assert_eq!(bus.handler_count(EventType::UserDeleted), 0);
        assert_eq!(bus.handler_count(EventType::NotificationSent), 0);
    }
}
