//! Integration tests for `EventBus` concurrency behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lifeweeks_core::event::{Event, EventType};
use lifeweeks_event_bus::{EventBus, handler_fn};
use tokio::sync::Notify;

#[tokio::test]
async fn test_suspended_handler_does_not_block_independent_publish() {
    // Arrange
    let bus = Arc::new(EventBus::new());
    let release = Arc::new(Notify::new());
    let completed = Arc::new(AtomicUsize::new(0));

    let gate = Arc::clone(&release);
    bus.subscribe(
        EventType::UserDeleted,
        handler_fn("slow", move |_event| {
            let gate = Arc::clone(&gate);
            async move {
                gate.notified().await;
                Ok(())
            }
        }),
    );

    let counter = Arc::clone(&completed);
    bus.subscribe(
        EventType::UserRegistered,
        handler_fn("fast", move |_event| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }),
    );

    let slow_bus = Arc::clone(&bus);
    let slow = tokio::spawn(async move { slow_bus.publish(&Event::user_deleted(1)).await });
    tokio::task::yield_now().await;

    // Act
    tokio::time::timeout(Duration::from_secs(1), bus.publish(&Event::user_registered(2)))
        .await
        .expect("independent publish must not wait for the suspended handler");

    // Assert
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    release.notify_one();
    slow.await.unwrap();
}

#[tokio::test]
async fn test_subscribing_during_publish_affects_only_later_publishes() {
    // Arrange
    let bus = Arc::new(EventBus::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let inner_bus = Arc::clone(&bus);
    let inner_calls = Arc::clone(&calls);
    bus.subscribe(
        EventType::UserDeleted,
        handler_fn("registers-more", move |_event| {
            let bus = Arc::clone(&inner_bus);
            let calls = Arc::clone(&inner_calls);
            async move {
                let counter = Arc::clone(&calls);
                bus.subscribe(
                    EventType::UserDeleted,
                    handler_fn("late", move |_event| {
                        let counter = Arc::clone(&counter);
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        }
                    }),
                );
                Ok(())
            }
        }),
    );

    // Act
    bus.publish(&Event::user_deleted(1)).await;

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(bus.handler_count(EventType::UserDeleted), 2);
}
