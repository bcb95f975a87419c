//! Shared helpers for composition-root integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use lifeweeks_app::config::AppConfig;
use lifeweeks_app::container::App;
use lifeweeks_app::users::InMemoryUserStore;
use lifeweeks_core::event::{Event, EventType};
use lifeweeks_core::profile::UserProfile;
use lifeweeks_event_bus::{EventBus, handler_fn};
use lifeweeks_test_support::ManualClock;

/// Sunday 2026-01-11 12:00 UTC, the day before the first weekly run.
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2026, 1, 11, 12, 0, 0).unwrap(),
    ))
}

/// A profile born 1990-03-15 reading English messages.
pub fn english_user(user_id: i64) -> UserProfile {
    UserProfile::new(user_id)
        .with_birth_date(NaiveDate::from_ymd_opt(1990, 3, 15).unwrap())
        .with_language("en")
}

/// Assembles the backbone with a fast scheduler tick.
pub fn build_test_app(users: InMemoryUserStore, clock: Arc<ManualClock>) -> App {
    let config = AppConfig {
        scheduler_tick: Duration::from_millis(10),
        scheduler_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    };
    App::assemble(&config, Arc::new(users), clock).unwrap()
}

/// Collects every event of `event_type` published on `bus`.
pub fn capture(bus: &EventBus, event_type: EventType) -> Arc<Mutex<Vec<Event>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bus.subscribe(
        event_type,
        handler_fn("capture", move |event| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(event);
                Ok(())
            }
        }),
    );
    events
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
