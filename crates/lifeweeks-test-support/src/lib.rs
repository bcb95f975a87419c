//! Shared test doubles for the Life Weeks notification backbone.

mod calculator;
mod clock;
mod localizer;
mod repository;
mod scheduler;
mod transport;

pub use calculator::{FailingLifeCalculator, FixedLifeCalculator};
pub use clock::{FixedClock, ManualClock};
pub use localizer::PassthroughLocalizer;
pub use repository::{FailingUserRepository, InMemoryUserRepository};
pub use scheduler::{RecordingSchedulerPort, ScheduleCall};
pub use transport::{FailingTransport, RecordingTransport, SentPhoto, SentText};
