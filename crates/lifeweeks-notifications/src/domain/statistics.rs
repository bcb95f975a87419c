//! Life statistics calculator.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use lifeweeks_core::clock::Clock;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::statistics::{LifeCalculator, LifeStatistics, WEEKS_PER_YEAR};

/// Upper bound accepted for a life expectancy, in years.
pub const MAX_LIFE_EXPECTANCY: u32 = 150;

/// Calculator anchored to "today" as reported by the injected clock.
#[derive(Clone)]
pub struct StandardLifeCalculator {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StandardLifeCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardLifeCalculator").finish_non_exhaustive()
    }
}

impl StandardLifeCalculator {
    /// Creates a calculator that reads the current date from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// Full years between `birth_date` and `today`, counting a year only once
/// the birthday has passed.
fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    u32::try_from(age).unwrap_or(0)
}

impl LifeCalculator for StandardLifeCalculator {
    fn calculate(
        &self,
        birth_date: NaiveDate,
        life_expectancy: u32,
    ) -> Result<LifeStatistics, DomainError> {
        let today = self.clock.today();
        if birth_date > today {
            return Err(DomainError::Validation(format!(
                "birth date {birth_date} is in the future"
            )));
        }
        if life_expectancy == 0 || life_expectancy > MAX_LIFE_EXPECTANCY {
            return Err(DomainError::Validation(format!(
                "life expectancy must be 1-{MAX_LIFE_EXPECTANCY}, got {life_expectancy}"
            )));
        }

        let days_lived = (today - birth_date).num_days();
        let total_weeks_lived = u32::try_from(days_lived / 7)
            .map_err(|_| DomainError::Validation("weeks lived out of range".into()))?;
        let total_weeks_expected = life_expectancy * WEEKS_PER_YEAR;
        let remaining_weeks = total_weeks_expected.saturating_sub(total_weeks_lived);
        let percentage_lived =
            (f64::from(total_weeks_lived) / f64::from(total_weeks_expected)).min(1.0);

        Ok(LifeStatistics {
            age: age_on(birth_date, today),
            life_expectancy,
            total_weeks_lived,
            remaining_weeks,
            total_weeks_expected,
            percentage_lived,
        })
    }
}
