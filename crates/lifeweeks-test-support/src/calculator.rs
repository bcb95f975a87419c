//! Test calculators — canned `LifeCalculator` implementations.

use chrono::NaiveDate;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::statistics::{LifeCalculator, LifeStatistics};

/// Returns the same statistics for every input.
#[derive(Debug, Clone, Copy)]
pub struct FixedLifeCalculator(pub LifeStatistics);

impl LifeCalculator for FixedLifeCalculator {
    fn calculate(
        &self,
        _birth_date: NaiveDate,
        _life_expectancy: u32,
    ) -> Result<LifeStatistics, DomainError> {
        Ok(self.0)
    }
}

/// Always fails with a validation error.
#[derive(Debug)]
pub struct FailingLifeCalculator;

impl LifeCalculator for FailingLifeCalculator {
    fn calculate(
        &self,
        _birth_date: NaiveDate,
        _life_expectancy: u32,
    ) -> Result<LifeStatistics, DomainError> {
        Err(DomainError::Validation("calculator unavailable".into()))
    }
}
