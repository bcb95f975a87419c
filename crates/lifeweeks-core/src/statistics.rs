//! Life statistics port.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Life expectancy used when a user has not set one.
pub const DEFAULT_LIFE_EXPECTANCY: u32 = 80;

/// Weeks counted per year of life expectancy.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Derived life statistics for one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifeStatistics {
    /// Age in full years.
    pub age: u32,
    /// Life expectancy the figures are based on, in years.
    pub life_expectancy: u32,
    /// Complete weeks lived since birth.
    pub total_weeks_lived: u32,
    /// Weeks left until the expected total, never negative.
    pub remaining_weeks: u32,
    /// `life_expectancy * 52`.
    pub total_weeks_expected: u32,
    /// Fraction of the expected total already lived, in `[0.0, 1.0]`.
    pub percentage_lived: f64,
}

/// Pure computation of [`LifeStatistics`].
pub trait LifeCalculator: Send + Sync {
    /// Computes statistics for someone born on `birth_date`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the inputs cannot describe a
    /// living person (birth date in the future, zero life expectancy).
    fn calculate(
        &self,
        birth_date: NaiveDate,
        life_expectancy: u32,
    ) -> Result<LifeStatistics, DomainError>;
}
