//! Scheduler port.
//!
//! Abstracts recurring-job management from whichever engine runs the jobs,
//! which may live in another process.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of recurring job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Periodic life statistics summary.
    WeeklySummary,
}

impl JobType {
    /// Wire name of the job type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeeklySummary => "weekly_summary",
        }
    }

    /// Prefix of the deterministic job id.
    #[must_use]
    pub const fn job_id_prefix(self) -> &'static str {
        match self {
            Self::WeeklySummary => "weekly",
        }
    }

    /// Deterministic job id for this job type and user. At most one job per
    /// `(user_id, job_type)` can exist because every caller derives the same
    /// id.
    #[must_use]
    pub fn job_id(self, user_id: i64) -> String {
        format!("{}_{user_id}", self.job_id_prefix())
    }

    /// Message type of the notification the job produces.
    #[must_use]
    pub const fn message_type(self) -> &'static str {
        match self {
            Self::WeeklySummary => crate::notification::MESSAGE_TYPE_WEEKLY_SUMMARY,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly_summary" => Ok(Self::WeeklySummary),
            other => Err(DomainError::Validation(format!("unknown job type: {other}"))),
        }
    }
}

/// Wire shape of a trigger before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TriggerFields {
    day_of_week: u8,
    hour: u32,
    minute: u32,
    #[serde(default = "default_timezone")]
    timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

/// When a weekly job fires: day of week (0 = Monday), hour, minute and
/// timezone name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TriggerFields")]
pub struct ScheduleTrigger {
    day_of_week: u8,
    hour: u32,
    minute: u32,
    timezone: String,
}

impl ScheduleTrigger {
    /// Creates a validated trigger.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `day_of_week > 6`, `hour > 23`,
    /// `minute > 59` or `timezone` is blank.
    pub fn new(
        day_of_week: u8,
        hour: u32,
        minute: u32,
        timezone: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let timezone = timezone.into();
        if day_of_week > 6 {
            return Err(DomainError::Validation(format!(
                "day_of_week must be 0-6, got {day_of_week}"
            )));
        }
        if hour > 23 {
            return Err(DomainError::Validation(format!("hour must be 0-23, got {hour}")));
        }
        if minute > 59 {
            return Err(DomainError::Validation(format!(
                "minute must be 0-59, got {minute}"
            )));
        }
        if timezone.trim().is_empty() {
            return Err(DomainError::Validation("timezone must not be empty".into()));
        }
        Ok(Self {
            day_of_week,
            hour,
            minute,
            timezone,
        })
    }

    /// Monday 09:00 UTC.
    #[must_use]
    pub fn weekly_default() -> Self {
        Self {
            day_of_week: 0,
            hour: 9,
            minute: 0,
            timezone: default_timezone(),
        }
    }

    /// Day of week, 0 = Monday.
    #[must_use]
    pub const fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    /// The trigger weekday.
    #[must_use]
    pub const fn weekday(&self) -> Weekday {
        match self.day_of_week {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    /// Hour of day, 0-23.
    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    /// Minute of hour, 0-59.
    #[must_use]
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    /// Timezone name.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

impl TryFrom<TriggerFields> for ScheduleTrigger {
    type Error = DomainError;

    fn try_from(fields: TriggerFields) -> Result<Self, Self::Error> {
        Self::new(fields.day_of_week, fields.hour, fields.minute, fields.timezone)
    }
}

/// Narrow interface over a recurring-job engine.
///
/// Both operations are total: failures (including timeouts when the engine
/// runs out of process) come back as `false`.
#[async_trait]
pub trait SchedulerPort: Send + Sync {
    /// Installs the job, replacing any existing job with the same id.
    async fn schedule_job(
        &self,
        job_id: &str,
        trigger: &ScheduleTrigger,
        user_id: i64,
        job_type: JobType,
    ) -> bool;

    /// Removes the job. Returns `false` when it does not exist or the call
    /// failed.
    async fn remove_job(&self, job_id: &str) -> bool;
}
