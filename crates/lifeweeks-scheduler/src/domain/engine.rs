//! In-memory recurring job table.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use lifeweeks_core::scheduler::{JobType, ScheduleTrigger};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One installed recurring job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// Deterministic job id.
    pub job_id: String,
    /// User the job runs for.
    pub user_id: i64,
    /// What the job does.
    pub job_type: JobType,
    /// When the job fires.
    pub trigger: ScheduleTrigger,
    /// Next instant the job is due.
    pub next_run_at: DateTime<Utc>,
    /// Whether the job is individually paused.
    pub paused: bool,
}

/// First instant strictly after `after` matching the trigger's weekday,
/// hour and minute. Trigger times are interpreted as UTC.
#[must_use]
pub fn next_occurrence(trigger: &ScheduleTrigger, after: DateTime<Utc>) -> DateTime<Utc> {
    let today = after.date_naive();
    let days_ahead = (i64::from(trigger.weekday().num_days_from_monday()) + 7
        - i64::from(today.weekday().num_days_from_monday()))
        % 7;
    // ScheduleTrigger validates hour and minute, so this never falls back.
    let time = NaiveTime::from_hms_opt(trigger.hour(), trigger.minute(), 0).unwrap_or_default();
    let candidate = (today + Duration::days(days_ahead)).and_time(time).and_utc();
    if candidate > after {
        candidate
    } else {
        candidate + Duration::weeks(1)
    }
}

/// Job table keyed by job id.
///
/// Installing a job under an existing id replaces it, so at most one job
/// exists per id.
#[derive(Debug, Default)]
pub struct JobEngine {
    jobs: BTreeMap<String, ScheduledJob>,
    paused_globally: bool,
}

impl JobEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the job, replacing any job with the same id. Returns `true`
    /// when an existing job was replaced.
    pub fn upsert(
        &mut self,
        job_id: impl Into<String>,
        user_id: i64,
        job_type: JobType,
        trigger: ScheduleTrigger,
        now: DateTime<Utc>,
    ) -> bool {
        let job_id = job_id.into();
        if !trigger.timezone().eq_ignore_ascii_case("UTC") {
            warn!(
                job_id = %job_id,
                timezone = trigger.timezone(),
                "non-UTC trigger timezone, evaluating in UTC"
            );
        }
        let job = ScheduledJob {
            next_run_at: next_occurrence(&trigger, now),
            job_id: job_id.clone(),
            user_id,
            job_type,
            trigger,
            paused: false,
        };
        self.jobs.insert(job_id, job).is_some()
    }

    /// Deletes the job. Returns `false` when it did not exist.
    pub fn remove(&mut self, job_id: &str) -> bool {
        self.jobs.remove(job_id).is_some()
    }

    /// Pauses the jobs of `user_id`, or the whole engine when `None`.
    /// Returns the number of jobs affected.
    pub fn pause(&mut self, user_id: Option<i64>) -> usize {
        match user_id {
            Some(user_id) => self
                .jobs
                .values_mut()
                .filter(|job| job.user_id == user_id)
                .map(|job| job.paused = true)
                .count(),
            None => {
                self.paused_globally = true;
                self.jobs.len()
            }
        }
    }

    /// Resumes the jobs of `user_id`, or every job when `None`. Resumed
    /// jobs are rescheduled from `now`, so runs missed while paused are
    /// skipped. Returns the number of jobs affected.
    pub fn resume(&mut self, user_id: Option<i64>, now: DateTime<Utc>) -> usize {
        if user_id.is_none() {
            self.paused_globally = false;
        }
        let mut resumed = 0;
        for job in self.jobs.values_mut() {
            if user_id.is_some_and(|id| id != job.user_id) {
                continue;
            }
            job.paused = false;
            if job.next_run_at <= now {
                job.next_run_at = next_occurrence(&job.trigger, now);
            }
            resumed += 1;
        }
        resumed
    }

    /// Whether the whole engine is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused_globally
    }

    /// Looks up a job.
    #[must_use]
    pub fn get(&self, job_id: &str) -> Option<&ScheduledJob> {
        self.jobs.get(job_id)
    }

    /// Every job, ordered by id.
    #[must_use]
    pub fn jobs(&self) -> Vec<ScheduledJob> {
        self.jobs.values().cloned().collect()
    }

    /// Number of installed jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no job is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Returns the active jobs due at `now` and moves each one to its next
    /// weekly occurrence. A job that missed several runs fires once.
    pub fn due_jobs(&mut self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        if self.paused_globally {
            return Vec::new();
        }
        let mut due = Vec::new();
        for job in self.jobs.values_mut() {
            if job.paused || job.next_run_at > now {
                continue;
            }
            due.push(job.clone());
            job.next_run_at = next_occurrence(&job.trigger, now);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Weekday};

    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        // January 2026: the 12th and 19th are Mondays.
        Utc.with_ymd_and_hms(2026, 1, day, hour, minute, 0).unwrap()
    }

    fn monday_nine() -> ScheduleTrigger {
        ScheduleTrigger::weekly_default()
    }

    #[test]
    fn test_next_occurrence_later_in_week() {
        let next = next_occurrence(&monday_nine(), at(10, 12, 0));

        assert_eq!(next, at(12, 9, 0));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_next_occurrence_same_day_before_and_after_trigger() {
        assert_eq!(next_occurrence(&monday_nine(), at(12, 8, 59)), at(12, 9, 0));
        assert_eq!(next_occurrence(&monday_nine(), at(12, 9, 0)), at(19, 9, 0));
    }

    #[test]
    fn test_upsert_replaces_job_with_same_id() {
        // Arrange
        let mut engine = JobEngine::new();
        let friday = ScheduleTrigger::new(4, 18, 0, "UTC").unwrap();

        // Act
        let first = engine.upsert("weekly_1", 1, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));
        let second = engine.upsert("weekly_1", 1, JobType::WeeklySummary, friday.clone(), at(10, 0, 0));

        // Assert
        assert!(!first);
        assert!(second);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.get("weekly_1").unwrap().trigger, friday);
        assert_eq!(engine.get("weekly_1").unwrap().next_run_at, at(16, 18, 0));
    }

    #[test]
    fn test_remove_reports_missing_job() {
        let mut engine = JobEngine::new();
        engine.upsert("weekly_1", 1, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));

        assert!(engine.remove("weekly_1"));
        assert!(!engine.remove("weekly_1"));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_due_jobs_fire_once_and_advance_a_week() {
        // Arrange
        let mut engine = JobEngine::new();
        engine.upsert("weekly_1", 1, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));

        // Act
        let before = engine.due_jobs(at(12, 8, 0));
        let due = engine.due_jobs(at(12, 9, 0));
        let again = engine.due_jobs(at(12, 9, 1));

        // Assert
        assert!(before.is_empty());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].user_id, 1);
        assert!(again.is_empty());
        assert_eq!(engine.get("weekly_1").unwrap().next_run_at, at(19, 9, 0));
    }

    #[test]
    fn test_paused_user_is_skipped_until_resumed() {
        // Arrange
        let mut engine = JobEngine::new();
        engine.upsert("weekly_1", 1, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));
        engine.upsert("weekly_2", 2, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));

        // Act
        let paused = engine.pause(Some(1));
        let due = engine.due_jobs(at(12, 9, 0));

        // Assert
        assert_eq!(paused, 1);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].user_id, 2);

        // A missed run is not replayed on resume.
        assert_eq!(engine.resume(Some(1), at(12, 10, 0)), 1);
        assert!(engine.due_jobs(at(12, 10, 0)).is_empty());
        assert_eq!(engine.get("weekly_1").unwrap().next_run_at, at(19, 9, 0));
    }

    #[test]
    fn test_global_pause_stops_every_job() {
        let mut engine = JobEngine::new();
        engine.upsert("weekly_1", 1, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));

        engine.pause(None);

        assert!(engine.is_paused());
        assert!(engine.due_jobs(at(12, 9, 0)).is_empty());

        engine.resume(None, at(12, 9, 30));

        assert!(!engine.is_paused());
        assert_eq!(engine.get("weekly_1").unwrap().next_run_at, at(19, 9, 0));
    }

    #[test]
    fn test_jobs_are_listed_by_id() {
        let mut engine = JobEngine::new();
        engine.upsert("weekly_2", 2, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));
        engine.upsert("weekly_1", 1, JobType::WeeklySummary, monday_nine(), at(10, 0, 0));

        let ids: Vec<String> = engine.jobs().into_iter().map(|job| job.job_id).collect();

        assert_eq!(ids, vec!["weekly_1", "weekly_2"]);
    }
}
