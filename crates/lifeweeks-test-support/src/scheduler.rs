//! Test scheduler port — records calls and returns configured outcomes.

use std::sync::Mutex;

use async_trait::async_trait;
use lifeweeks_core::scheduler::{JobType, ScheduleTrigger, SchedulerPort};

/// Arguments of one recorded `schedule_job` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCall {
    /// Job identifier.
    pub job_id: String,
    /// Trigger passed by the caller.
    pub trigger: ScheduleTrigger,
    /// User the job belongs to.
    pub user_id: i64,
    /// Job type.
    pub job_type: JobType,
}

/// A scheduler port that records every call and answers with fixed results.
#[derive(Debug)]
pub struct RecordingSchedulerPort {
    schedule_result: bool,
    remove_result: bool,
    scheduled: Mutex<Vec<ScheduleCall>>,
    removed: Mutex<Vec<String>>,
}

impl RecordingSchedulerPort {
    /// A port that reports success for both operations.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_results(true, true)
    }

    /// A port that answers `schedule_job` with `schedule_result` and
    /// `remove_job` with `remove_result`.
    #[must_use]
    pub fn with_results(schedule_result: bool, remove_result: bool) -> Self {
        Self {
            schedule_result,
            remove_result,
            scheduled: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every `schedule_job` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn scheduled(&self) -> Vec<ScheduleCall> {
        self.scheduled.lock().unwrap().clone()
    }

    /// Returns a snapshot of every job id passed to `remove_job`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchedulerPort for RecordingSchedulerPort {
    async fn schedule_job(
        &self,
        job_id: &str,
        trigger: &ScheduleTrigger,
        user_id: i64,
        job_type: JobType,
    ) -> bool {
        self.scheduled.lock().unwrap().push(ScheduleCall {
            job_id: job_id.to_owned(),
            trigger: trigger.clone(),
            user_id,
            job_type,
        });
        self.schedule_result
    }

    async fn remove_job(&self, job_id: &str) -> bool {
        self.removed.lock().unwrap().push(job_id.to_owned());
        self.remove_result
    }
}
