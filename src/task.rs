//! Single-slot background job for the interactive presentation layer.
//!
//! Holds at most one spawned task so a long-running conversion never blocks
//! the prompt loop. Submitting while a job is running is rejected; the
//! operator retries once the slot frees. There is no cancellation of
//! in-flight work; a running job completes or fails on its own (known
//! limitation).

use tokio::task::JoinHandle;

use crate::error::Error;

/// Observable state of the job slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Outcome of a finished job, taken exactly once.
pub type JobOutcome<T> = std::result::Result<T, Error>;

/// A slot holding at most one background task.
pub struct JobSlot<T> {
    handle: Option<JoinHandle<JobOutcome<T>>>,
    last_state: JobState,
}

impl<T: Send + 'static> JobSlot<T> {
    pub fn new() -> Self {
        Self {
            handle: None,
            last_state: JobState::Idle,
        }
    }

    /// Current state. `Completed`/`Failed` refer to the most recently
    /// finished job until a new one is submitted.
    pub fn state(&self) -> JobState {
        match &self.handle {
            Some(handle) if !handle.is_finished() => JobState::Running,
            Some(_) => self.last_state,
            None => self.last_state,
        }
    }

    /// Whether a job is currently in flight.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn a job into the slot.
    ///
    /// Returns `false` (and does not spawn) when a job is already running;
    /// at most one task is ever in flight.
    pub fn submit<F>(&mut self, future: F) -> bool
    where
        F: std::future::Future<Output = JobOutcome<T>> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }
        self.handle = Some(tokio::spawn(future));
        self.last_state = JobState::Running;
        true
    }

    /// Take the outcome of a finished job, if any.
    ///
    /// Returns `None` while the slot is idle or the job is still running.
    /// After this returns `Some`, the slot is free for the next submission
    /// and `state()` reports how the job ended.
    pub async fn take_finished(&mut self) -> Option<JobOutcome<T>> {
        if !self.handle.as_ref().is_some_and(|h| h.is_finished()) {
            return None;
        }

        let handle = self.handle.take()?;
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(Error::Conversion(format!(
                "background task aborted: {}",
                join_err
            ))),
        };

        self.last_state = if outcome.is_ok() {
            JobState::Completed
        } else {
            JobState::Failed
        };
        Some(outcome)
    }
}

impl<T: Send + 'static> Default for JobSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
