//! Cooperative single-job scheduler.
//!
//! The [`Scheduler`] owns a FIFO queue of [`Job`]s and runs at most one at a
//! time. Each call to [`Scheduler::step`] either delivers one superseded
//! outcome or executes the job at the head of the queue through the
//! error-isolation wrapper and reports the outcome to the [`JobRunner`].
//! Nothing runs until [`Scheduler::start_polling`] has been called.
//!
//! # Coalescing
//!
//! When a job is scheduled whose kind coalesces and the most recently queued
//! job has the same kind, the new job takes the queued job's place. The
//! replaced job is never executed; it receives exactly one
//! [`Outcome::Superseded`] naming the request that replaced it, delivered on
//! the next step.

mod job;

use std::collections::VecDeque;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::codec::RequestId;
use crate::isolation::{JobFailure, isolate};

pub use self::job::{Job, JobKind};

/// Tracing target for scheduling decisions.
pub(crate) const SCHEDULER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::scheduler");

/// Value produced by a job that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Reply with `"<type>:done"`.
    Done(Value),
    /// Reply with `"<type>:failed"` carrying a structured result.
    ///
    /// Used for expected failures that are results rather than errors, such
    /// as a script that could not be loaded.
    Failed(Value),
}

/// Final state of a job, handed to [`JobRunner::done`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The job ran and produced a value.
    Completed(Completion),
    /// The job returned an error or panicked.
    Failed(JobFailure),
    /// The job was coalesced away before it started.
    ///
    /// Superseded outcomes are delivered ahead of every queued job, so the
    /// reply can overtake replies to earlier requests of other kinds.
    Superseded {
        /// Request that replaced it.
        by: RequestId,
    },
}

/// Executes jobs and receives their outcomes.
pub trait JobRunner {
    /// Error type returned by [`JobRunner::execute`].
    type Error: fmt::Display;

    /// Runs the job body.
    ///
    /// # Errors
    ///
    /// Any error is converted into [`Outcome::Failed`] by the scheduler.
    fn execute(&mut self, job: &Job) -> Result<Completion, Self::Error>;

    /// Receives the job's single outcome.
    fn done(&mut self, job: &Job, outcome: Outcome);
}

/// FIFO scheduler with same-kind coalescing.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: VecDeque<Job>,
    superseded: VecDeque<(Job, RequestId)>,
    polling: bool,
    executed: u64,
}

impl Scheduler {
    /// Creates an idle scheduler that is not yet polling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a job without running anything.
    pub fn schedule(&mut self, job: Job) {
        if job.kind.coalesces()
            && let Some(back) = self.queue.back_mut()
            && back.kind == job.kind
        {
            let by = job.id.clone();
            let replaced = std::mem::replace(back, job);
            debug!(
                target: SCHEDULER_TARGET,
                kind = replaced.kind.as_str(),
                replaced = %replaced.id,
                by = %by,
                "coalesced pending job"
            );
            self.superseded.push_back((replaced, by));
            return;
        }
        debug!(
            target: SCHEDULER_TARGET,
            kind = job.kind.as_str(),
            id = %job.id,
            pending = self.queue.len() + 1,
            "job queued"
        );
        self.queue.push_back(job);
    }

    /// Places a job at the head of the queue, ahead of buffered work.
    pub fn schedule_first(&mut self, job: Job) {
        debug!(
            target: SCHEDULER_TARGET,
            kind = job.kind.as_str(),
            id = %job.id,
            "job queued at head"
        );
        self.queue.push_front(job);
    }

    /// Starts the execution loop. Returns `false` if it was already running.
    pub fn start_polling(&mut self) -> bool {
        if self.polling {
            return false;
        }
        self.polling = true;
        debug!(target: SCHEDULER_TARGET, pending = self.pending(), "polling started");
        true
    }

    /// Whether [`Scheduler::start_polling`] has been called.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// Number of jobs and superseded outcomes still to be delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len() + self.superseded.len()
    }

    /// Number of jobs whose body has been executed.
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Advances the loop by one unit of work.
    ///
    /// Returns `false` when there was nothing to do, either because the
    /// queue is empty or because polling has not started.
    pub fn step<R: JobRunner>(&mut self, runner: &mut R) -> bool {
        if !self.polling {
            return false;
        }
        if let Some((job, by)) = self.superseded.pop_front() {
            runner.done(&job, Outcome::Superseded { by });
            return true;
        }
        let Some(job) = self.queue.pop_front() else {
            return false;
        };

        let label = job.failure_label();
        let outcome = match isolate(&job.id, &label, || runner.execute(&job)) {
            Ok(completion) => Outcome::Completed(completion),
            Err(failure) => Outcome::Failed(failure),
        };
        self.executed += 1;
        runner.done(&job, outcome);
        true
    }

    /// Steps until nothing is left to do and returns the number of steps.
    pub fn run_until_idle<R: JobRunner>(&mut self, runner: &mut R) -> usize {
        let mut steps = 0;
        while self.step(runner) {
            steps += 1;
        }
        steps
    }
}
