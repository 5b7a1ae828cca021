use std::collections::HashSet;

use super::{existing_jobs, submit, Backend};
use crate::exec::ShellExecutor;
use crate::job::{JobOptions, JobRecord};
use crate::runtime;

/// The two operations the dispatcher needs from a batch scheduler.
pub trait Scheduler
where
    Self: Send + Sync,
{
    fn submit(&self, command: &str, options: &JobOptions) -> runtime::Result<JobRecord>;

    fn existing_jobs(&self, user: &str) -> runtime::Result<HashSet<String>>;

    /// Submission command line for logs
    fn describe(&self, options: &JobOptions) -> String;
}

/// Talks to a real Slurm or Torque installation through its client programs.
#[derive(Clone, Debug)]
pub struct ClusterScheduler {
    backend: Backend,
    executor: ShellExecutor,
}

impl ClusterScheduler {
    pub fn new(backend: Backend, executor: ShellExecutor) -> Self {
        ClusterScheduler { backend, executor }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl Scheduler for ClusterScheduler {
    fn submit(&self, command: &str, options: &JobOptions) -> runtime::Result<JobRecord> {
        submit(&self.executor, command, options, self.backend)
    }

    fn existing_jobs(&self, user: &str) -> runtime::Result<HashSet<String>> {
        existing_jobs(&self.executor, self.backend, user)
    }

    fn describe(&self, options: &JobOptions) -> String {
        super::format_submission(options, self.backend)
    }
}
