use std::fmt;

use crate::runtime;

mod detect;
mod format;
mod query;
mod scheduler;
mod submit;

pub use detect::resolve_backend;
pub use detect::resolve_backend_once;
pub use detect::resolve_backend_with;
pub use detect::BACKEND_ENV_VAR;

pub use format::format_submission;
pub use format::submission_args;

pub use query::existing_jobs;
pub use query::parse_squeue_names;
pub use query::parse_qstat_xml_names;

pub use scheduler::ClusterScheduler;
pub use scheduler::Scheduler;

pub use submit::parse_job_id;
pub use submit::render_script;
pub use submit::submit;

/// Batch scheduler family accepting our submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Slurm,
    Torque,
}

impl Backend {
    /// Probing order for auto-detection
    pub const ALL: [Backend; 2] = [Backend::Slurm, Backend::Torque];

    /// Executable whose presence on PATH marks this backend as available
    pub fn probe_program(&self) -> &'static str {
        self.submit_program()
    }

    pub fn submit_program(&self) -> &'static str {
        match self {
            Backend::Slurm => "sbatch",
            Backend::Torque => "qsub",
        }
    }

    pub fn query_program(&self) -> &'static str {
        match self {
            Backend::Slurm => "squeue",
            Backend::Torque => "qstat",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = runtime::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slurm" => Ok(Backend::Slurm),
            "torque" | "pbs" => Ok(Backend::Torque),
            _ => Err(runtime::Error::unsupported_backend(s)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Backend::Slurm => "slurm",
            Backend::Torque => "torque",
        };
        write!(f, "{}", s)
    }
}
