use std::collections::HashSet;

use log::debug;
use serde::Deserialize;

use super::Backend;
use crate::exec::ShellExecutor;
use crate::runtime;

/// Torque states that still count as "in the queue"
const TORQUE_ACTIVE_STATES: [&str; 6] = ["Q", "R", "H", "W", "T", "E"];

/// Names of jobs queued or running for `user`. Empty output is an empty set.
pub fn existing_jobs(
    executor: &ShellExecutor,
    backend: Backend,
    user: &str,
) -> runtime::Result<HashSet<String>> {
    let names = match backend {
        Backend::Slurm => {
            let output = executor.run(
                backend.query_program(),
                &["-h", "-u", user, "-o", "%j"],
                None,
            )?;
            parse_squeue_names(&output.stdout)
        }
        Backend::Torque => {
            let output = executor.run(backend.query_program(), &["-x"], None)?;
            parse_qstat_xml_names(&output.stdout, user)?
        }
    };
    debug!("{} jobs already queued or running for {}", names.len(), user);
    Ok(names)
}

/// `squeue -h -o %j` prints one job name per line.
pub fn parse_squeue_names(stdout: &str) -> HashSet<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct QstatData {
    #[serde(rename = "Job", default)]
    jobs: Vec<QstatJob>,
}

#[derive(Debug, Deserialize)]
struct QstatJob {
    #[serde(rename = "Job_Name")]
    name: Option<String>,
    #[serde(rename = "Job_Owner")]
    owner: Option<String>,
    #[serde(rename = "job_state")]
    state: Option<String>,
}

/// `qstat -x` prints every job as XML. Keep active jobs owned by `user`
/// (`Job_Owner` is `user@submithost`). No output means no jobs.
pub fn parse_qstat_xml_names(stdout: &str, user: &str) -> runtime::Result<HashSet<String>> {
    if stdout.trim().is_empty() {
        return Ok(HashSet::new());
    }
    let data: QstatData = serde_xml_rs::from_str(stdout)
        .map_err(|e| runtime::Error::malformed_output("qstat -x", Some(e.to_string())))?;

    let mut names = HashSet::new();
    for job in data.jobs {
        let name = match job.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        if let Some(owner) = job.owner.as_deref().map(str::trim) {
            let owner_user = owner.split('@').next().unwrap_or(owner);
            if owner_user != user {
                continue;
            }
        }
        if let Some(state) = job.state.as_deref().map(str::trim) {
            if !TORQUE_ACTIVE_STATES.contains(&state) {
                continue;
            }
        }
        names.insert(name);
    }
    Ok(names)
}
