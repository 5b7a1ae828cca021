use log::{debug, warn};

use super::{submission_args, Backend};
use crate::exec::ShellExecutor;
use crate::job::{JobOptions, JobRecord};
use crate::runtime;
use crate::utils::{args_to_string, shell_quote};

const SLURM_SUBMIT_MARKER: &str = "Submitted batch job";

/// Script handed to the submission program on stdin.
pub fn render_script(command: &str, options: &JobOptions, backend: Backend) -> String {
    let mut script = String::new();
    script.push_str(options.shell_line());
    script.push('\n');
    // Slurm takes --input; qsub has no equivalent so redirect here
    if backend == Backend::Torque {
        if let Some(stdin) = &options.stdin {
            script.push_str(&format!("exec < {}\n", shell_quote(&stdin.to_string_lossy())));
        }
    }
    script.push_str(command.trim_end());
    script.push('\n');
    script
}

/// Pull the job id out of what the submission program printed.
///
/// Slurm prints `Submitted batch job 481213`; Torque prints a host-qualified
/// id such as `1234.headnode.cluster` (array jobs: `1234[].headnode`).
pub fn parse_job_id(stdout: &str, backend: Backend) -> Option<String> {
    match backend {
        Backend::Slurm => stdout
            .lines()
            .filter_map(|line| {
                let start = line.find(SLURM_SUBMIT_MARKER)? + SLURM_SUBMIT_MARKER.len();
                line[start..].split_whitespace().next()
            })
            .find(|token| token.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string),
        Backend::Torque => stdout
            .split_whitespace()
            .find(|token| is_torque_job_id(token))
            .map(str::to_string),
    }
}

fn is_torque_job_id(token: &str) -> bool {
    let Some((number, host)) = token.split_once('.') else {
        return false;
    };
    let number = match number.strip_suffix(']') {
        Some(array) => match array.split_once('[') {
            Some((n, index)) if index.chars().all(|c| c.is_ascii_digit()) => n,
            _ => return false,
        },
        None => number,
    };
    !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
        && !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Submit `command` as one job. The scheduler call happens at most once; an
/// unparseable reply gives an unresolved record rather than an error.
pub fn submit(
    executor: &ShellExecutor,
    command: &str,
    options: &JobOptions,
    backend: Backend,
) -> runtime::Result<JobRecord> {
    options.validate()?;
    if options.job_name.is_none() {
        return Err(runtime::Error::invalid_job_options("job name is required to submit"));
    }

    let script = render_script(command, options, backend);
    let args = submission_args(options, backend);
    debug!("Submitting with '{}'", args_to_string(&args));

    let output = executor.run(&args[0], &args[1..], Some(&script))?;
    match parse_job_id(&output.stdout, backend) {
        Some(id) => Ok(JobRecord::resolved(id)),
        None => {
            warn!(
                "Could not find a job id in {} output for {}: {:?}",
                backend.submit_program(),
                options.job_name.as_deref().unwrap_or(""),
                output.stdout.trim()
            );
            Ok(JobRecord::unresolved())
        }
    }
}
