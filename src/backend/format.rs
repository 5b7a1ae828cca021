use super::Backend;
use crate::job::{JobOptions, MailEvent};
use crate::utils::args_to_string;

fn slurm_mail_code(event: MailEvent) -> &'static str {
    match event {
        MailEvent::Start => "BEGIN",
        MailEvent::End => "END",
        MailEvent::Fail => "FAIL",
    }
}

fn torque_mail_code(event: MailEvent) -> &'static str {
    match event {
        MailEvent::Start => "b",
        MailEvent::End => "e",
        MailEvent::Fail => "a",
    }
}

/// Argument vector for the backend's submission program, program first.
/// Only fields that are set produce flags. Pure.
pub fn submission_args(options: &JobOptions, backend: Backend) -> Vec<String> {
    match backend {
        Backend::Slurm => slurm_args(options),
        Backend::Torque => torque_args(options),
    }
}

/// The submission command line as one string, for logs and dry-run previews.
pub fn format_submission(options: &JobOptions, backend: Backend) -> String {
    args_to_string(&submission_args(options, backend))
}

fn slurm_args(options: &JobOptions) -> Vec<String> {
    let mut args = vec![Backend::Slurm.submit_program().to_string()];

    if let Some(name) = &options.job_name {
        args.push(format!("--job-name={}", name));
    }
    if let Some(partition) = &options.partition {
        args.push(format!("--partition={}", partition));
    }
    if let Some(nodes) = options.nodes {
        args.push(format!("--nodes={}", nodes));
    }
    if let Some(cpus) = options.cpus {
        args.push(format!("--cpus-per-task={}", cpus));
    }
    if let Some(memory) = &options.memory {
        args.push(format!("--mem={}", memory));
    }
    if let Some(time) = &options.time_limit {
        args.push(format!("--time={}", time));
    }
    if !options.depends_on.is_empty() {
        args.push(format!("--dependency=afterok:{}", options.depends_on.join(":")));
    }
    if let Some(user) = &options.mail_user {
        args.push(format!("--mail-user={}", user));
    }
    let events = options.parsed_mail_events();
    if !events.is_empty() {
        let codes: Vec<&str> = events.into_iter().map(slurm_mail_code).collect();
        args.push(format!("--mail-type={}", codes.join(",")));
    }
    if let Some(path) = &options.stdin {
        args.push(format!("--input={}", path.display()));
    }
    if let Some(path) = &options.stdout {
        args.push(format!("--output={}", path.display()));
    }
    if let Some(path) = &options.stderr {
        args.push(format!("--error={}", path.display()));
    }
    args
}

/// Resources go into a single -l list, always in the order mem, nodes, walltime.
/// CPUs without a node count ask for one node.
fn torque_resource_list(options: &JobOptions) -> Option<String> {
    let mut resources = Vec::new();
    if let Some(memory) = &options.memory {
        resources.push(format!("mem={}", memory));
    }
    match (options.nodes, options.cpus) {
        (Some(nodes), Some(cpus)) => resources.push(format!("nodes={}:ppn={}", nodes, cpus)),
        (Some(nodes), None) => resources.push(format!("nodes={}", nodes)),
        (None, Some(cpus)) => resources.push(format!("nodes=1:ppn={}", cpus)),
        (None, None) => {}
    }
    if let Some(time) = &options.time_limit {
        resources.push(format!("walltime={}", time));
    }
    if resources.is_empty() {
        None
    } else {
        Some(resources.join(","))
    }
}

fn torque_args(options: &JobOptions) -> Vec<String> {
    let mut args = vec![Backend::Torque.submit_program().to_string()];

    if let Some(name) = &options.job_name {
        args.push("-N".to_string());
        args.push(name.clone());
    }
    if let Some(queue) = &options.partition {
        args.push("-q".to_string());
        args.push(queue.clone());
    }
    if let Some(resources) = torque_resource_list(options) {
        args.push("-l".to_string());
        args.push(resources);
    }
    if !options.depends_on.is_empty() {
        args.push("-W".to_string());
        args.push(format!("depend=afterok:{}", options.depends_on.join(":")));
    }
    if let Some(user) = &options.mail_user {
        args.push("-M".to_string());
        args.push(user.clone());
    }
    let events = options.parsed_mail_events();
    if !events.is_empty() {
        args.push("-m".to_string());
        args.push(events.into_iter().map(torque_mail_code).collect());
    }
    // qsub has no stdin flag; the submitter redirects it inside the script
    if let Some(path) = &options.stdout {
        args.push("-o".to_string());
        args.push(path.display().to_string());
    }
    if let Some(path) = &options.stderr {
        args.push("-e".to_string());
        args.push(path.display().to_string());
    }
    args
}
