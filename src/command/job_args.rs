use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::job::JobOptions;

///////////////////////////////
/// Scheduler resource flags shared by `run` and `submit`.
/// Anything given here overrides the --options file.
#[derive(Args, Clone, Debug, Default)]
pub struct JobOptionArgs {
    /// YAML file with job options (memory, cpus, partition, ...)
    #[arg(long = "options", value_parser = clap::value_parser!(PathBuf))]
    pub path_options: Option<PathBuf>,

    /// Memory per job, e.g. 80G
    #[arg(long = "mem")]
    pub memory: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u32))]
    pub nodes: Option<u32>,

    /// CPUs per node
    #[arg(long, value_parser = clap::value_parser!(u32))]
    pub cpus: Option<u32>,

    /// Slurm partition or Torque queue
    #[arg(short = 'p', long)]
    pub partition: Option<String>,

    /// Wall time limit, e.g. 2-00:00:00 or 48:00:00
    #[arg(long = "time")]
    pub time_limit: Option<String>,

    /// Job ids that must finish successfully first (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub depends_on: Vec<String>,

    #[arg(long)]
    pub mail_user: Option<String>,

    /// Any of START, END, FAIL (comma separated)
    #[arg(long = "mail-type", value_delimiter = ',')]
    pub mail_events: Vec<String>,

    /// Interpreter line put above the command
    #[arg(long)]
    pub shell: Option<String>,
}

impl JobOptionArgs {
    /// Options file (if any) overlaid with the command line flags, validated.
    pub fn to_job_options(&self) -> Result<JobOptions> {
        let base = match &self.path_options {
            Some(path) => JobOptions::from_yaml_file(path)?,
            None => JobOptions::default(),
        };
        let cli = JobOptions {
            memory: self.memory.clone(),
            nodes: self.nodes,
            cpus: self.cpus,
            partition: self.partition.clone(),
            time_limit: self.time_limit.clone(),
            depends_on: self.depends_on.clone(),
            mail_user: self.mail_user.clone(),
            mail_events: self.mail_events.clone(),
            shell: self.shell.clone(),
            ..Default::default()
        };
        let options = base.overlay(cli);
        options.validate().context("Invalid job options")?;
        Ok(options)
    }
}

/// $USER, falling back to $LOGNAME
pub fn current_user(explicit: Option<&str>) -> Result<String> {
    if let Some(user) = explicit {
        return Ok(user.to_string());
    }
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .context("Could not determine the current user. Pass --user")
}
