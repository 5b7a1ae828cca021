use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

use crate::backend::{self, submit};
use crate::command::job_args::JobOptionArgs;
use crate::runtime::Config;

#[derive(Args)]
pub struct SubmitCMD {
    /// Job name, also used to detect duplicates
    #[arg(short = 'N', long = "name")]
    pub job_name: String,

    /// Shell command the job runs
    #[arg(short = 'c', long = "command")]
    pub command: String,

    #[command(flatten)]
    pub job: JobOptionArgs,

    #[arg(long, value_parser = clap::value_parser!(PathBuf))]
    pub stdin: Option<PathBuf>,

    #[arg(long, value_parser = clap::value_parser!(PathBuf))]
    pub stdout: Option<PathBuf>,

    #[arg(long, value_parser = clap::value_parser!(PathBuf))]
    pub stderr: Option<PathBuf>,

    /// Print the submission instead of running it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Seconds to wait for the scheduler client
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,
}

impl SubmitCMD {
    pub fn try_execute(&mut self, config: &Config) -> Result<()> {
        let mut options = self.job.to_job_options()?.with_job_name(self.job_name.clone());
        options.stdin = self.stdin.clone();
        options.stdout = self.stdout.clone();
        options.stderr = self.stderr.clone();
        options.validate().context("Invalid job options")?;

        let backend = config.backend()?;
        if self.dry_run {
            println!("{}", backend::format_submission(&options, backend));
            print!("{}", backend::render_script(&self.command, &options, backend));
            return Ok(());
        }

        let mut config = config.clone();
        if let Some(secs) = self.timeout {
            config.timeout = Some(Duration::from_secs(secs));
        }
        let record = submit(&config.executor(), &self.command, &options, backend)
            .with_context(|| format!("Submitting {} failed", self.job_name))?;
        match record.id() {
            Some(id) => {
                info!("Submitted {} as job {}", self.job_name, id);
                println!("{}", id);
            }
            None => warn!(
                "{} was handed to {} but no job id came back; check the queue before resubmitting",
                self.job_name,
                backend.submit_program()
            ),
        }
        Ok(())
    }
}
