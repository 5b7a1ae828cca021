use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{
    constants::{RUN_DEFAULT_PATH_LOGS, RUN_DEFAULT_PREFIX, RUN_DEFAULT_THREADS},
    core::{
        core::{Dispatch, DispatchState},
        params,
        template::CommandTemplate,
    },
};
use crate::backend::{self, ClusterScheduler, Scheduler};
use crate::command::discover::DiscoverArgs;
use crate::command::job_args::{current_user, JobOptionArgs};
use crate::job::resolved_ids;
use crate::runtime::Config;
use crate::utils::expand_and_resolve_path;

#[derive(Args)]
pub struct Command {
    #[command(flatten)]
    pub discover: DiscoverArgs,

    // Output root; the input tree is mirrored here
    #[arg(short = 'o', long = "output", value_parser = clap::value_parser!(PathBuf))]
    pub path_out: Option<PathBuf>,

    /// Command per file. Placeholders: {input} {name} {output} {outdir}
    #[arg(short = 'c', long = "command")]
    pub command: String,

    /// Job name prefix; the job name is prefix + input file stem
    #[arg(long, default_value = RUN_DEFAULT_PREFIX)]
    pub prefix: String,

    // Scheduler stdout/stderr files
    #[arg(long = "log-dir", value_parser = clap::value_parser!(PathBuf), default_value = RUN_DEFAULT_PATH_LOGS)]
    pub path_logs: PathBuf,

    #[command(flatten)]
    pub job: JobOptionArgs,

    /// User whose queued jobs count as already submitted (default: $USER)
    #[arg(long)]
    pub user: Option<String>,

    /// Print the commands instead of submitting them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print resolved job ids, one per line, for chaining with --depends-on
    #[arg(long)]
    pub print_ids: bool,

    //Thread settings
    #[arg(long = "threads", value_parser = clap::value_parser!(usize), default_value_t = RUN_DEFAULT_THREADS)]
    pub threads_submit: usize,

    /// Seconds to wait for each scheduler client call
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,
}

impl Command {
    pub fn try_execute(&mut self, config: &Config) -> Result<()> {
        let files = self.discover.try_discover()?;
        info!("{} files to process", files.len());

        let path_out = self
            .path_out
            .as_ref()
            .map(expand_and_resolve_path)
            .transpose()?;
        let path_logs = expand_and_resolve_path(&self.path_logs)?;
        let options = self.job.to_job_options()?;
        let template = CommandTemplate::new(&self.command, files.root(), path_out.as_deref())?;

        let mut config = config.clone();
        if let Some(secs) = self.timeout {
            config.timeout = Some(Duration::from_secs(secs));
        }

        let (scheduler, user): (Option<Arc<dyn Scheduler>>, String) = if self.dry_run {
            (None, self.user.clone().unwrap_or_default())
        } else {
            let backend = config.backend()?;
            let scheduler: Arc<dyn Scheduler> =
                Arc::new(ClusterScheduler::new(backend, config.executor()));
            (Some(scheduler), current_user(self.user.as_deref())?)
        };

        let params_io = params::IO {
            path_out,
            path_logs,
        };
        let params_runtime = params::Runtime {
            prefix: self.prefix.clone(),
            options,
            user,
            dry_run: self.dry_run,
        };
        let params_threading = params::Threading {
            threads_submit: self.threads_submit.max(1),
        };

        let report = Dispatch::run(
            &params_io,
            &params_runtime,
            &params_threading,
            &files,
            &template,
            scheduler,
        )
        .context("Dispatch failed")?;

        if self.dry_run {
            // Show the submission line too when a backend is known
            let backend = config.backend().ok();
            for (job_name, command) in report.commands() {
                if let Some(backend) = backend {
                    let options = Dispatch::job_options(
                        &params_runtime.options,
                        &params_io.path_logs,
                        &job_name,
                    );
                    println!("# {}", backend::format_submission(&options, backend));
                }
                println!("{}\t{}", job_name, command);
            }
        }

        if self.print_ids {
            for id in resolved_ids(&report.records()) {
                println!("{}", id);
            }
        }

        let submitted = report.count(|s| matches!(s, DispatchState::Submitted(_)));
        let deduplicated = report.count(|s| *s == DispatchState::Deduplicated);
        let failed = report.failures();
        info!(
            "{} submitted, {} already queued, {} failed",
            submitted, deduplicated, failed
        );
        if failed > 0 {
            warn!("{} of {} files were not dispatched", failed, files.len());
        }
        Ok(())
    }
}
