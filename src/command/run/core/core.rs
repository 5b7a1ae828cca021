use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::params;
use crate::backend::Scheduler;
use crate::discover::{subdirectories, FileSet};
use crate::job::{JobOptions, JobRecord};
use crate::runtime;
use crate::utils::{rebase, sample_stem};

/// Turns one input file into the shell command a job should run.
/// Must not touch the filesystem itself.
pub trait FileCommand
where
    Self: Send + Sync,
{
    fn format(&self, path: &Path) -> anyhow::Result<String>;
}

impl<F> FileCommand for F
where
    F: Fn(&Path) -> anyhow::Result<String> + Send + Sync,
{
    fn format(&self, path: &Path) -> anyhow::Result<String> {
        self(path)
    }
}

/// Where one file ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchState {
    /// Formatted and logged, never handed to the scheduler
    DryRunSkipped,
    Submitted(JobRecord),
    /// A job with the same name is already queued or running
    Deduplicated,
    /// An earlier file in this batch derived the same job name
    NameCollision,
    FormatFailed(String),
    SubmitFailed(String),
}

#[derive(Clone, Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub job_name: String,
    pub command: Option<String>,
    pub state: DispatchState,
}

#[derive(Clone, Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl DispatchReport {
    /// Records of every submission, unresolved ones included, in input order
    pub fn records(&self) -> Vec<JobRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.state {
                DispatchState::Submitted(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// (job name, command) for every file that formatted successfully
    pub fn commands(&self) -> Vec<(String, String)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.command.as_ref().map(|c| (o.job_name.clone(), c.clone())))
            .collect()
    }

    pub fn count<F: Fn(&DispatchState) -> bool>(&self, pred: F) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.state)).count()
    }

    pub fn failures(&self) -> usize {
        self.count(|s| {
            matches!(
                s,
                DispatchState::FormatFailed(_) | DispatchState::SubmitFailed(_)
            )
        })
    }
}

struct Planned {
    index: usize,
    command: String,
    options: JobOptions,
}

pub struct Dispatch;

impl Dispatch {
    /// Prefix plus the sample stem. Whitespace becomes `_`; schedulers reject it in names.
    pub fn job_name(prefix: &str, path: &Path) -> String {
        format!("{}{}", prefix, sample_stem(path))
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    }

    /// Per-file copy of the template options: job name and log paths overridden
    pub fn job_options(template: &JobOptions, path_logs: &Path, job_name: &str) -> JobOptions {
        template
            .clone()
            .with_job_name(job_name)
            .with_output_paths(
                path_logs.join(format!("{}.out", job_name)),
                path_logs.join(format!("{}.err", job_name)),
            )
    }

    /// Format one command per file and dispatch them. Only conditions that make
    /// the whole batch pointless are returned as errors; anything scoped to one
    /// file ends up in that file's outcome.
    pub fn run(
        params_io: &params::IO,
        params_runtime: &params::Runtime,
        params_threading: &params::Threading,
        files: &FileSet,
        formatter: &dyn FileCommand,
        scheduler: Option<Arc<dyn Scheduler>>,
    ) -> runtime::Result<DispatchReport> {
        let scheduler = match (params_runtime.dry_run, scheduler) {
            (true, _) => None,
            (false, Some(s)) => Some(s),
            (false, None) => return Err(runtime::Error::NoBackendAvailable),
        };

        let (mut outcomes, planned) = Self::plan(params_io, params_runtime, files, formatter);

        let scheduler = match scheduler {
            None => {
                for p in &planned {
                    let outcome = &mut outcomes[p.index];
                    info!("[dry-run] {}: {}", outcome.job_name, p.command);
                    outcome.state = DispatchState::DryRunSkipped;
                }
                return Ok(DispatchReport { outcomes });
            }
            Some(s) => s,
        };

        if let Some(path_out) = &params_io.path_out {
            Self::mirror_directories(files.root(), path_out)?;
        }
        create_dir(&params_io.path_logs)?;

        // One snapshot for the whole batch; no submission in it can change another's dedup check
        let existing = match scheduler.existing_jobs(&params_runtime.user) {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Not submitting anything, could not list existing jobs: {}", e);
                for p in &planned {
                    outcomes[p.index].state =
                        DispatchState::SubmitFailed(format!("could not list existing jobs: {}", e));
                }
                return Ok(DispatchReport { outcomes });
            }
        };

        let to_submit: Vec<Planned> = planned
            .into_iter()
            .filter(|p| {
                let name = &outcomes[p.index].job_name;
                if existing.contains(name) {
                    info!("{} is already queued or running, skipping", name);
                    false
                } else {
                    true
                }
            })
            .collect();
        for outcome in outcomes.iter_mut() {
            if outcome.command.is_some() && existing.contains(&outcome.job_name) {
                outcome.state = DispatchState::Deduplicated;
            }
        }

        for (index, state) in Self::submit_all(to_submit, scheduler, params_threading) {
            let outcome = &mut outcomes[index];
            match &state {
                DispatchState::Submitted(record) => {
                    info!("Submitted {} as job {}", outcome.job_name, record)
                }
                DispatchState::SubmitFailed(msg) => {
                    warn!("Failed to submit {}: {}", outcome.job_name, msg)
                }
                _ => {}
            }
            outcome.state = state;
        }

        Ok(DispatchReport { outcomes })
    }

    /// Derive names and commands. Formatting is cheap and pure, so it runs inline.
    fn plan(
        params_io: &params::IO,
        params_runtime: &params::Runtime,
        files: &FileSet,
        formatter: &dyn FileCommand,
    ) -> (Vec<FileOutcome>, Vec<Planned>) {
        let mut outcomes = Vec::with_capacity(files.len());
        let mut planned = Vec::new();
        let mut names = HashSet::new();

        for (index, path) in files.iter().enumerate() {
            let job_name = Self::job_name(&params_runtime.prefix, path);
            let mut outcome = FileOutcome {
                path: path.clone(),
                job_name: job_name.clone(),
                command: None,
                state: DispatchState::SubmitFailed("submission did not complete".to_string()),
            };

            if !names.insert(job_name.clone()) {
                warn!(
                    "Skipping {}: job name {} already used by another file in this batch",
                    path.display(),
                    job_name
                );
                outcome.state = DispatchState::NameCollision;
                outcomes.push(outcome);
                continue;
            }

            match formatter.format(path) {
                Ok(command) => {
                    debug!("{} -> {}", path.display(), command);
                    let options =
                        Self::job_options(&params_runtime.options, &params_io.path_logs, &job_name);
                    outcome.command = Some(command.clone());
                    planned.push(Planned {
                        index,
                        command,
                        options,
                    });
                }
                Err(e) => {
                    let e = runtime::Error::format_failed(path, Some(format!("{:#}", e)));
                    warn!("{}", e);
                    outcome.state = DispatchState::FormatFailed(e.to_string());
                }
            }
            outcomes.push(outcome);
        }
        (outcomes, planned)
    }

    /// Submit on a bounded pool. Returns (index, state) pairs in completion order.
    fn submit_all(
        to_submit: Vec<Planned>,
        scheduler: Arc<dyn Scheduler>,
        params_threading: &params::Threading,
    ) -> Vec<(usize, DispatchState)> {
        if to_submit.is_empty() {
            return Vec::new();
        }
        let workers = params_threading.threads_submit.clamp(1, to_submit.len());
        let thread_pool = threadpool::ThreadPool::new(workers);
        let (tx, rx) = crossbeam::channel::unbounded::<(usize, DispatchState)>();

        for p in to_submit {
            let scheduler = Arc::clone(&scheduler);
            let tx = tx.clone();
            thread_pool.execute(move || {
                debug!("{}", scheduler.describe(&p.options));
                let state = match scheduler.submit(&p.command, &p.options) {
                    Ok(record) => DispatchState::Submitted(record),
                    Err(e) => DispatchState::SubmitFailed(e.to_string()),
                };
                let _ = tx.send((p.index, state));
            });
        }
        drop(tx);

        // Ends once every worker has sent (or died)
        rx.iter().collect()
    }

    /// Create the output root and every directory below the input root under it.
    pub fn mirror_directories(input_root: &Path, output_root: &Path) -> runtime::Result<()> {
        create_dir(output_root)?;
        for dir in subdirectories(input_root)? {
            create_dir(&rebase(&dir, input_root, output_root)?)?;
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> runtime::Result<()> {
    std::fs::create_dir_all(path).map_err(|e| runtime::Error::directory_creation_failed(path, e))
}
