use std::path::PathBuf;

use crate::job::JobOptions;

#[derive(Clone, Debug)]
pub struct IO {
    /// Directories below the input root are mirrored here before dispatch
    pub path_out: Option<PathBuf>,

    /// Scheduler stdout/stderr files land here as <job name>.out/.err
    pub path_logs: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Runtime {
    /// Job name = prefix + input file stem
    pub prefix: String,

    /// Copied per file; job name and output paths are overridden
    pub options: JobOptions,

    /// Whose queued/running jobs count as duplicates
    pub user: String,

    pub dry_run: bool,
}

#[derive(Clone, Debug)]
pub struct Threading {
    /// How many submissions may be in flight at once
    pub threads_submit: usize,
}
