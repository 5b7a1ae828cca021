use anyhow::Result;
use clap::Args;
use std::time::Duration;

use crate::backend::existing_jobs;
use crate::command::job_args::current_user;
use crate::runtime::Config;

#[derive(Args)]
pub struct JobsCMD {
    /// Whose jobs to list (default: $USER)
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,
}

impl JobsCMD {
    pub fn try_execute(&mut self, config: &Config) -> Result<()> {
        let backend = config.backend()?;
        let user = current_user(self.user.as_deref())?;

        let mut config = config.clone();
        if let Some(secs) = self.timeout {
            config.timeout = Some(Duration::from_secs(secs));
        }
        let mut names: Vec<String> = existing_jobs(&config.executor(), backend, &user)?
            .into_iter()
            .collect();
        names.sort();
        for name in names {
            println!("{}", name);
        }
        Ok(())
    }
}
