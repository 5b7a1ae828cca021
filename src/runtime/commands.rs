use std::fmt;

use clap::Subcommand;

use crate::command;

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    /// Format one command per discovered file and submit each as a job
    Run(command::RunCMD),
    /// List the files a run would process
    Discover(command::DiscoverCMD),
    /// Submit a single command as a job
    Submit(command::SubmitCMD),
    /// List job names currently queued or running for a user
    Jobs(command::JobsCMD),
    /// Print the scheduler backend that would be used
    Backend(command::BackendCMD),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = match self {
            Commands::Run(_) => "Run",
            Commands::Discover(_) => "Discover",
            Commands::Submit(_) => "Submit",
            Commands::Jobs(_) => "Jobs",
            Commands::Backend(_) => "Backend",
        };
        write!(f, "{}", cmd)
    }
}
