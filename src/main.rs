use std::process::ExitCode;

use clap::Parser;
use log::debug;

use clusterq::runtime::{self, Commands};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every discovered file, formatted command and dispatch decision
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// trace, debug, info, warn, error or off. Overrides --verbose and RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<runtime::LogLevel>,

    /// slurm or torque. Overrides $CLUSTER_BACKEND and PATH probing
    #[arg(long, global = true)]
    backend: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    runtime::setup_global_logger(cli.log_level, cli.verbose);

    let config = runtime::Config {
        verbose: cli.verbose,
        log_level: cli.log_level,
        backend: cli.backend,
        timeout: None,
    };
    debug!("Running {:?}", cli.command);

    let result = match cli.command {
        Commands::Run(mut cmd) => cmd.try_execute(&config),
        Commands::Discover(mut cmd) => cmd.try_execute(&config),
        Commands::Submit(mut cmd) => cmd.try_execute(&config),
        Commands::Jobs(mut cmd) => cmd.try_execute(&config),
        Commands::Backend(mut cmd) => cmd.try_execute(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
